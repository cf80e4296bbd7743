//! In-place repair of a single file: detect, back up, fix, rewrite.

use std::path::Path;

use crate::config::AppConfig;
use crate::detect::{self, ReasonFilter};
use crate::encoding::fix_text;
use crate::error::RepairError;

#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// Copy the file to `<name>.bak` before rewriting it.
    pub backup: bool,
    /// Report what would happen without writing anything.
    pub dry_run: bool,
    /// Which reason lines to include in the report.
    pub reasons: ReasonFilter,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            backup: true,
            dry_run: false,
            reasons: ReasonFilter::All,
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileReport {
    pub path: String,
    /// Whether the file was (or, under `dry_run`, would be) rewritten.
    pub fixed: bool,
    /// Reason lines for the verdict, filtered per the options.
    pub reasons: Vec<String>,
    /// Bytes written back, 0 when nothing was written.
    pub bytes_written: usize,
}

/// Repair one file in place if it needs it.
///
/// The whole corrected text is written back and the file truncated to it, so
/// a fix that shrinks the text leaves no tail of the old content behind. A
/// UTF-8 BOM is re-emitted only when the source file had one.
pub fn process_file(
    path: &Path,
    opts: &RepairOptions,
    cfg: &AppConfig,
) -> Result<FileReport, RepairError> {
    let props = detect::should_fix_properties();
    let (should_fix, reasons) =
        detect::evaluate_detailed(path, &props, &cfg.extensions, opts.reasons)?;

    if !should_fix {
        tracing::debug!(path = %path.display(), "not fixing");
        return Ok(FileReport {
            path: path.display().to_string(),
            fixed: false,
            reasons,
            bytes_written: 0,
        });
    }

    if opts.dry_run {
        return Ok(FileReport {
            path: path.display().to_string(),
            fixed: true,
            reasons,
            bytes_written: 0,
        });
    }

    if opts.backup {
        let backup_path = backup_path_for(path);
        std::fs::copy(path, &backup_path).map_err(|e| RepairError::BackupFailed {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        tracing::info!(backup = %backup_path.display(), "backup written");
    }

    let had_bom = detect::has_bom(path)?;
    let text = detect::read_text(path)?;
    let fixed = fix_text(&text);

    let mut out = Vec::with_capacity(fixed.len() + 3);
    if had_bom {
        out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    }
    out.extend_from_slice(fixed.as_bytes());
    std::fs::write(path, &out)?;
    tracing::info!(path = %path.display(), bytes = out.len(), "fixed");

    Ok(FileReport {
        path: path.display().to_string(),
        fixed: true,
        reasons,
        bytes_written: out.len(),
    })
}

fn backup_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    std::path::PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    fn opts() -> RepairOptions {
        RepairOptions::default()
    }

    #[test]
    fn mangled_subtitle_is_fixed_in_place_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ep.srt", "jak¹œ gêœ".as_bytes());
        let cfg = AppConfig::default();

        let report = process_file(&path, &opts(), &cfg).unwrap();
        assert!(report.fixed);
        assert!(report.bytes_written > 0);

        let fixed = std::fs::read_to_string(&path).unwrap();
        assert_eq!(fixed, "jakąś gęś");

        let backup = std::fs::read(dir.path().join("ep.srt.bak")).unwrap();
        assert_eq!(backup, "jak¹œ gêœ".as_bytes());
    }

    #[test]
    fn clean_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ep.srt", "jakąś gęś".as_bytes());
        let cfg = AppConfig::default();

        let report = process_file(&path, &opts(), &cfg).unwrap();
        assert!(!report.fixed);
        assert_eq!(report.bytes_written, 0);
        assert!(!dir.path().join("ep.srt.bak").exists());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "jakąś gęś"
        );
    }

    #[test]
    fn non_subtitle_extension_is_skipped_even_when_mangled() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "notes.doc", "jak¹œ".as_bytes());
        let cfg = AppConfig::default();
        let report = process_file(&path, &opts(), &cfg).unwrap();
        assert!(!report.fixed);
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ep.srt", "jak¹œ".as_bytes());
        let cfg = AppConfig::default();
        let o = RepairOptions {
            dry_run: true,
            ..opts()
        };
        let report = process_file(&path, &o, &cfg).unwrap();
        assert!(report.fixed);
        assert_eq!(report.bytes_written, 0);
        assert_eq!(std::fs::read(&path).unwrap(), "jak¹œ".as_bytes());
        assert!(!dir.path().join("ep.srt.bak").exists());
    }

    #[test]
    fn backup_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ep.srt", "jak¹œ".as_bytes());
        let cfg = AppConfig::default();
        let o = RepairOptions {
            backup: false,
            ..opts()
        };
        let report = process_file(&path, &o, &cfg).unwrap();
        assert!(report.fixed);
        assert!(!dir.path().join("ep.srt.bak").exists());
    }

    #[test]
    fn rewrite_truncates_and_preserves_bom() {
        let dir = tempfile::tempdir().unwrap();
        // BOM + mangled text
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("jak¹œ".as_bytes());
        let path = write_file(dir.path(), "ep.srt", &bytes);
        let cfg = AppConfig::default();

        process_file(&path, &opts(), &cfg).unwrap();
        let out = std::fs::read(&path).unwrap();
        assert!(out.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert_eq!(&out[3..], "jakąś".as_bytes());
    }
}

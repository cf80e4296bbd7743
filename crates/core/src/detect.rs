//! File-level checks deciding whether a file should be repaired, with
//! human-readable reasons for each verdict.

use std::path::Path;

use crate::config::ExtensionsConfig;
use crate::encoding::looks_misdecoded;
use crate::error::DetectError;

/// One property a file may or may not have. A file is repaired only when all
/// of [`should_fix_properties`] hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileProperty {
    /// The extension is one of the configured subtitle extensions.
    SubtitleExtension,
    /// The content reads as windows-1250 text misdecoded as windows-1252.
    MisdecodedPolishText,
    /// The extension is one of the configured video extensions.
    VideoExtension,
}

impl FileProperty {
    pub fn evaluate(&self, path: &Path, exts: &ExtensionsConfig) -> Result<bool, DetectError> {
        match self {
            FileProperty::SubtitleExtension => Ok(has_extension_in(path, &exts.subtitle)),
            FileProperty::VideoExtension => Ok(has_extension_in(path, &exts.video)),
            FileProperty::MisdecodedPolishText => {
                let text = read_text(path)?;
                Ok(looks_misdecoded(&text))
            }
        }
    }

    /// The reason line for a verdict, e.g. "is a subtitle file".
    pub fn describe(&self, holds: bool) -> &'static str {
        match (self, holds) {
            (FileProperty::SubtitleExtension, true) => "is a subtitle file",
            (FileProperty::SubtitleExtension, false) => "is not a subtitle file",
            (FileProperty::MisdecodedPolishText, true) => "is a misdecoded polish file",
            (FileProperty::MisdecodedPolishText, false) => "is not a misdecoded polish file",
            (FileProperty::VideoExtension, true) => "is a video file",
            (FileProperty::VideoExtension, false) => "is not a video file",
        }
    }
}

/// The properties that together mean "this file should be fixed".
pub fn should_fix_properties() -> [FileProperty; 2] {
    [
        FileProperty::SubtitleExtension,
        FileProperty::MisdecodedPolishText,
    ]
}

/// Which reason lines to keep when reporting a verdict. Mapped from the
/// verbosity level: 0 keeps none, 1 keeps the failures, 2 keeps everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasonFilter {
    #[default]
    All,
    WhyOnly,
    WhyNotOnly,
    None,
}

impl ReasonFilter {
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => ReasonFilter::None,
            1 => ReasonFilter::WhyNotOnly,
            _ => ReasonFilter::All,
        }
    }

    fn keeps(&self, holds: bool) -> bool {
        match self {
            ReasonFilter::All => true,
            ReasonFilter::WhyOnly => holds,
            ReasonFilter::WhyNotOnly => !holds,
            ReasonFilter::None => false,
        }
    }
}

/// Evaluate `props` against `path` in order, stopping at the first property
/// that fails; later properties are neither evaluated nor reported. The
/// verdict is true iff every property holds; reasons are filtered per
/// `filter`. Cheap name checks come before the content read in
/// [`should_fix_properties`], so a file ruled out by extension is never
/// opened.
pub fn evaluate_detailed(
    path: &Path,
    props: &[FileProperty],
    exts: &ExtensionsConfig,
    filter: ReasonFilter,
) -> Result<(bool, Vec<String>), DetectError> {
    let mut reasons = Vec::new();
    for prop in props {
        let holds = prop.evaluate(path, exts)?;
        tracing::debug!(?prop, holds, path = %path.display(), "property evaluated");
        if filter.keeps(holds) {
            reasons.push(prop.describe(holds).to_string());
        }
        if !holds {
            return Ok((false, reasons));
        }
    }
    Ok((true, reasons))
}

/// True when a video file with the same stem sits next to `subtitle_path`.
pub fn has_accompanying_video(subtitle_path: &Path, exts: &ExtensionsConfig) -> bool {
    let Some(stem) = subtitle_path.file_stem() else {
        return false;
    };
    let dir = subtitle_path.parent().unwrap_or(Path::new("."));
    exts.video.iter().any(|ext| {
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(ext);
        dir.join(name).exists()
    })
}

/// Read a file as UTF-8 text, tolerating (and dropping) a leading BOM.
pub fn read_text(path: &Path) -> Result<String, DetectError> {
    let raw = std::fs::read(path)?;
    let content = strip_bom(&raw);
    match std::str::from_utf8(content) {
        Ok(text) => Ok(text.to_string()),
        Err(e) => Err(DetectError::InvalidUtf8 {
            path: path.display().to_string(),
            detail: e.to_string(),
        }),
    }
}

/// Whether the file starts with a UTF-8 BOM (so a rewrite can preserve it).
pub fn has_bom(path: &Path) -> Result<bool, DetectError> {
    let raw = std::fs::read(path)?;
    Ok(raw.starts_with(BOM))
}

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

fn strip_bom(raw: &[u8]) -> &[u8] {
    if raw.starts_with(BOM) {
        &raw[3..]
    } else {
        raw
    }
}

fn has_extension_in(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| exts.iter().any(|known| known.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionsConfig;
    use std::io::Write;

    fn exts() -> ExtensionsConfig {
        ExtensionsConfig::default()
    }

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn extension_properties_use_config_tables() {
        let e = exts();
        let p = Path::new("Episode_01.srt");
        assert!(FileProperty::SubtitleExtension.evaluate(p, &e).unwrap());
        assert!(!FileProperty::VideoExtension.evaluate(p, &e).unwrap());
        let v = Path::new("Episode_01.MKV");
        assert!(FileProperty::VideoExtension.evaluate(v, &e).unwrap());
        assert!(!FileProperty::SubtitleExtension
            .evaluate(Path::new("noext"), &e)
            .unwrap());
    }

    #[test]
    fn misdecoded_property_reads_file_content() {
        let dir = tempfile::tempdir().unwrap();
        let mangled = write_file(dir.path(), "bad.txt", "jak¹œ tam".as_bytes());
        let clean = write_file(dir.path(), "good.txt", "jakąś tam".as_bytes());
        let e = exts();
        assert!(FileProperty::MisdecodedPolishText
            .evaluate(&mangled, &e)
            .unwrap());
        assert!(!FileProperty::MisdecodedPolishText
            .evaluate(&clean, &e)
            .unwrap());
    }

    #[test]
    fn evaluate_detailed_filters_reasons() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "ep.srt", "jak¹œ".as_bytes());
        let e = exts();
        let props = should_fix_properties();

        let (fix, reasons) = evaluate_detailed(&path, &props, &e, ReasonFilter::All).unwrap();
        assert!(fix);
        assert_eq!(
            reasons,
            vec!["is a subtitle file", "is a misdecoded polish file"]
        );

        let (_, none) = evaluate_detailed(&path, &props, &e, ReasonFilter::None).unwrap();
        assert!(none.is_empty());

        let clean = write_file(dir.path(), "ok.srt", "all good".as_bytes());
        let (fix, why_not) =
            evaluate_detailed(&clean, &props, &e, ReasonFilter::WhyNotOnly).unwrap();
        assert!(!fix);
        assert_eq!(why_not, vec!["is not a misdecoded polish file"]);
    }

    #[test]
    fn evaluation_stops_before_reading_non_subtitle_content() {
        let dir = tempfile::tempdir().unwrap();
        // not valid UTF-8; would error if the content check ran
        let movie = write_file(dir.path(), "movie.mkv", &[0x00, 0x01, 0xFF, 0xFE]);
        let props = should_fix_properties();
        let (fix, reasons) = evaluate_detailed(&movie, &props, &exts(), ReasonFilter::All).unwrap();
        assert!(!fix);
        assert_eq!(reasons, vec!["is not a subtitle file"]);
    }

    #[test]
    fn reason_filter_maps_from_verbosity() {
        assert_eq!(ReasonFilter::from_verbosity(0), ReasonFilter::None);
        assert_eq!(ReasonFilter::from_verbosity(1), ReasonFilter::WhyNotOnly);
        assert_eq!(ReasonFilter::from_verbosity(2), ReasonFilter::All);
        assert_eq!(ReasonFilter::from_verbosity(9), ReasonFilter::All);
    }

    #[test]
    fn bom_is_stripped_and_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let with_bom = write_file(dir.path(), "bom.txt", b"\xEF\xBB\xBFhello");
        let without = write_file(dir.path(), "plain.txt", b"hello");
        assert_eq!(read_text(&with_bom).unwrap(), "hello");
        assert_eq!(read_text(&without).unwrap(), "hello");
        assert!(has_bom(&with_bom).unwrap());
        assert!(!has_bom(&without).unwrap());
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "latin2.txt", &[0x6A, 0x61, 0x6B, 0xB9]);
        assert!(matches!(
            read_text(&path),
            Err(DetectError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn accompanying_video_detected_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let sub = write_file(dir.path(), "ep1.srt", b"text");
        write_file(dir.path(), "ep1.mkv", b"");
        let lonely = write_file(dir.path(), "ep2.srt", b"text");
        let e = exts();
        assert!(has_accompanying_video(&sub, &e));
        assert!(!has_accompanying_video(&lonely, &e));
    }
}

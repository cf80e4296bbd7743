//! Target resolution and directory processing.
//!
//! One positional path selects what to work on: an existing file is handled
//! alone, an existing directory has its regular files handled one by one
//! (one level deep, no recursion), and no path at all means the current
//! directory.

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::{NapfixError, ScanError};
use crate::repair::{process_file, FileReport, RepairOptions};

/// What the tool was pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    SingleFile(PathBuf),
    Directory(PathBuf),
}

impl Mode {
    pub fn describe(&self) -> &'static str {
        match self {
            Mode::SingleFile(_) => "single file",
            Mode::Directory(_) => "single directory",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Mode::SingleFile(p) | Mode::Directory(p) => p,
        }
    }
}

/// Map the optional positional argument to a [`Mode`].
pub fn resolve_mode(arg: Option<&Path>) -> Result<Mode, ScanError> {
    let path = match arg {
        None => return Ok(Mode::Directory(std::env::current_dir()?)),
        Some(p) => p,
    };
    let meta = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScanError::NoSuchPath {
                path: path.display().to_string(),
            }
        } else {
            ScanError::Io(e)
        }
    })?;
    if meta.is_file() {
        Ok(Mode::SingleFile(path.to_path_buf()))
    } else {
        Ok(Mode::Directory(path.to_path_buf()))
    }
}

/// Regular files directly inside `dir`, sorted by name for deterministic
/// runs. Subdirectories are ignored.
pub fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Process everything the mode selects and collect the per-file reports.
pub fn process(
    mode: &Mode,
    opts: &RepairOptions,
    cfg: &AppConfig,
) -> Result<Vec<FileReport>, NapfixError> {
    match mode {
        Mode::SingleFile(path) => Ok(vec![process_file(path, opts, cfg)?]),
        Mode::Directory(dir) => {
            let files = scan_dir(dir)?;
            tracing::debug!(dir = %dir.display(), count = files.len(), "scanning directory");
            let mut reports = Vec::with_capacity(files.len());
            for path in files {
                reports.push(process_file(&path, opts, cfg)?);
            }
            Ok(reports)
        }
    }
}

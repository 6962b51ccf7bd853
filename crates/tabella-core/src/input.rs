use crate::error::TabellaError;
use std::path::{Path, PathBuf};

/// Pick the invoice to process from `dir`.
///
/// Hidden files are ignored. When several files are present the first one
/// in file-name order is used and the rest are logged.
pub fn discover_input(dir: &Path) -> Result<PathBuf, TabellaError> {
    let not_found = || TabellaError::InputNotFound {
        dir: dir.to_path_buf(),
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut files = files.into_iter();
    let chosen = files.next().ok_or_else(not_found)?;
    let ignored: Vec<String> = files.map(|p| p.display().to_string()).collect();
    if !ignored.is_empty() {
        tracing::warn!(
            chosen = %chosen.display(),
            ignored = ?ignored,
            "more than one input file found; using the first"
        );
    }

    tracing::info!(file = %chosen.display(), "input file discovered");
    Ok(chosen)
}

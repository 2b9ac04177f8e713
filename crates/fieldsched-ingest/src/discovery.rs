use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IngestError, Result};
use crate::kind::SpreadsheetKind;

/// List supported export files directly inside `dir`, sorted by path.
/// Hidden files and editor lock files (`~$report.xlsx`) are skipped.
pub fn discover_spreadsheets(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.') || name.starts_with("~$"));
        if hidden || !SpreadsheetKind::is_supported(&path) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    debug!(dir = %dir.display(), file_count = files.len(), "discovered exports");
    Ok(files)
}

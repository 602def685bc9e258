//! Persisted configuration file with a single-slot backup.

use crate::error::persistence::PersistenceError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;

use log::info;

/// Read the persisted file. `Ok(None)` when it does not exist.
pub fn read(path: &Path) -> Result<Option<String>, PersistenceError> {
    if !path.exists() {
        info!("Config file not found at {}", path.display());
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| PersistenceError::Read {
        location: ErrorLocation::from(Location::caller()),
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("Config file read from {}", path.display());
    Ok(Some(contents))
}

/// Write `contents` to `path`, first copying the previous file verbatim to `backup_path`.
///
/// The backup is overwritten each time; there is no history.
pub fn write_with_backup(
    path: &Path,
    backup_path: &Path,
    contents: &str,
) -> Result<(), PersistenceError> {
    if path.exists() {
        std::fs::copy(path, backup_path).map_err(|e| PersistenceError::Backup {
            location: ErrorLocation::from(Location::caller()),
            path: backup_path.to_path_buf(),
            source: e,
        })?;
        info!("Config backup written to {}", backup_path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PersistenceError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, contents).map_err(|e| PersistenceError::Write {
        location: ErrorLocation::from(Location::caller()),
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("Config file saved to {}", path.display());
    Ok(())
}

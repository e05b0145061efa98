// Best-effort file cleanup. Failures are logged, never returned.

use std::fs;
use std::path::Path;

/// Deletes a single file
///
/// Returns true if the file existed and was removed.
pub fn delete_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if !path.is_file() {
        log::debug!("Nothing to delete at {:?}", path);
        return false;
    }
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Could not delete {:?}: {}", path, e);
            false
        }
    }
}

/// Deletes a file, or every file below a directory
///
/// Directories themselves are left in place.
pub fn delete_recursive(path: impl AsRef<Path>) {
    let path = path.as_ref();
    if !path.exists() {
        log::warn!("File {:?} does not exist", path);
        return;
    }

    if path.is_dir() {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Could not list {:?}: {}", path, e);
                return;
            }
        };
        for entry in entries.filter_map(|entry| entry.ok()) {
            delete_recursive(entry.path());
        }
    } else if let Err(e) = fs::remove_file(path) {
        log::error!("Delete file {:?} failed: {}", path, e);
    }
}

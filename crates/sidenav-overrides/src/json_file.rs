//! Lenient and checked JSON file reads, and change-detecting writes.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::StoreError;

/// Read a JSON document, treating every failure as "no data".
///
/// A missing file is silent. Unreadable or malformed files are logged.
pub(crate) fn read_lenient<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read sidecar");
            return T::default();
        }
    };

    if content.trim().is_empty() {
        return T::default();
    }

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed sidecar");
        T::default()
    })
}

/// Read a JSON document that is about to be rewritten.
///
/// Missing and blank files are "no data". Unreadable or malformed files are
/// errors, so callers leave them on disk for a human to repair.
pub(crate) fn read_checked<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(StoreError::io(e, path).with_operation("read")),
    };

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&content).map_err(|e| StoreError::json(e, path).with_operation("read"))
}

/// Write `value` as pretty-printed JSON unless the file already holds an
/// equal document.
///
/// Absent files are not created for empty documents. Returns whether the
/// file was written.
pub(crate) fn write_if_changed<T: Serialize>(path: &Path, value: &T, is_empty: bool) -> Result<bool, StoreError> {
    let new_value = serde_json::to_value(value).map_err(|e| StoreError::json(e, path))?;

    match std::fs::read_to_string(path) {
        Ok(existing) => {
            if serde_json::from_str::<serde_json::Value>(&existing).is_ok_and(|v| v == new_value) {
                return Ok(false);
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if is_empty {
                return Ok(false);
            }
        }
        Err(e) => return Err(StoreError::io(e, path).with_operation("read")),
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(e, parent).with_operation("write"))?;
    }

    let content = serde_json::to_string_pretty(&new_value).map_err(|e| StoreError::json(e, path))?;
    std::fs::write(path, content).map_err(|e| StoreError::io(e, path).with_operation("write"))?;
    Ok(true)
}

//! File-based snapshot cache.
//!
//! [`FileCache`] stores each snapshot as a plain file named after its key.
//! Freshness is derived from the file's modification time: a snapshot is
//! fresh while it is younger than the configured time-to-live and not older
//! than the source content it was built from.
//!
//! The cache root carries a `VERSION` file naming the build that wrote it.
//! A root written by another build, or without the file, is emptied when the
//! cache is opened.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::{Cache, CacheEntry};

/// [`Cache`] keeping one snapshot file per key.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # build that wrote the snapshots
/// +-- sidebar_en.json    # snapshot for language "en"
/// +-- sidebar_root.json  # snapshot for a single-language site
/// ```
pub struct FileCache {
    root: PathBuf,
    ttl: Duration,
}

impl FileCache {
    /// Open the cache at `root`, emptying it when written by another build.
    ///
    /// Errors during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str, ttl: Duration) -> Self {
        ensure_version(&root, version);
        Self { root, ttl }
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_fresh(&self, written: SystemTime, source_mtime: Option<SystemTime>) -> bool {
        let age = SystemTime::now()
            .duration_since(written)
            .unwrap_or(Duration::ZERO);
        if age > self.ttl {
            return false;
        }
        source_mtime.is_none_or(|source| source <= written)
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str, source_mtime: Option<SystemTime>) -> Option<CacheEntry> {
        let path = self.root.join(key);
        let written = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let data = fs::read(&path).ok()?;
        Some(CacheEntry {
            data,
            fresh: self.is_fresh(written, source_mtime),
        })
    }

    fn set(&self, key: &str, value: &[u8]) {
        let path = self.root.join(key);

        // Cache is optional; failures only lose the snapshot
        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            tracing::warn!(path = %parent.display(), error = %e, "Failed to create cache directory");
            return;
        }
        if let Err(e) = fs::write(&path, value) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write cache snapshot");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.root.join(key);
        if let Err(e) = fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove cache snapshot");
        }
    }

    fn clear(&self) {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && entry.file_name() != VERSION_FILE {
                let _ = fs::remove_file(&path);
            }
        }
    }
}

const VERSION_FILE: &str = "VERSION";

/// Make sure `root` holds snapshots of `version` only.
///
/// Snapshots of another build, or of an unknown one, are discarded with the
/// whole directory.
fn ensure_version(root: &Path, version: &str) {
    let marker = root.join(VERSION_FILE);
    let stored = fs::read_to_string(&marker).ok();
    if stored.as_deref() == Some(version) {
        return;
    }
    tracing::info!(
        path = %root.display(),
        stored = stored.as_deref().unwrap_or("none"),
        current = version,
        "Discarding navigation snapshots of another build"
    );

    let reset = || -> std::io::Result<()> {
        if let Err(e) = fs::remove_dir_all(root)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            return Err(e);
        }
        fs::create_dir_all(root)?;
        fs::write(&marker, version)
    };
    if let Err(e) = reset() {
        tracing::warn!(path = %root.display(), error = %e, "Failed to reset snapshot cache");
    }
}

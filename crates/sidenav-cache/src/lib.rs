//! Navigation snapshot caches for sidenav.
//!
//! Generated navigation maps are kept in two tiers:
//!
//! - [`MemoryCache`]: per-process map with a time-to-live
//! - [`Cache`]: persistent snapshots that survive restarts, validated by
//!   file age and by the modification time of the content they describe
//!
//! # Implementations
//!
//! - [`NullCache`]: No-op implementation (always misses)
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Example
//!
//! ```
//! use sidenav_cache::{Cache, NullCache};
//!
//! let cache = NullCache;
//! cache.set("sidebar_en.json", b"{}");
//! assert!(cache.get("sidebar_en.json", None).is_none()); // NullCache always misses
//! ```

mod ext;
mod file;
mod memory;

pub use ext::CacheExt;
pub use file::FileCache;
pub use memory::MemoryCache;

use std::time::SystemTime;

/// A snapshot read from a [`Cache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Raw snapshot bytes.
    pub data: Vec<u8>,
    /// Whether the snapshot is within its time-to-live and not older than
    /// its source.
    pub fresh: bool,
}

/// Persistent key-value snapshot store.
///
/// Stale entries are still returned (with `fresh == false`) so callers can
/// serve best-effort data while a regeneration runs.
pub trait Cache: Send + Sync {
    /// Retrieve a snapshot.
    ///
    /// # Arguments
    ///
    /// * `key` - Snapshot name (e.g., `sidebar_en.json`)
    /// * `source_mtime` - Modification time of the content the snapshot was
    ///   built from; a newer source makes the entry stale
    fn get(&self, key: &str, source_mtime: Option<SystemTime>) -> Option<CacheEntry>;

    /// Store a snapshot, replacing any previous one.
    fn set(&self, key: &str, value: &[u8]);

    /// Remove one snapshot.
    fn remove(&self, key: &str);

    /// Remove every snapshot.
    fn clear(&self);
}

/// No-op [`Cache`] that never stores or retrieves data.
///
/// Use when caching is disabled. All operations are no-ops and all lookups
/// return `None`.
pub struct NullCache;

impl Cache for NullCache {
    fn get(&self, _key: &str, _source_mtime: Option<SystemTime>) -> Option<CacheEntry> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}

    fn remove(&self, _key: &str) {}

    fn clear(&self) {}
}

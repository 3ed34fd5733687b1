//! Extension trait for [`Cache`] with typed convenience methods.

use std::time::SystemTime;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Cache;

/// Typed JSON access for [`Cache`].
///
/// Implemented for every cache through a blanket impl so that [`Cache`]
/// stays object-safe and implementors only handle raw bytes.
///
/// # Example
///
/// ```
/// use sidenav_cache::{CacheExt, NullCache};
/// use std::collections::BTreeMap;
///
/// let cache = NullCache;
/// cache.set_json("sidebar_en.json", &BTreeMap::from([("/en/", 1)]));
/// let data: Option<(BTreeMap<String, i32>, bool)> = cache.get_json("sidebar_en.json", None);
/// assert!(data.is_none());
/// ```
pub trait CacheExt: Cache {
    /// Retrieve a JSON-deserialized snapshot and its freshness.
    ///
    /// Returns `None` on cache miss or deserialization failure.
    fn get_json<T: DeserializeOwned>(&self, key: &str, source_mtime: Option<SystemTime>) -> Option<(T, bool)> {
        let entry = self.get(key, source_mtime)?;
        match serde_json::from_slice(&entry.data) {
            Ok(value) => Some((value, entry.fresh)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable cache snapshot");
                None
            }
        }
    }

    /// Store a value as JSON.
    ///
    /// Silently does nothing if serialization fails.
    fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        if let Ok(bytes) = serde_json::to_vec(value) {
            self.set(key, &bytes);
        }
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

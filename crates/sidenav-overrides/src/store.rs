//! Override sidecar store.

use serde_json::{Map, Value};

use crate::StoreError;
use crate::json_file::{read_checked, read_lenient, write_if_changed};
use crate::layout::{OverrideKind, SidecarLayout};

/// Raw override values of one kind in one scope, keyed by path key.
pub type OverrideRecord = Map<String, Value>;

/// Reads and writes override sidecar files.
#[derive(Debug, Clone)]
pub struct OverrideStore {
    layout: SidecarLayout,
}

impl OverrideStore {
    #[must_use]
    pub fn new(layout: SidecarLayout) -> Self {
        Self { layout }
    }

    #[must_use]
    pub fn layout(&self) -> &SidecarLayout {
        &self.layout
    }

    /// Read the override record of `kind` for a scope.
    ///
    /// Never fails; absent or malformed files read as an empty record.
    #[must_use]
    pub fn read(&self, kind: OverrideKind, lang: &str, signature: &str) -> OverrideRecord {
        read_lenient(&self.layout.config_file(kind, lang, signature))
    }

    /// Read the override record of `kind` for a scope before rewriting it.
    ///
    /// Absent files read as an empty record. Malformed files are errors so
    /// the caller leaves them untouched.
    pub fn load(&self, kind: OverrideKind, lang: &str, signature: &str) -> Result<OverrideRecord, StoreError> {
        read_checked(&self.layout.config_file(kind, lang, signature))
    }

    /// Persist the override record of `kind` for a scope.
    ///
    /// Returns whether the file changed on disk.
    pub fn write(&self, kind: OverrideKind, lang: &str, signature: &str, record: &OverrideRecord) -> Result<bool, StoreError> {
        let path = self.layout.config_file(kind, lang, signature);
        let written = write_if_changed(&path, record, record.is_empty())?;
        if written {
            tracing::debug!(path = %path.display(), %kind, "Wrote override sidecar");
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store(tmp: &tempfile::TempDir) -> OverrideStore {
        OverrideStore::new(SidecarLayout::new(tmp.path()))
    }

    #[test]
    fn test_read_absent_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(store(&tmp).read(OverrideKind::Label, "en", "_root").is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp);
        let mut record = OverrideRecord::new();
        record.insert("guide/".to_owned(), json!("Guide"));
        record.insert("_self_".to_owned(), json!("Docs"));

        assert!(store.write(OverrideKind::Label, "en", "_root", &record).unwrap());

        assert!(tmp.path().join("en/locales.json").exists());
        assert_eq!(store.read(OverrideKind::Label, "en", "_root"), record);
    }

    #[test]
    fn test_write_preserves_key_order() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp);
        let mut record = OverrideRecord::new();
        record.insert("zeta.md".to_owned(), json!(1));
        record.insert("alpha.md".to_owned(), json!(2));

        store.write(OverrideKind::Order, "en", "guide", &record).unwrap();

        let keys: Vec<String> = store
            .read(OverrideKind::Order, "en", "guide")
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["zeta.md", "alpha.md"]);
    }

    #[test]
    fn test_second_identical_write_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp);
        let mut record = OverrideRecord::new();
        record.insert("a.md".to_owned(), json!(false));

        assert!(store.write(OverrideKind::Visibility, "en", "_root", &record).unwrap());
        assert!(!store.write(OverrideKind::Visibility, "en", "_root", &record).unwrap());
    }

    #[test]
    fn test_load_rejects_malformed_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp);
        std::fs::create_dir_all(tmp.path().join("en")).unwrap();
        std::fs::write(tmp.path().join("en/order.json"), "{\"a.md\": 1,}").unwrap();

        assert!(store.load(OverrideKind::Order, "en", "_root").is_err());
        assert!(store.read(OverrideKind::Order, "en", "_root").is_empty());
        assert!(store.load(OverrideKind::Label, "en", "_root").unwrap().is_empty());
    }
}

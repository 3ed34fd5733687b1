//! Provenance metadata for override values.
//!
//! Every override entry has a twin metadata entry recording the hash of the
//! value the system last wrote, whether a human owns the value, and whether
//! the item is currently present in the generated structure.

use std::collections::BTreeMap;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StoreError;
use crate::json_file::{read_checked, read_lenient, write_if_changed};
use crate::layout::{OverrideKind, SidecarLayout};

/// Provenance of one override entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEntry {
    /// Hash of the last system-written value.
    pub value_hash: String,
    /// Whether the value is owned by a human.
    pub is_user_set: bool,
    /// Whether the item was present in the last generated structure.
    pub is_active_in_structure: bool,
}

impl MetadataEntry {
    /// Entry for a value the system just wrote.
    #[must_use]
    pub fn system(value: &Value) -> Self {
        Self {
            value_hash: value_hash(value),
            is_user_set: false,
            is_active_in_structure: true,
        }
    }

    /// Entry for a value found on disk without any provenance.
    #[must_use]
    pub fn adopted(value: &Value, is_user_set: bool) -> Self {
        Self {
            is_user_set,
            ..Self::system(value)
        }
    }
}

/// Metadata entries of one kind in one scope, keyed like the override record.
pub type MetadataRecord = BTreeMap<String, MetadataEntry>;

/// Hash of an override value.
///
/// Strings hash their raw text, other values their compact JSON encoding.
#[must_use]
pub fn value_hash(value: &Value) -> String {
    let text = match value {
        Value::Null => return "null_or_undefined_hash".to_owned(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    hex::encode(Md5::digest(text.as_bytes()))
}

/// Whether the current override value must be treated as a human edit.
///
/// No metadata means the value is system-owned. An explicit `isUserSet`
/// always wins. Otherwise a value whose hash differs from the recorded
/// system hash was edited by hand.
#[must_use]
pub fn is_user_modified(current: &Value, entry: Option<&MetadataEntry>) -> bool {
    match entry {
        None => false,
        Some(entry) if entry.is_user_set => true,
        Some(entry) => value_hash(current) != entry.value_hash,
    }
}

/// Reads and writes metadata sidecar files.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    layout: SidecarLayout,
}

impl MetadataStore {
    #[must_use]
    pub fn new(layout: SidecarLayout) -> Self {
        Self { layout }
    }

    /// Read the metadata record of `kind` for a scope.
    ///
    /// Never fails; absent or malformed files read as an empty record.
    #[must_use]
    pub fn read(&self, kind: OverrideKind, lang: &str, signature: &str) -> MetadataRecord {
        read_lenient(&self.layout.metadata_file(kind, lang, signature))
    }

    /// Read the metadata record of `kind` for a scope before rewriting it.
    ///
    /// Absent files read as an empty record. Malformed files are errors so
    /// the caller leaves them untouched.
    pub fn load(&self, kind: OverrideKind, lang: &str, signature: &str) -> Result<MetadataRecord, StoreError> {
        read_checked(&self.layout.metadata_file(kind, lang, signature))
    }

    /// Persist the metadata record of `kind` for a scope.
    ///
    /// Returns whether the file changed on disk.
    pub fn write(&self, kind: OverrideKind, lang: &str, signature: &str, record: &MetadataRecord) -> Result<bool, StoreError> {
        let path = self.layout.metadata_file(kind, lang, signature);
        write_if_changed(&path, record, record.is_empty())
    }

    /// Whether any entry of any kind in the scope is user-set.
    #[must_use]
    pub fn has_user_set(&self, lang: &str, signature: &str) -> bool {
        OverrideKind::ALL.iter().any(|&kind| {
            self.read(kind, lang, signature)
                .values()
                .any(|entry| entry.is_user_set)
        })
    }

    /// Whether any entry of any kind in the scope is still active.
    #[must_use]
    pub fn has_active(&self, lang: &str, signature: &str) -> bool {
        OverrideKind::ALL.iter().any(|&kind| {
            self.read(kind, lang, signature)
                .values()
                .any(|entry| entry.is_active_in_structure)
        })
    }

    /// Mark every entry of the scope inactive.
    ///
    /// Stops at the first malformed file without rewriting it.
    pub fn deactivate_all(&self, lang: &str, signature: &str) -> Result<(), StoreError> {
        for kind in OverrideKind::ALL {
            let mut record = self.load(kind, lang, signature)?;
            for entry in record.values_mut() {
                entry.is_active_in_structure = false;
            }
            self.write(kind, lang, signature, &record)?;
        }
        Ok(())
    }
}

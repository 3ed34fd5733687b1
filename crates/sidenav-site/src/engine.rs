//! Reconciliation of one override kind within one scope.
//!
//! Works purely on in-memory records: the caller reads the override and
//! metadata files, runs [`sync_records`], and writes them back.

use std::collections::HashSet;

use serde_json::{Value, json};
use sidenav_overrides::{MetadataEntry, MetadataRecord, OverrideKind, OverrideRecord, SELF_KEY, is_user_modified};

use crate::item::{NavItem, UNORDERED_PRIORITY};

/// Counts of what one reconciliation did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    /// Defaults written for items without an entry.
    pub synthesized: usize,
    /// System-owned entries updated to a changed default.
    pub refreshed: usize,
    /// Human-owned entries left untouched.
    pub preserved: usize,
    /// System-owned entries of vanished items that were deleted.
    pub stale_removed: usize,
    /// Human-owned entries of vanished items kept for later restoration.
    pub stale_kept: usize,
}

/// Value the system writes for `item` when no override exists.
///
/// `None` when the kind does not apply (collapse state of a non-directory).
#[must_use]
pub fn default_value(kind: OverrideKind, item: &NavItem) -> Option<Value> {
    match kind {
        OverrideKind::Label => Some(json!(item.text)),
        OverrideKind::Order => Some(json!(item.priority.unwrap_or(UNORDERED_PRIORITY))),
        OverrideKind::Collapse => item
            .is_directory
            .then(|| json!(item.collapsed.unwrap_or(true))),
        OverrideKind::Visibility => Some(json!(item.hidden)),
    }
}

/// Interpret an order override as a priority.
///
/// Accepts integers, floats (rounded) and numeric strings.
#[must_use]
pub fn order_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            #[allow(clippy::cast_possible_truncation)]
            n.as_f64().map(|f| f.round() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reconcile `items` against the records of one kind.
///
/// - Items without an override entry get the generated default and a
///   system metadata entry.
/// - Human-owned entries (explicit flag or hash mismatch) are kept verbatim
///   and flagged user-set.
/// - System-owned entries follow the generated default.
/// - Entries of vanished items are deleted when system-owned and kept
///   inactive when human-owned.
///
/// Order entries also seed each item's working priority.
pub fn sync_records(kind: OverrideKind, items: &mut [NavItem], overrides: &mut OverrideRecord, metadata: &mut MetadataRecord) -> SyncStats {
    let mut stats = SyncStats::default();
    let mut present = HashSet::new();

    for item in items.iter_mut() {
        let key = item.path_key.clone();
        present.insert(key.clone());
        let Some(default) = default_value(kind, item) else {
            continue;
        };

        let value = match overrides.get(&key).cloned() {
            None => {
                overrides.insert(key.clone(), default.clone());
                metadata.insert(key, MetadataEntry::system(&default));
                stats.synthesized += 1;
                default
            }
            Some(current) => {
                let modified = is_user_modified(&current, metadata.get(&key));
                match metadata.get_mut(&key) {
                    None => {
                        let owned = current != default;
                        metadata.insert(key, MetadataEntry::adopted(&current, owned));
                        if owned {
                            stats.preserved += 1;
                        }
                        current
                    }
                    Some(entry) if modified => {
                        if !entry.is_user_set {
                            tracing::debug!(key = %key, %kind, "Detected hand-edited override");
                            entry.is_user_set = true;
                        }
                        entry.is_active_in_structure = true;
                        stats.preserved += 1;
                        current
                    }
                    Some(entry) if current != default => {
                        *entry = MetadataEntry::system(&default);
                        overrides.insert(key, default.clone());
                        stats.refreshed += 1;
                        default
                    }
                    Some(entry) => {
                        entry.is_active_in_structure = true;
                        current
                    }
                }
            }
        };

        if kind == OverrideKind::Order
            && let Some(priority) = order_number(&value)
        {
            item.priority = Some(priority);
        }
    }

    let stale: Vec<String> = overrides
        .keys()
        .filter(|key| key.as_str() != SELF_KEY && !present.contains(key.as_str()))
        .cloned()
        .collect();
    for key in stale {
        let owned = overrides
            .get(&key)
            .is_some_and(|value| is_user_modified(value, metadata.get(&key)));
        if owned {
            if let Some(entry) = metadata.get_mut(&key) {
                entry.is_user_set = true;
                entry.is_active_in_structure = false;
            }
            stats.stale_kept += 1;
        } else {
            overrides.remove(&key);
            metadata.remove(&key);
            stats.stale_removed += 1;
        }
    }

    metadata.retain(|key, _| key == SELF_KEY || overrides.contains_key(key));
    stats
}

//! Per-scope override synchronization.
//!
//! Walks a generated view scope by scope. For every scope it reconciles the
//! four sidecar files with the items (see [`sync_records`]), records each
//! directory's own `_self_` values, and snapshots sidecar folders whose
//! content directory vanished. Malformed sidecars are logged and left on
//! disk untouched. [`Synchronizer::reapply_view`] then applies
//! the stored values back onto the items.

use std::path::Path;

use serde_json::{Value, json};
use sidenav_overrides::{
    ArchiveService, MetadataEntry, MetadataStore, OverrideKind, OverrideRecord, OverrideStore,
    REASON_DIRECTORY_REMOVED, SELF_KEY, StoreError, child_signature, signature_path,
};

use crate::engine::{order_number, sync_records};
use crate::item::NavItem;
use crate::signatures::{directory_signature, signatures_under, subfolder_names};

/// Synchronizes one language's views with its sidecars.
pub struct Synchronizer<'a> {
    overrides: &'a OverrideStore,
    metadata: &'a MetadataStore,
    archive: &'a ArchiveService,
    lang: &'a str,
    lang_root: &'a Path,
}

impl<'a> Synchronizer<'a> {
    #[must_use]
    pub fn new(overrides: &'a OverrideStore, metadata: &'a MetadataStore, archive: &'a ArchiveService, lang: &'a str, lang_root: &'a Path) -> Self {
        Self {
            overrides,
            metadata,
            archive,
            lang,
            lang_root,
        }
    }

    /// Reconcile the sidecars of every scope reachable from a view.
    ///
    /// Write failures are logged per file and never abort the pass.
    pub fn sync_view(&self, view_dir: &Path, items: &mut [NavItem]) {
        let Some(signature) = directory_signature(self.lang_root, view_dir) else {
            tracing::warn!(dir = %view_dir.display(), "View lies outside the language root");
            return;
        };

        if is_root_container(items, view_dir) {
            let container = &mut items[0];
            self.ensure_self(container, &signature);
            if let Some(children) = container.items.as_mut() {
                self.sync_scope(children, &signature);
            }
        } else {
            self.sync_scope(items, &signature);
        }
    }

    /// Apply stored labels, collapse state, visibility and order to a view.
    pub fn reapply_view(&self, view_dir: &Path, items: &mut [NavItem]) {
        let Some(signature) = directory_signature(self.lang_root, view_dir) else {
            return;
        };

        if is_root_container(items, view_dir) {
            let container = &mut items[0];
            if let Some(Value::String(text)) = self.read(OverrideKind::Label, &signature).get(SELF_KEY) {
                container.text.clone_from(text);
            }
            if let Some(Value::Bool(collapsed)) = self.read(OverrideKind::Collapse, &signature).get(SELF_KEY) {
                container.collapsed = Some(*collapsed);
            }
            if let Some(children) = container.items.as_mut() {
                self.reapply_scope(children, &signature);
            }
        } else {
            self.reapply_scope(items, &signature);
        }
    }

    fn sync_scope(&self, items: &mut [NavItem], signature: &str) {
        for kind in OverrideKind::ALL {
            if let Err(e) = self.sync_kind(kind, items, signature) {
                tracing::warn!(error = %e, %kind, signature, lang = self.lang, "Failed to sync overrides");
            }
        }

        for item in items.iter_mut().filter(|item| item.is_directory) {
            let Some(child) = item
                .source_path
                .as_deref()
                .and_then(|dir| directory_signature(self.lang_root, dir))
            else {
                continue;
            };
            self.ensure_self(item, &child);
            if item.has_expanded_children()
                && let Some(children) = item.items.as_mut()
            {
                self.sync_scope(children, &child);
            }
        }

        self.archive_orphans(signature);
    }

    fn sync_kind(&self, kind: OverrideKind, items: &mut [NavItem], signature: &str) -> Result<(), StoreError> {
        let mut overrides = self.overrides.load(kind, self.lang, signature)?;
        let mut metadata = self.metadata.load(kind, self.lang, signature)?;

        let stats = sync_records(kind, items, &mut overrides, &mut metadata);
        tracing::trace!(?stats, %kind, signature, "Synced scope");

        self.overrides.write(kind, self.lang, signature, &overrides)?;
        self.metadata.write(kind, self.lang, signature, &metadata)?;
        Ok(())
    }

    /// Record a directory's own label, collapse state and visibility in its
    /// scope, unless already present.
    fn ensure_self(&self, item: &NavItem, signature: &str) {
        let values = [
            (OverrideKind::Label, json!(item.text)),
            (OverrideKind::Collapse, json!(item.collapsed.unwrap_or(true))),
            (OverrideKind::Visibility, json!(false)),
        ];
        for (kind, value) in values {
            if let Err(e) = self.ensure_self_value(kind, signature, value) {
                tracing::warn!(error = %e, %kind, signature, "Failed to record directory values");
            }
        }
    }

    fn ensure_self_value(&self, kind: OverrideKind, signature: &str, value: Value) -> Result<(), StoreError> {
        let mut record = self.overrides.load(kind, self.lang, signature)?;
        let mut metadata = self.metadata.load(kind, self.lang, signature)?;
        if record.contains_key(SELF_KEY) {
            if let Some(entry) = metadata.get_mut(SELF_KEY).filter(|e| !e.is_active_in_structure) {
                entry.is_active_in_structure = true;
                self.metadata.write(kind, self.lang, signature, &metadata)?;
            }
            return Ok(());
        }
        metadata.insert(SELF_KEY.to_owned(), MetadataEntry::system(&value));
        record.insert(SELF_KEY.to_owned(), value);

        self.overrides.write(kind, self.lang, signature, &record)?;
        self.metadata.write(kind, self.lang, signature, &metadata)?;
        Ok(())
    }

    /// Snapshot and deactivate sidecar sub-folders of `signature` whose
    /// directory is gone.
    ///
    /// Only folders holding a human-set value are handled here. They stay in
    /// place so a recreated directory picks its values up again, and a
    /// snapshot is taken once, while entries are still active. The rest are
    /// left for the cleanup stage to delete.
    fn archive_orphans(&self, signature: &str) {
        let mut names = subfolder_names(&self.overrides.layout().config_dir(self.lang, signature));
        names.extend(subfolder_names(&self.overrides.layout().metadata_dir(self.lang, signature)));
        let content_dir = self.lang_root.join(signature_path(signature));

        for name in names {
            if content_dir.join(&name).is_dir() {
                continue;
            }
            let orphan = child_signature(signature, &name);
            let subtree = signatures_under(self.overrides.layout(), self.lang, &orphan);
            if !subtree.iter().any(|s| self.metadata.has_user_set(self.lang, s)) {
                continue;
            }
            let newly_removed = subtree.iter().any(|s| self.metadata.has_active(self.lang, s));

            for s in &subtree {
                if let Err(e) = self.metadata.deactivate_all(self.lang, s) {
                    tracing::warn!(error = %e, signature = %s, "Failed to deactivate metadata");
                }
            }
            if !newly_removed {
                continue;
            }
            match self
                .archive
                .archive_removed_directory(self.lang, &orphan, REASON_DIRECTORY_REMOVED)
            {
                Ok(Some(archived)) => {
                    tracing::debug!(package = %archived.package.display(), signature = %orphan, "Archived orphaned overrides");
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, signature = %orphan, "Failed to archive orphaned overrides"),
            }
        }
    }

    fn reapply_scope(&self, items: &mut [NavItem], signature: &str) {
        let labels = self.read(OverrideKind::Label, signature);
        let order = self.read(OverrideKind::Order, signature);
        let collapse = self.read(OverrideKind::Collapse, signature);
        let hidden = self.read(OverrideKind::Visibility, signature);

        for item in items.iter_mut() {
            let key = item.path_key.clone();
            let label = labels.get(&key).and_then(Value::as_str).map(str::to_owned);
            let collapsed = collapse.get(&key).and_then(Value::as_bool);
            item.hidden = hidden.get(&key) == Some(&Value::Bool(true));
            if let Some(priority) = order.get(&key).and_then(order_number) {
                item.priority = Some(priority);
            }

            let child = item
                .source_path
                .as_deref()
                .filter(|_| item.is_directory)
                .and_then(|dir| directory_signature(self.lang_root, dir));

            let (label, collapsed) = match &child {
                Some(child) if label.is_none() || collapsed.is_none() => (
                    label.or_else(|| {
                        self.read(OverrideKind::Label, child)
                            .get(SELF_KEY)
                            .and_then(Value::as_str)
                            .map(str::to_owned)
                    }),
                    collapsed.or_else(|| {
                        self.read(OverrideKind::Collapse, child)
                            .get(SELF_KEY)
                            .and_then(Value::as_bool)
                    }),
                ),
                _ => (label, collapsed),
            };

            if let Some(text) = label {
                item.text = text;
            }
            if item.is_directory
                && let Some(collapsed) = collapsed
            {
                item.collapsed = Some(collapsed);
            }

            if let Some(child) = child
                && item.has_expanded_children()
                && let Some(children) = item.items.as_mut()
            {
                self.reapply_scope(children, &child);
            }
        }
    }

    fn read(&self, kind: OverrideKind, signature: &str) -> OverrideRecord {
        self.overrides.read(kind, self.lang, signature)
    }
}

/// Whether `items` is the single container of a flattened root view.
fn is_root_container(items: &[NavItem], view_dir: &Path) -> bool {
    matches!(items, [container] if container.is_root && container.source_path.as_deref() == Some(view_dir))
}

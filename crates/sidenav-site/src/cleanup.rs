//! Removal of sidecar folders whose content directory is gone.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use sidenav_overrides::{MetadataStore, ROOT_SIGNATURE, SidecarLayout, signature_path};

use crate::signatures::{is_within, on_disk_signatures};

/// What one cleanup run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// Signatures whose folders were deleted.
    pub deleted: Vec<String>,
    /// Signatures kept in place, all entries marked inactive, because they
    /// hold human-set values.
    pub soft_archived: Vec<String>,
}

/// Deletes outdated sidecar folders of one language.
///
/// A folder is outdated when its signature is not part of the generated
/// tree and its content directory no longer exists. Outdated subtrees
/// holding any user-set value are only deactivated.
pub struct DirectoryCleanup<'a> {
    layout: &'a SidecarLayout,
    metadata: &'a MetadataStore,
    lang: &'a str,
    lang_root: &'a Path,
}

impl<'a> DirectoryCleanup<'a> {
    #[must_use]
    pub fn new(layout: &'a SidecarLayout, metadata: &'a MetadataStore, lang: &'a str, lang_root: &'a Path) -> Self {
        Self {
            layout,
            metadata,
            lang,
            lang_root,
        }
    }

    /// Clean every outdated folder not covered by `active`.
    ///
    /// Failures are logged per folder.
    pub fn run(&self, active: &BTreeSet<String>) -> CleanupReport {
        let on_disk = on_disk_signatures(self.layout, self.lang);
        let outdated: Vec<&String> = on_disk
            .iter()
            .filter(|s| s.as_str() != ROOT_SIGNATURE && !active.contains(*s))
            .filter(|s| !self.lang_root.join(signature_path(s)).is_dir())
            .collect();

        let mut report = CleanupReport::default();
        for signature in outdated
            .iter()
            .copied()
            .filter(|s| !outdated.iter().any(|o| o != s && is_within(s, o)))
        {
            let subtree: Vec<&String> = on_disk.iter().filter(|s| is_within(s, signature)).collect();
            if subtree.iter().any(|s| self.metadata.has_user_set(self.lang, s)) {
                for s in &subtree {
                    if let Err(e) = self.metadata.deactivate_all(self.lang, s) {
                        tracing::warn!(error = %e, signature = %s, "Failed to deactivate metadata");
                    }
                }
                tracing::info!(signature = %signature, lang = self.lang, "Kept user overrides of removed directory");
                report.soft_archived.push(signature.clone());
                continue;
            }

            match self.remove(signature) {
                Ok(()) => {
                    tracing::debug!(signature = %signature, lang = self.lang, "Removed outdated overrides");
                    report.deleted.push(signature.clone());
                }
                Err(e) => tracing::warn!(error = %e, signature = %signature, "Failed to remove outdated overrides"),
            }
        }
        report
    }

    fn remove(&self, signature: &str) -> io::Result<()> {
        for dir in [
            self.layout.config_dir(self.lang, signature),
            self.layout.metadata_dir(self.lang, signature),
        ] {
            match fs::remove_dir_all(&dir) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }
}

//! Directory signatures seen in a generated tree and on disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use sidenav_overrides::{ROOT_SIGNATURE, SidecarLayout, child_signature, signature_for};

use crate::item::NavItem;
use crate::links::relative_path;

/// Signature of a directory below `lang_root`, or `None` when it lies outside.
#[must_use]
pub fn directory_signature(lang_root: &Path, dir: &Path) -> Option<String> {
    relative_path(lang_root, dir).map(|relative| signature_for(&relative))
}

/// Signatures of every directory item in `items`, recursively.
#[must_use]
pub fn active_signatures(items: &[NavItem], lang_root: &Path) -> BTreeSet<String> {
    let mut signatures = BTreeSet::new();
    collect_active(items, lang_root, &mut signatures);
    signatures
}

fn collect_active(items: &[NavItem], lang_root: &Path, out: &mut BTreeSet<String>) {
    for item in items.iter().filter(|item| item.is_directory) {
        if let Some(signature) = item
            .source_path
            .as_deref()
            .and_then(|dir| directory_signature(lang_root, dir))
        {
            out.insert(signature);
        }
        collect_active(item.children(), lang_root, out);
    }
}

/// Signatures with a sidecar or metadata folder for `lang`.
#[must_use]
pub fn on_disk_signatures(layout: &SidecarLayout, lang: &str) -> BTreeSet<String> {
    signatures_under(layout, lang, ROOT_SIGNATURE)
}

/// `signature` and every nested signature with a folder in either tree.
///
/// `signature` itself is included only when one of its folders exists.
#[must_use]
pub fn signatures_under(layout: &SidecarLayout, lang: &str, signature: &str) -> BTreeSet<String> {
    let mut signatures = BTreeSet::new();
    for dir in [layout.config_dir(lang, signature), layout.metadata_dir(lang, signature)] {
        if dir.is_dir() {
            signatures.insert(signature.to_owned());
            collect_folders(&dir, signature, &mut signatures);
        }
    }
    signatures
}

fn collect_folders(dir: &Path, signature: &str, out: &mut BTreeSet<String>) {
    for name in subfolder_names(dir) {
        let child = child_signature(signature, &name);
        collect_folders(&dir.join(&name), &child, out);
        out.insert(child);
    }
}

/// Names of the non-dot sub-directories of `dir`, sorted.
pub(crate) fn subfolder_names(dir: &Path) -> BTreeSet<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return BTreeSet::new();
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
        .filter(|name| !name.starts_with('.'))
        .collect()
}

/// Whether `signature` equals `ancestor` or lies below it.
#[must_use]
pub fn is_within(signature: &str, ancestor: &str) -> bool {
    ancestor == ROOT_SIGNATURE
        || signature == ancestor
        || signature
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}

//! Configuration layering from the language root down to a directory.
//!
//! Layers are applied in increasing precedence:
//!
//! 1. global defaults
//! 2. each directory on the chain from the language root to the target
//!    (inclusive), with its `root` flag stripped
//! 3. the target directory's own front matter, unmodified
//!
//! Each layer overwrites whole fields of the layers below it.

use crate::frontmatter::FrontMatter;

/// Build the ancestor chain for a path relative to the language root.
///
/// Returns ancestors from the language root to the path itself.
/// E.g., `"guide/concepts/api"` → `["", "guide", "guide/concepts", "guide/concepts/api"]`
#[must_use]
pub(crate) fn build_ancestor_chain(path: &str) -> Vec<String> {
    let mut ancestors = vec![String::new()];

    let mut current = String::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(part);
        ancestors.push(current.clone());
    }

    ancestors
}

/// Merge configuration layers into one partial configuration.
///
/// `chain` holds the front matter of every directory from the language root
/// to the target, in that order. `target` is the target's own front matter.
#[must_use]
pub(crate) fn merge_layers(defaults: &FrontMatter, chain: &[&FrontMatter], target: &FrontMatter) -> FrontMatter {
    let mut merged = defaults.clone();
    for layer in chain {
        merged.overlay(&layer.without_root());
    }
    merged.overlay(target);
    merged
}

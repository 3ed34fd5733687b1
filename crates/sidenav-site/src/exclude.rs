//! Skipping externally imported documentation.

use std::path::{Path, PathBuf};

/// Marker file of an imported documentation book.
pub const IMPORTED_MARKER: &str = "SUMMARY.md";

/// Paths the generator never descends into.
///
/// A path is excluded when it lies under one of the configured roots, or
/// when it is a directory holding [`IMPORTED_MARKER`] and detection is on.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    roots: Vec<PathBuf>,
    detect_imported: bool,
}

impl Exclusions {
    /// Build exclusions for one language.
    ///
    /// `exclude` entries are relative to `lang_root`.
    #[must_use]
    pub fn new(lang_root: &Path, exclude: &[String], detect_imported: bool) -> Self {
        let roots = exclude
            .iter()
            .map(|rel| rel.trim_matches('/'))
            .filter(|rel| !rel.is_empty())
            .map(|rel| lang_root.join(rel))
            .collect();
        Self {
            roots,
            detect_imported,
        }
    }

    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.roots.iter().any(|root| path.starts_with(root)) {
            return true;
        }
        self.detect_imported && path.is_dir() && path.join(IMPORTED_MARKER).is_file()
    }
}

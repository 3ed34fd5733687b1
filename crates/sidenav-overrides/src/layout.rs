//! Override kinds, directory signatures and the on-disk sidecar layout.
//!
//! ```text
//! <overrides>/
//! ├── <lang>/                      # `_root` scope of the language
//! │   ├── locales.json
//! │   ├── order.json
//! │   ├── collapsed.json
//! │   ├── hidden.json
//! │   └── guide/concepts/…         # scope with signature `guide/concepts`
//! ├── .metadata/<lang>/…           # provenance twin of every sidecar file
//! └── .archive/                    # removed-directory packages
//! ```

use std::path::{Path, PathBuf};

/// Signature of a language's root directory.
pub const ROOT_SIGNATURE: &str = "_root";

/// Reserved key for a directory's own value inside its scope.
pub const SELF_KEY: &str = "_self_";

const METADATA_DIR: &str = ".metadata";
const ARCHIVE_DIR: &str = ".archive";

/// One of the four editable override kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideKind {
    /// Display text.
    Label,
    /// Sort priority.
    Order,
    /// Collapse state (directories only).
    Collapse,
    /// Hidden flag.
    Visibility,
}

impl OverrideKind {
    /// All kinds, in synchronization order.
    pub const ALL: [Self; 4] = [Self::Label, Self::Order, Self::Collapse, Self::Visibility];

    /// Sidecar file name for this kind.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Label => "locales.json",
            Self::Order => "order.json",
            Self::Collapse => "collapsed.json",
            Self::Visibility => "hidden.json",
        }
    }

    /// Whether `name` is one of the sidecar file names.
    #[must_use]
    pub fn is_sidecar_file(name: &str) -> bool {
        Self::ALL.iter().any(|kind| kind.file_name() == name)
    }
}

impl std::fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Label => "label",
            Self::Order => "order",
            Self::Collapse => "collapse",
            Self::Visibility => "visibility",
        };
        f.write_str(name)
    }
}

/// Signature of the directory at `relative` (from the language root).
///
/// Empty paths map to [`ROOT_SIGNATURE`].
#[must_use]
pub fn signature_for(relative: &str) -> String {
    let trimmed = relative.trim_matches('/');
    if trimmed.is_empty() {
        ROOT_SIGNATURE.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Signature of the child directory `name` inside the scope `parent`.
#[must_use]
pub fn child_signature(parent: &str, name: &str) -> String {
    if parent == ROOT_SIGNATURE {
        name.to_owned()
    } else {
        format!("{parent}/{name}")
    }
}

/// Content path of a signature relative to the language root.
#[must_use]
pub fn signature_path(signature: &str) -> &str {
    if signature == ROOT_SIGNATURE {
        ""
    } else {
        signature
    }
}

/// Resolves sidecar locations below the override root.
#[derive(Debug, Clone)]
pub struct SidecarLayout {
    root: PathBuf,
}

impl SidecarLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Override root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root of the metadata twin tree.
    #[must_use]
    pub fn metadata_root(&self) -> PathBuf {
        self.root.join(METADATA_DIR)
    }

    /// Root of the archive tree.
    #[must_use]
    pub fn archive_root(&self) -> PathBuf {
        self.root.join(ARCHIVE_DIR)
    }

    /// Sidecar folder of a language's root scope.
    #[must_use]
    pub fn lang_config_root(&self, lang: &str) -> PathBuf {
        join_lang(&self.root, lang)
    }

    /// Metadata folder of a language's root scope.
    #[must_use]
    pub fn lang_metadata_root(&self, lang: &str) -> PathBuf {
        join_lang(&self.metadata_root(), lang)
    }

    /// Sidecar folder of a scope.
    #[must_use]
    pub fn config_dir(&self, lang: &str, signature: &str) -> PathBuf {
        join_signature(self.lang_config_root(lang), signature)
    }

    /// Metadata folder of a scope.
    #[must_use]
    pub fn metadata_dir(&self, lang: &str, signature: &str) -> PathBuf {
        join_signature(self.lang_metadata_root(lang), signature)
    }

    /// Sidecar file of one kind in a scope.
    #[must_use]
    pub fn config_file(&self, kind: OverrideKind, lang: &str, signature: &str) -> PathBuf {
        self.config_dir(lang, signature).join(kind.file_name())
    }

    /// Metadata file of one kind in a scope.
    #[must_use]
    pub fn metadata_file(&self, kind: OverrideKind, lang: &str, signature: &str) -> PathBuf {
        self.metadata_dir(lang, signature).join(kind.file_name())
    }
}

fn join_lang(base: &Path, lang: &str) -> PathBuf {
    if lang.is_empty() {
        base.to_path_buf()
    } else {
        base.join(lang)
    }
}

fn join_signature(base: PathBuf, signature: &str) -> PathBuf {
    if signature == ROOT_SIGNATURE {
        base
    } else {
        signature.split('/').fold(base, |path, part| path.join(part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_file_names() {
        assert_eq!(OverrideKind::Label.file_name(), "locales.json");
        assert_eq!(OverrideKind::Order.file_name(), "order.json");
        assert_eq!(OverrideKind::Collapse.file_name(), "collapsed.json");
        assert_eq!(OverrideKind::Visibility.file_name(), "hidden.json");
        assert!(OverrideKind::is_sidecar_file("hidden.json"));
        assert!(!OverrideKind::is_sidecar_file("backup_info.json"));
    }

    #[test]
    fn test_signatures() {
        assert_eq!(signature_for(""), "_root");
        assert_eq!(signature_for("guide/"), "guide");
        assert_eq!(child_signature("_root", "guide"), "guide");
        assert_eq!(child_signature("guide", "concepts"), "guide/concepts");
        assert_eq!(signature_path("_root"), "");
        assert_eq!(signature_path("guide/concepts"), "guide/concepts");
    }

    #[test]
    fn test_layout_paths() {
        let layout = SidecarLayout::new("/o");
        assert_eq!(layout.config_dir("en", "_root"), PathBuf::from("/o/en"));
        assert_eq!(
            layout.config_file(OverrideKind::Order, "en", "guide/concepts"),
            PathBuf::from("/o/en/guide/concepts/order.json")
        );
        assert_eq!(
            layout.metadata_file(OverrideKind::Label, "en", "_root"),
            PathBuf::from("/o/.metadata/en/locales.json")
        );
        assert_eq!(layout.archive_root(), PathBuf::from("/o/.archive"));
    }

    #[test]
    fn test_layout_empty_language() {
        let layout = SidecarLayout::new("/o");
        assert_eq!(layout.config_dir("", "_root"), PathBuf::from("/o"));
        assert_eq!(layout.metadata_dir("", "guide"), PathBuf::from("/o/.metadata/guide"));
    }
}

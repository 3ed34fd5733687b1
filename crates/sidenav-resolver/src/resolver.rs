//! Effective per-directory configuration.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::frontmatter::{ExternalLinkConfig, FrontMatter, GroupConfig, read_front_matter};
use crate::global::{GlobalConfig, load_global_config};
use crate::inheritance::{build_ancestor_chain, merge_layers};

/// Name of the document that configures its directory.
pub const INDEX_FILE: &str = "index.md";

/// Whether a file name denotes its directory's index document.
///
/// The match ignores ASCII case, so `Index.md` configures its directory too.
#[must_use]
pub fn is_index_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(INDEX_FILE)
}

/// The index document of `dir`, if it has one.
#[must_use]
pub fn find_index(dir: &Path) -> Option<PathBuf> {
    let exact = dir.join(INDEX_FILE);
    if exact.is_file() {
        return Some(exact);
    }
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| is_index_name(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .find(|path| path.is_file())
}

/// Depth limit used when no layer sets `maxDepth`.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Fully resolved configuration of one directory.
///
/// Recomputed on every generation pass and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveDirConfig {
    /// Whether the directory starts its own navigation view.
    pub root: bool,
    /// Directory's own title, or its name.
    pub title: String,
    pub hidden: bool,
    pub priority: i64,
    /// Nesting depth expanded below the view root.
    pub max_depth: usize,
    /// Default collapse state for the directory's item.
    pub collapsed: bool,
    /// Child name → priority.
    pub item_order: BTreeMap<String, i64>,
    pub groups: Vec<GroupConfig>,
    pub external_links: Vec<ExternalLinkConfig>,
    /// Absolute path of the directory.
    pub path: PathBuf,
    pub lang: String,
    pub dev_mode: bool,
}

impl EffectiveDirConfig {
    /// Resolve a merged partial configuration, filling unset fields.
    ///
    /// `own` is the directory's own front matter. The title is taken from it
    /// alone so that a parent's title never names its children.
    #[must_use]
    pub fn from_layers(merged: &FrontMatter, own: &FrontMatter, path: &Path, lang: &str, dev_mode: bool) -> Self {
        let dir_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            root: merged.root.unwrap_or(false),
            title: own.title.clone().unwrap_or(dir_name),
            hidden: merged.hidden.unwrap_or(false),
            priority: merged.priority.unwrap_or(0),
            max_depth: merged
                .max_depth
                .map_or(DEFAULT_MAX_DEPTH, |d| usize::try_from(d.max(0)).unwrap_or(usize::MAX)),
            collapsed: merged.collapsed.unwrap_or(false),
            item_order: merged
                .item_order
                .as_ref()
                .map(crate::frontmatter::ItemOrder::to_priorities)
                .unwrap_or_default(),
            groups: merged.groups.clone().unwrap_or_default(),
            external_links: merged.external_links.clone().unwrap_or_default(),
            path: path.to_path_buf(),
            lang: lang.to_owned(),
            dev_mode,
        }
    }
}

/// Resolves [`EffectiveDirConfig`] for directories of the content tree.
///
/// Caches the global defaults file and every `index.md` front matter it
/// reads, so one resolver must only serve a single generation pass. Safe to
/// share across threads within that pass.
pub struct ConfigResolver {
    docs_root: PathBuf,
    global_config_path: PathBuf,
    global: RwLock<Option<Arc<GlobalConfig>>>,
    front_matter: RwLock<HashMap<PathBuf, Arc<FrontMatter>>>,
}

impl ConfigResolver {
    /// Create a resolver for the content tree at `docs_root`.
    #[must_use]
    pub fn new(docs_root: impl Into<PathBuf>, global_config_path: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
            global_config_path: global_config_path.into(),
            global: RwLock::new(None),
            front_matter: RwLock::new(HashMap::new()),
        }
    }

    /// Content directory of a language. The empty language is the docs root.
    #[must_use]
    pub fn lang_root(&self, lang: &str) -> PathBuf {
        if lang.is_empty() {
            self.docs_root.clone()
        } else {
            self.docs_root.join(lang)
        }
    }

    /// Global defaults, loaded once.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn global_config(&self) -> Arc<GlobalConfig> {
        if let Some(global) = self.global.read().unwrap().as_ref() {
            return Arc::clone(global);
        }

        let loaded = Arc::new(load_global_config(&self.global_config_path));
        *self.global.write().unwrap() = Some(Arc::clone(&loaded));
        loaded
    }

    /// Front matter of the index document of `dir`, or empty if there is none.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn local_front_matter(&self, dir: &Path) -> Arc<FrontMatter> {
        if let Some(fm) = self.front_matter.read().unwrap().get(dir) {
            return Arc::clone(fm);
        }

        let fm = Arc::new(
            find_index(dir)
                .map(|index| read_front_matter(&index))
                .unwrap_or_default(),
        );
        self.front_matter
            .write()
            .unwrap()
            .insert(dir.to_path_buf(), Arc::clone(&fm));
        fm
    }

    /// Resolve the effective configuration of `dir` for `lang`.
    ///
    /// Never fails: unreadable or missing configuration files contribute
    /// nothing.
    pub fn effective_config(&self, dir: &Path, lang: &str, dev_mode: bool) -> EffectiveDirConfig {
        let global = self.global_config();
        let defaults = global.defaults.as_front_matter();

        let chain_dirs = self.chain_dirs(dir, lang);
        let chain: Vec<Arc<FrontMatter>> = chain_dirs
            .iter()
            .map(|d| self.local_front_matter(d))
            .collect();
        let chain_refs: Vec<&FrontMatter> = chain.iter().map(AsRef::as_ref).collect();

        let own = self.local_front_matter(dir);
        let merged = merge_layers(&defaults, &chain_refs, &own);

        EffectiveDirConfig::from_layers(&merged, &own, dir, lang, dev_mode)
    }

    /// Directories from the language root down to `dir`, inclusive.
    fn chain_dirs(&self, dir: &Path, lang: &str) -> Vec<PathBuf> {
        let lang_root = self.lang_root(lang);
        let Ok(relative) = dir.strip_prefix(&lang_root) else {
            return vec![dir.to_path_buf()];
        };

        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        build_ancestor_chain(&relative)
            .into_iter()
            .map(|ancestor| {
                if ancestor.is_empty() {
                    lang_root.clone()
                } else {
                    lang_root.join(ancestor)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn resolver(tmp: &TempDir) -> ConfigResolver {
        ConfigResolver::new(tmp.path(), tmp.path().join(".sidebarrc.yml"))
    }

    #[test]
    fn test_defaults_without_any_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("en/guide")).unwrap();

        let config = resolver(&tmp).effective_config(&tmp.path().join("en/guide"), "en", false);

        assert!(!config.root);
        assert_eq!(config.title, "guide");
        assert!(!config.hidden);
        assert_eq!(config.priority, 0);
        assert_eq!(config.max_depth, 3);
        assert!(!config.collapsed);
        assert!(config.item_order.is_empty());
        assert!(config.groups.is_empty());
        assert!(config.external_links.is_empty());
        assert_eq!(config.lang, "en");
    }

    #[test]
    fn test_global_defaults_apply() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            ".sidebarrc.yml",
            "defaults:\n  maxDepth: 6\n  collapsed: true\n  hidden: true\n",
        );
        fs::create_dir_all(tmp.path().join("en/guide")).unwrap();

        let config = resolver(&tmp).effective_config(&tmp.path().join("en/guide"), "en", false);

        assert_eq!(config.max_depth, 6);
        assert!(config.collapsed);
        assert!(config.hidden);
    }

    #[test]
    fn test_ancestor_values_inherited_except_root() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "en/guide/index.md",
            "---\nroot: true\nmaxDepth: 2\ncollapsed: true\ntitle: Guide\n---\n",
        );
        fs::create_dir_all(tmp.path().join("en/guide/concepts")).unwrap();

        let config =
            resolver(&tmp).effective_config(&tmp.path().join("en/guide/concepts"), "en", false);

        assert!(!config.root, "root flag must not be inherited");
        assert_eq!(config.max_depth, 2);
        assert!(config.collapsed);
        assert_eq!(config.title, "concepts");
    }

    #[test]
    fn test_target_overrides_ancestors() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/index.md", "---\nmaxDepth: 1\ncollapsed: true\n---\n");
        write(
            tmp.path(),
            "en/guide/index.md",
            "---\nroot: true\nmaxDepth: 4\ntitle: User Guide\npriority: 2\n---\n",
        );

        let config = resolver(&tmp).effective_config(&tmp.path().join("en/guide"), "en", false);

        assert!(config.root);
        assert_eq!(config.max_depth, 4);
        assert!(config.collapsed);
        assert_eq!(config.title, "User Guide");
        assert_eq!(config.priority, 2);
    }

    #[test]
    fn test_item_order_list_normalized() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/index.md", "---\nitemOrder: [b, a]\n---\n");

        let config = resolver(&tmp).effective_config(&tmp.path().join("en"), "en", false);

        assert_eq!(config.item_order.get("b"), Some(&0));
        assert_eq!(config.item_order.get("a"), Some(&1));
    }

    #[test]
    fn test_empty_language_uses_docs_root() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "index.md", "---\ncollapsed: true\n---\n");
        fs::create_dir_all(tmp.path().join("guide")).unwrap();

        let r = resolver(&tmp);
        assert_eq!(r.lang_root(""), tmp.path());
        let config = r.effective_config(&tmp.path().join("guide"), "", false);

        assert!(config.collapsed);
    }

    #[test]
    fn test_front_matter_cached_per_resolver() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/index.md", "---\ntitle: First\n---\n");
        let r = resolver(&tmp);
        let dir = tmp.path().join("en");

        assert_eq!(r.effective_config(&dir, "en", false).title, "First");

        write(tmp.path(), "en/index.md", "---\ntitle: Second\n---\n");
        assert_eq!(r.effective_config(&dir, "en", false).title, "First");

        assert_eq!(resolver(&tmp).effective_config(&dir, "en", false).title, "Second");
    }

    #[test]
    fn test_index_lookup_ignores_case() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/guide/Index.md", "---\ntitle: Guide Home\n---\n");
        write(tmp.path(), "en/other/readme.md", "# Readme");
        let guide = tmp.path().join("en/guide");

        assert!(is_index_name("INDEX.md"));
        assert!(!is_index_name("index.mdx"));
        assert_eq!(find_index(&guide), Some(guide.join("Index.md")));
        assert_eq!(find_index(&tmp.path().join("en/other")), None);
        assert_eq!(resolver(&tmp).effective_config(&guide, "en", false).title, "Guide Home");
    }

    #[test]
    fn test_negative_max_depth_clamped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/index.md", "---\nmaxDepth: -4\n---\n");

        let config = resolver(&tmp).effective_config(&tmp.path().join("en"), "en", false);

        assert_eq!(config.max_depth, 0);
    }
}

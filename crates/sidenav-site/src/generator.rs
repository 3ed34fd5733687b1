//! Structural navigation generation.
//!
//! Walks the content tree of one language and turns each navigation view
//! into a tree of [`NavItem`]s. A view starts at the language root or at a
//! root-flagged directory:
//!
//! - A root-flagged view directory becomes one container item holding its
//!   whole content.
//! - A root-flagged directory met inside another view becomes a link-only
//!   stub, so no content is expanded twice.
//! - Directories deeper than `maxDepth` collapse to a link to their index
//!   document, or disappear when they have none.
//!
//! Sibling directories are generated in parallel.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sidenav_resolver::{
    ConfigResolver, EffectiveDirConfig, ExternalLinkConfig, find_index, is_index_name, read_front_matter,
};

use crate::exclude::Exclusions;
use crate::item::NavItem;
use crate::links::{dir_link, file_link, relative_path};
use crate::sorter::sort_structural;

/// Levels searched for markdown before an empty directory is pruned.
const NESTED_MARKDOWN_DEPTH: usize = 5;

/// Generates navigation views for one language.
pub struct Generator<'a> {
    resolver: &'a ConfigResolver,
    lang: &'a str,
    lang_root: PathBuf,
    dev_mode: bool,
    exclusions: Exclusions,
}

/// State shared by every directory of one view.
pub(crate) struct ViewScope<'s> {
    /// Directory the view starts at.
    pub view_dir: &'s Path,
    /// Group directories removed from the regular tree.
    pub extracted: &'s [PathBuf],
    /// Depth limit replacing each directory's own `maxDepth`.
    pub max_depth: Option<usize>,
}

struct Entry {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

impl<'a> Generator<'a> {
    #[must_use]
    pub fn new(resolver: &'a ConfigResolver, lang: &'a str, exclusions: Exclusions, dev_mode: bool) -> Self {
        Self {
            resolver,
            lang,
            lang_root: resolver.lang_root(lang),
            dev_mode,
            exclusions,
        }
    }

    /// Content directory of the language.
    #[must_use]
    pub fn lang_root(&self) -> &Path {
        &self.lang_root
    }

    #[must_use]
    pub fn lang(&self) -> &str {
        self.lang
    }

    /// View directories: the language root, then every visible root-flagged
    /// directory below it in path order.
    #[must_use]
    pub fn views(&self) -> Vec<PathBuf> {
        let mut views = vec![self.lang_root.clone()];
        self.collect_root_dirs(&self.lang_root, &mut views);
        views
    }

    /// Route prefix of a view directory.
    #[must_use]
    pub fn route_for(&self, view_dir: &Path) -> String {
        let relative = relative_path(&self.lang_root, view_dir).unwrap_or_default();
        dir_link(self.lang, &relative)
    }

    /// Generate the items of the view starting at `view_dir`.
    #[must_use]
    pub fn generate_view(&self, view_dir: &Path) -> Vec<NavItem> {
        let config = self.config(view_dir);
        let groups = self.resolve_groups(view_dir);
        let extracted: Vec<PathBuf> = groups.iter().map(|g| g.dir.clone()).collect();
        let scope = ViewScope {
            view_dir,
            extracted: &extracted,
            max_depth: None,
        };

        let mut items = self.scan(view_dir, &config, 0, &scope);
        items.extend(external_link_items(&config.external_links));
        items.extend(
            groups
                .iter()
                .filter_map(|group| self.group_item(group, &config, view_dir, &extracted)),
        );
        sort_structural(&mut items, &config.item_order);

        if !config.root {
            return items;
        }

        let name = view_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut container = self.directory_shell(view_dir, &name, &config, None);
        container.is_root = true;
        container.items = Some(items);
        vec![container]
    }

    pub(crate) fn config(&self, dir: &Path) -> EffectiveDirConfig {
        self.resolver.effective_config(dir, self.lang, self.dev_mode)
    }

    pub(crate) fn resolver(&self) -> &ConfigResolver {
        self.resolver
    }

    /// Items for the content of `dir`, structurally sorted.
    pub(crate) fn scan(&self, dir: &Path, config: &EffectiveDirConfig, depth: usize, scope: &ViewScope<'_>) -> Vec<NavItem> {
        let (dirs, files): (Vec<Entry>, Vec<Entry>) = self
            .entries(dir)
            .into_iter()
            .filter(|entry| !scope.extracted.iter().any(|g| entry.path.starts_with(g)))
            .partition(|entry| entry.is_dir);

        let mut items: Vec<NavItem> = files
            .iter()
            .filter_map(|entry| self.file_item(entry, config))
            .collect();

        let dir_items: Vec<NavItem> = dirs
            .par_iter()
            .filter_map(|entry| self.dir_item(entry, config, depth, scope))
            .collect();
        items.extend(dir_items);

        sort_structural(&mut items, &config.item_order);
        items
    }

    fn file_item(&self, entry: &Entry, scope_config: &EffectiveDirConfig) -> Option<NavItem> {
        if !entry.name.to_lowercase().ends_with(".md") || is_index_name(&entry.name) {
            return None;
        }

        let fm = read_front_matter(&entry.path);
        if fm.hidden == Some(true) {
            return None;
        }

        let stem = &entry.name[..entry.name.len() - 3];
        let relative = relative_path(&self.lang_root, &entry.path)?;
        let priority = fm.priority.or_else(|| {
            scope_config
                .item_order
                .get(stem)
                .or_else(|| scope_config.item_order.get(&entry.name))
                .copied()
        });

        Some(NavItem {
            text: fm.title.unwrap_or_else(|| stem.to_owned()),
            link: Some(file_link(self.lang, &relative)),
            priority,
            path_key: entry.name.clone(),
            source_path: Some(entry.path.clone()),
            ..NavItem::default()
        })
    }

    fn dir_item(&self, entry: &Entry, parent: &EffectiveDirConfig, depth: usize, scope: &ViewScope<'_>) -> Option<NavItem> {
        let config = self.config(&entry.path);
        if config.hidden {
            return None;
        }

        let mut item = self.directory_shell(&entry.path, &entry.name, &config, Some(parent));

        if config.root && entry.path != scope.view_dir {
            item.link.as_ref()?;
            item.is_root = true;
            item.items = Some(Vec::new());
            return Some(item);
        }

        if depth >= scope.max_depth.unwrap_or(config.max_depth) {
            item.link.as_ref()?;
            return Some(item);
        }

        let children = self.scan(&entry.path, &config, depth + 1, scope);
        if children.is_empty() && item.link.is_none() && !has_nested_markdown(&entry.path, NESTED_MARKDOWN_DEPTH) {
            tracing::debug!(path = %entry.path.display(), "Pruning empty directory");
            return None;
        }

        item.items = Some(children);
        Some(item)
    }

    /// Directory item without children.
    pub(crate) fn directory_shell(&self, dir: &Path, name: &str, config: &EffectiveDirConfig, parent: Option<&EffectiveDirConfig>) -> NavItem {
        let own = self.resolver.local_front_matter(dir);
        let link = if find_index(dir).is_some() {
            relative_path(&self.lang_root, dir).map(|rel| dir_link(self.lang, &rel))
        } else {
            None
        };
        let priority = own
            .priority
            .or_else(|| parent.and_then(|p| p.item_order.get(name).copied()));

        NavItem {
            text: config.title.clone(),
            link,
            collapsed: Some(config.collapsed),
            priority,
            is_directory: true,
            path_key: format!("{name}/"),
            source_path: Some(dir.to_path_buf()),
            ..NavItem::default()
        }
    }

    /// Visible entries of `dir` in name order.
    fn entries(&self, dir: &Path) -> Vec<Entry> {
        let read = match fs::read_dir(dir) {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Could not read directory");
                return Vec::new();
            }
        };

        let mut entries: Vec<Entry> = read
            .filter_map(Result::ok)
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') {
                    return None;
                }
                let path = e.path();
                if self.exclusions.is_excluded(&path) {
                    tracing::debug!(path = %path.display(), "Skipping excluded path");
                    return None;
                }
                Some(Entry {
                    is_dir: path.is_dir(),
                    path,
                    name,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn collect_root_dirs(&self, dir: &Path, views: &mut Vec<PathBuf>) {
        for entry in self.entries(dir).into_iter().filter(|e| e.is_dir) {
            let config = self.config(&entry.path);
            if config.hidden {
                continue;
            }
            if config.root {
                views.push(entry.path.clone());
            }
            self.collect_root_dirs(&entry.path, views);
        }
    }
}

/// Items for a scope's external links.
///
/// Hidden links are skipped. Links without text, or whose target is not an
/// `http(s)` URL, are logged and skipped.
fn external_link_items(links: &[ExternalLinkConfig]) -> Vec<NavItem> {
    links
        .iter()
        .filter(|link| link.hidden != Some(true))
        .filter_map(|link| {
            let (Some(text), Some(target)) = (link.text.as_deref(), link.link.as_deref()) else {
                tracing::warn!(?link, "External link needs both text and link");
                return None;
            };
            if text.is_empty() || !(target.starts_with("http://") || target.starts_with("https://")) {
                tracing::warn!(text, link = target, "External link must be an http(s) URL with text");
                return None;
            }
            Some(NavItem {
                text: text.to_owned(),
                link: Some(target.to_owned()),
                priority: Some(link.priority.unwrap_or(0)),
                path_key: format!("external:{text}"),
                ..NavItem::default()
            })
        })
        .collect()
}

/// Whether any markdown document other than `dir/index.md` exists within
/// `levels` levels below `dir`.
fn has_nested_markdown(dir: &Path, levels: usize) -> bool {
    fn search(dir: &Path, level: usize, levels: usize) -> bool {
        if level > levels {
            return false;
        }
        let Ok(read) = fs::read_dir(dir) else {
            return false;
        };
        read.filter_map(Result::ok).any(|entry| {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.starts_with('.') {
                return false;
            }
            let path = entry.path();
            if path.is_dir() {
                search(&path, level + 1, levels)
            } else {
                name.ends_with(".md") && !(level == 0 && is_index_name(&name))
            }
        })
    }

    search(dir, 0, levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn resolver(tmp: &TempDir) -> ConfigResolver {
        ConfigResolver::new(tmp.path(), tmp.path().join(".sidebarrc.yml"))
    }

    fn texts(items: &[NavItem]) -> Vec<&str> {
        items.iter().map(|i| i.text.as_str()).collect()
    }

    fn find<'i>(items: &'i [NavItem], text: &str) -> &'i NavItem {
        items
            .iter()
            .find(|i| i.text == text)
            .unwrap_or_else(|| panic!("no item {text} in {:?}", texts(items)))
    }

    fn count_text(items: &[NavItem], text: &str) -> usize {
        items
            .iter()
            .map(|i| usize::from(i.text == text) + count_text(i.children(), text))
            .sum()
    }

    // ── views and root splitting ────────────────────────────────────

    #[test]
    fn test_flattened_root_scenario() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/guide/index.md", "---\nroot: true\n---\n");
        write(tmp.path(), "en/guide/concepts/index.md", "# Concepts");
        write(tmp.path(), "en/guide/concepts/a.md", "# A");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);
        let guide = tmp.path().join("en/guide");

        let items = generator.generate_view(&guide);

        assert_eq!(texts(&items), vec!["guide"]);
        assert!(items[0].is_root);
        let concepts = find(items[0].children(), "concepts");
        assert_eq!(concepts.link.as_deref(), Some("/en/guide/concepts/"));
        assert_eq!(texts(concepts.children()), vec!["a"]);
        assert_eq!(concepts.children()[0].link.as_deref(), Some("/en/guide/concepts/a.html"));
    }

    #[test]
    fn test_capitalized_index_links_directory() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/guide/Index.md", "---\ntitle: Guide Home\n---\n");
        write(tmp.path(), "en/guide/a.md", "# A");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let items = generator.generate_view(&tmp.path().join("en"));

        let guide = find(&items, "Guide Home");
        assert_eq!(guide.link.as_deref(), Some("/en/guide/"));
        assert_eq!(texts(guide.children()), vec!["a"]);
    }

    #[test]
    fn test_nested_root_is_stub_in_outer_view() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/intro.md", "# Intro");
        write(tmp.path(), "en/guide/index.md", "---\nroot: true\n---\n");
        write(tmp.path(), "en/guide/a.md", "# A");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let items = generator.generate_view(&tmp.path().join("en"));

        let guide = find(&items, "guide");
        assert!(guide.is_root);
        assert_eq!(guide.items, Some(Vec::new()));
        assert_eq!(guide.link.as_deref(), Some("/en/guide/"));
    }

    #[test]
    fn test_views_and_routes() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/guide/index.md", "---\nroot: true\n---\n");
        write(tmp.path(), "en/guide/api/index.md", "---\nroot: true\n---\n");
        write(tmp.path(), "en/other/a.md", "# A");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let routes: Vec<String> = generator
            .views()
            .iter()
            .map(|v| generator.route_for(v))
            .collect();

        assert_eq!(routes, vec!["/en/", "/en/guide/", "/en/guide/api/"]);
    }

    #[test]
    fn test_unprefixed_language_routes() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "guide/a.md", "# A");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "", Exclusions::default(), false);

        assert_eq!(generator.route_for(tmp.path()), "/");
        let items = generator.generate_view(tmp.path());
        assert_eq!(find(&items, "guide").children()[0].link.as_deref(), Some("/guide/a.html"));
    }

    // ── depth ───────────────────────────────────────────────────────

    #[test]
    fn test_directory_at_max_depth_is_link_only() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/index.md", "---\nmaxDepth: 1\n---\n");
        write(tmp.path(), "en/a/index.md", "# A");
        write(tmp.path(), "en/a/b/index.md", "# B");
        write(tmp.path(), "en/a/b/x.md", "# X");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let items = generator.generate_view(&tmp.path().join("en"));

        let a = find(&items, "a");
        assert!(a.items.is_some());
        let b = find(a.children(), "b");
        assert_eq!(b.items, None);
        assert_eq!(b.link.as_deref(), Some("/en/a/b/"));
    }

    #[test]
    fn test_depth_limited_directory_without_index_is_dropped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/index.md", "---\nmaxDepth: 1\n---\n");
        write(tmp.path(), "en/deep/sub/x.md", "# X");
        write(tmp.path(), "en/empty/notes.txt", "not markdown");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let items = generator.generate_view(&tmp.path().join("en"));

        let deep = find(&items, "deep");
        assert_eq!(deep.items, Some(Vec::new()));
        assert!(items.iter().all(|i| i.text != "empty"));
    }

    // ── files ───────────────────────────────────────────────────────

    #[test]
    fn test_file_front_matter_and_item_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/index.md", "---\nitemOrder: [zeta, alpha]\n---\n");
        write(tmp.path(), "en/alpha.md", "---\ntitle: Alpha Page\n---\n");
        write(tmp.path(), "en/zeta.md", "# Z");
        write(tmp.path(), "en/secret.md", "---\nhidden: true\n---\n");
        write(tmp.path(), "en/notes.txt", "ignored");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let items = generator.generate_view(&tmp.path().join("en"));

        assert_eq!(texts(&items), vec!["zeta", "Alpha Page"]);
        assert_eq!(items[0].priority, Some(0));
        assert_eq!(items[1].priority, Some(1));
        assert_eq!(items[1].path_key, "alpha.md");
    }

    #[test]
    fn test_hidden_directory_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/drafts/index.md", "---\nhidden: true\n---\n");
        write(tmp.path(), "en/drafts/a.md", "# A");
        write(tmp.path(), "en/b.md", "# B");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let items = generator.generate_view(&tmp.path().join("en"));

        assert_eq!(texts(&items), vec!["b"]);
    }

    // ── external links and exclusion ────────────────────────────────

    #[test]
    fn test_external_links_validated() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "en/index.md",
            "---\nexternalLinks:\n  - text: GitHub\n    link: https://github.com\n    priority: -1\n  - text: Bad\n    link: ftp://example.com\n  - text: Hidden\n    link: https://example.com\n    hidden: true\n  - link: https://example.com\n---\n",
        );
        write(tmp.path(), "en/a.md", "# A");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let items = generator.generate_view(&tmp.path().join("en"));

        assert_eq!(texts(&items), vec!["GitHub", "a"]);
        assert_eq!(items[0].path_key, "external:GitHub");
        assert_eq!(items[0].link.as_deref(), Some("https://github.com"));
    }

    #[test]
    fn test_imported_books_are_excluded() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/book/SUMMARY.md", "# Summary");
        write(tmp.path(), "en/book/page.md", "# Page");
        write(tmp.path(), "en/vendor/page.md", "# Page");
        write(tmp.path(), "en/a.md", "# A");
        let resolver = resolver(&tmp);
        let lang_root = tmp.path().join("en");
        let exclusions = Exclusions::new(&lang_root, &["vendor".to_owned()], true);
        let generator = Generator::new(&resolver, "en", exclusions, false);

        let items = generator.generate_view(&lang_root);

        assert_eq!(texts(&items), vec!["a"]);
    }

    // ── groups ──────────────────────────────────────────────────────

    #[test]
    fn test_group_extracted_from_nested_position() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "en/index.md",
            "---\ngroups:\n  - title: Advanced Topics\n    path: guide/advanced\n---\n",
        );
        write(tmp.path(), "en/guide/intro.md", "# Intro");
        write(tmp.path(), "en/guide/advanced/x.md", "# X");
        write(tmp.path(), "en/advanced-topics/index.md", "# Landing");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let items = generator.generate_view(&tmp.path().join("en"));

        let guide = find(&items, "guide");
        assert_eq!(texts(guide.children()), vec!["intro"]);
        let group = find(&items, "Advanced Topics");
        assert_eq!(group.path_key, "guide/advanced");
        assert_eq!(group.collapsed, Some(true));
        assert_eq!(group.link.as_deref(), Some("/en/advanced-topics/"));
        assert_eq!(texts(group.children()), vec!["x"]);
        assert_eq!(count_text(&items, "x"), 1);
    }

    #[test]
    fn test_empty_or_missing_group_is_dropped() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "en/index.md",
            "---\ngroups:\n  - title: Missing\n    path: nowhere\n  - title: Empty\n    path: empty\n---\n",
        );
        fs::create_dir_all(tmp.path().join("en/empty")).unwrap();
        write(tmp.path(), "en/a.md", "# A");
        let resolver = resolver(&tmp);
        let generator = Generator::new(&resolver, "en", Exclusions::default(), false);

        let items = generator.generate_view(&tmp.path().join("en"));

        assert_eq!(texts(&items), vec!["a"]);
    }

    #[test]
    fn test_has_nested_markdown() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a/index.md", "# A");
        write(tmp.path(), "b/c/d.md", "# D");

        assert!(!has_nested_markdown(&tmp.path().join("a"), 5));
        assert!(has_nested_markdown(&tmp.path().join("b"), 5));
        assert!(!has_nested_markdown(&tmp.path().join("b"), 0));
    }
}

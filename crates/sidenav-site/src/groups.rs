//! Named groups.
//!
//! A view directory's front matter may declare groups pointing at
//! sub-directories. Each group is generated on its own, shown as a top-level
//! item of the view, and removed from its regular nested position.

use std::path::{Component, Path, PathBuf};

use sidenav_resolver::{EffectiveDirConfig, ItemOrder, find_index};

use crate::generator::{Generator, ViewScope};
use crate::item::NavItem;
use crate::links::{dir_link, relative_path, slugify};
use crate::sorter::sort_structural;

/// A declared group whose directory exists.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedGroup {
    pub title: String,
    /// Path as declared; the group item's path key.
    pub key: String,
    pub dir: PathBuf,
    pub priority: Option<i64>,
    pub max_depth: Option<i64>,
}

impl Generator<'_> {
    /// Groups declared in the front matter of `view_dir/index.md`.
    ///
    /// Paths are relative to `view_dir`. Entries without a title or path, or
    /// whose path is not a directory, are logged and skipped.
    pub(crate) fn resolve_groups(&self, view_dir: &Path) -> Vec<ResolvedGroup> {
        let own = self.resolver().local_front_matter(view_dir);
        let Some(groups) = own.groups.as_ref() else {
            return Vec::new();
        };

        groups
            .iter()
            .filter_map(|group| {
                let (Some(title), Some(path)) = (group.title.as_deref(), group.path.as_deref()) else {
                    tracing::warn!(?group, dir = %view_dir.display(), "Group needs both title and path");
                    return None;
                };
                let dir = normalize(&view_dir.join(path));
                if !dir.is_dir() {
                    tracing::warn!(group = title, path = %dir.display(), "Group path is not a directory");
                    return None;
                }
                Some(ResolvedGroup {
                    title: title.to_owned(),
                    key: path.to_owned(),
                    dir,
                    priority: group.priority,
                    max_depth: group.max_depth,
                })
            })
            .collect()
    }

    /// Item for one group, or `None` when the group is hidden or empty.
    pub(crate) fn group_item(&self, group: &ResolvedGroup, parent: &EffectiveDirConfig, view_dir: &Path, extracted: &[PathBuf]) -> Option<NavItem> {
        let config = self.group_config(group, parent);
        if config.hidden {
            return None;
        }

        let others: Vec<PathBuf> = extracted
            .iter()
            .filter(|dir| **dir != group.dir)
            .cloned()
            .collect();
        let scope = ViewScope {
            view_dir: &group.dir,
            extracted: &others,
            max_depth: Some(config.max_depth),
        };

        let mut children = self.scan(&group.dir, &config, 0, &scope);
        if children.is_empty() {
            tracing::debug!(group = %group.title, "Dropping empty group");
            return None;
        }
        sort_structural(&mut children, &config.item_order);

        Some(NavItem {
            text: config.title,
            link: self.group_link(group, view_dir),
            items: Some(children),
            collapsed: Some(true),
            priority: Some(config.priority),
            is_directory: true,
            path_key: group.key.clone(),
            source_path: Some(group.dir.clone()),
            ..NavItem::default()
        })
    }

    /// Configuration of a group: the declaring directory's, stripped of
    /// groups, links and ordering, with the group directory's own front
    /// matter and the group declaration on top.
    fn group_config(&self, group: &ResolvedGroup, parent: &EffectiveDirConfig) -> EffectiveDirConfig {
        let fm = self.resolver().local_front_matter(&group.dir);
        let max_depth = group
            .max_depth
            .or(fm.max_depth)
            .map_or(parent.max_depth, |d| usize::try_from(d.max(0)).unwrap_or(usize::MAX));

        EffectiveDirConfig {
            root: false,
            title: group.title.clone(),
            hidden: fm.hidden.unwrap_or(parent.hidden),
            priority: group.priority.or(fm.priority).unwrap_or(0),
            max_depth,
            collapsed: fm.collapsed.unwrap_or(parent.collapsed),
            item_order: fm
                .item_order
                .as_ref()
                .map(ItemOrder::to_priorities)
                .unwrap_or_default(),
            groups: Vec::new(),
            external_links: Vec::new(),
            path: group.dir.clone(),
            ..parent.clone()
        }
    }

    /// The group directory's index, else `slug(title)/index.md` beside the
    /// declaring directory's content.
    fn group_link(&self, group: &ResolvedGroup, view_dir: &Path) -> Option<String> {
        let landing = [group.dir.clone(), view_dir.join(slugify(&group.title))]
            .into_iter()
            .find(|dir| find_index(dir).is_some())?;
        let relative = relative_path(self.lang_root(), &landing)?;
        Some(dir_link(self.lang(), &relative))
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

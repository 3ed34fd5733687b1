//! Navigation items and route maps.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Priority of items without any explicit ordering.
///
/// Largest integer that survives a round trip through a JavaScript number.
pub const UNORDERED_PRIORITY: i64 = 9_007_199_254_740_991;

/// Route prefix → ordered navigation items of that view.
pub type RouteMap = BTreeMap<String, Vec<NavItem>>;

/// One entry of the generated navigation tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    /// Display text.
    pub text: String,
    /// Link target, absent for plain containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Children. `None` for files and link-only directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<NavItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Working priority used by the sorters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_directory: bool,
    /// Set on root-flagged directories: view containers and stubs.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_root: bool,
    /// Key of this item inside its parent's override scope.
    pub path_key: String,
    /// Content path the item was generated from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl NavItem {
    /// Children, or an empty slice.
    #[must_use]
    pub fn children(&self) -> &[NavItem] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Whether the synchronizer and reapply pass descend into this item.
    ///
    /// Root stubs and link-only directories have their own views or no
    /// expanded content, so their scopes are left alone.
    #[must_use]
    pub fn has_expanded_children(&self) -> bool {
        self.is_directory && !self.is_root && !self.children().is_empty()
    }

    /// Copy of `items` without hidden entries, at every depth.
    #[must_use]
    pub fn without_hidden(items: &[NavItem]) -> Vec<NavItem> {
        items
            .iter()
            .filter(|item| !item.hidden)
            .map(|item| NavItem {
                items: item.items.as_deref().map(Self::without_hidden),
                ..item.clone()
            })
            .collect()
    }
}

//! Global defaults file (`.sidebarrc.yml`).

use std::path::Path;

use serde::Deserialize;

use crate::frontmatter::{FrontMatter, ItemOrder};

/// Site-wide defaults applied beneath every directory's own front matter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalDefaults {
    pub max_depth: Option<i64>,
    pub collapsed: Option<bool>,
    pub item_order: Option<ItemOrder>,
    pub hidden: Option<bool>,
}

impl GlobalDefaults {
    /// The defaults expressed as the lowest-precedence configuration layer.
    #[must_use]
    pub fn as_front_matter(&self) -> FrontMatter {
        FrontMatter {
            max_depth: self.max_depth,
            collapsed: self.collapsed,
            item_order: self.item_order.clone(),
            hidden: self.hidden,
            ..Default::default()
        }
    }
}

/// Parsed global configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub defaults: GlobalDefaults,
}

/// Load the global configuration from `path`.
///
/// A missing file is normal and yields the empty configuration. Unreadable
/// or malformed files are logged and also yield the empty configuration.
#[must_use]
pub fn load_global_config(path: &Path) -> GlobalConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No global sidebar config");
            return GlobalConfig::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read global sidebar config");
            return GlobalConfig::default();
        }
    };

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return GlobalConfig::default();
    }

    serde_yaml::from_str(trimmed).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed global sidebar config");
        GlobalConfig::default()
    })
}

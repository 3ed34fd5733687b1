//! Layered directory configuration for sidenav.
//!
//! Combines three sources into one [`EffectiveDirConfig`] per directory:
//!
//! - the global defaults file at the content root (`.sidebarrc.yml`)
//! - the `index.md` front matter of every ancestor directory
//! - the directory's own `index.md` front matter
//!
//! Missing or malformed sources never fail resolution; they contribute
//! nothing and are logged.

mod frontmatter;
mod global;
mod inheritance;
mod resolver;

pub use frontmatter::{
    ExternalLinkConfig, FrontMatter, FrontMatterError, GroupConfig, ItemOrder, parse_front_matter,
    read_front_matter, split_front_matter,
};
pub use global::{GlobalConfig, GlobalDefaults, load_global_config};
pub use resolver::{
    ConfigResolver, DEFAULT_MAX_DEPTH, EffectiveDirConfig, INDEX_FILE, find_index, is_index_name,
};

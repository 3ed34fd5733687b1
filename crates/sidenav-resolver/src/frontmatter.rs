//! Front matter parsing for markdown documents.
//!
//! A document's front matter is the YAML block between a leading `---` line
//! and the next `---` line. Directories are configured through the front
//! matter of their `index.md`, files through their own.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Error returned by strict front matter parsing.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// The YAML block is malformed.
    #[error("Front matter parse error: {0}")]
    Parse(String),
}

/// Ordering hints for the children of a directory.
///
/// Either a list (position is the priority) or a map from child name to
/// priority. Map values may be numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ItemOrder {
    /// `itemOrder: [intro, guide, api]`
    List(Vec<Value>),
    /// `itemOrder: { api: 10, intro: 1 }`
    Map(BTreeMap<String, Value>),
}

impl ItemOrder {
    /// Normalize to a name → priority map.
    ///
    /// List entries that are not strings and map values that are not numeric
    /// are dropped.
    #[must_use]
    pub fn to_priorities(&self) -> BTreeMap<String, i64> {
        match self {
            Self::List(names) => names
                .iter()
                .enumerate()
                .filter_map(|(index, name)| {
                    let name = name.as_str()?;
                    Some((name.to_owned(), i64::try_from(index).ok()?))
                })
                .collect(),
            Self::Map(entries) => entries
                .iter()
                .filter_map(|(name, value)| Some((name.clone(), number_from_value(value)?)))
                .collect(),
        }
    }
}

/// A named group declared by a directory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupConfig {
    /// Group title shown in navigation.
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    /// Path of the grouped directory, relative to the declaring directory.
    #[serde(deserialize_with = "lenient_string")]
    pub path: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub priority: Option<i64>,
    #[serde(deserialize_with = "lenient_number")]
    pub max_depth: Option<i64>,
}

/// A static link to an external site.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExternalLinkConfig {
    #[serde(deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub link: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub priority: Option<i64>,
    pub hidden: Option<bool>,
}

/// Partial configuration parsed from one front matter block.
///
/// Every field is optional; absent fields leave lower-precedence values in
/// place when layered with [`FrontMatter::overlay`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrontMatter {
    pub root: Option<bool>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    pub hidden: Option<bool>,
    #[serde(deserialize_with = "lenient_number")]
    pub priority: Option<i64>,
    #[serde(deserialize_with = "lenient_number")]
    pub max_depth: Option<i64>,
    pub collapsed: Option<bool>,
    pub item_order: Option<ItemOrder>,
    pub groups: Option<Vec<GroupConfig>>,
    pub external_links: Option<Vec<ExternalLinkConfig>>,
}

impl FrontMatter {
    /// Layer `other` on top of `self`, field by field. Last write wins.
    pub fn overlay(&mut self, other: &Self) {
        fn set<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }

        set(&mut self.root, other.root.as_ref());
        set(&mut self.title, other.title.as_ref());
        set(&mut self.hidden, other.hidden.as_ref());
        set(&mut self.priority, other.priority.as_ref());
        set(&mut self.max_depth, other.max_depth.as_ref());
        set(&mut self.collapsed, other.collapsed.as_ref());
        set(&mut self.item_order, other.item_order.as_ref());
        set(&mut self.groups, other.groups.as_ref());
        set(&mut self.external_links, other.external_links.as_ref());
    }

    /// Copy of this front matter with the `root` flag removed.
    #[must_use]
    pub fn without_root(&self) -> Self {
        Self {
            root: None,
            ..self.clone()
        }
    }
}

/// Extract the raw YAML block from a markdown document.
///
/// Returns `None` when the document has no front matter.
#[must_use]
pub fn split_front_matter(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Parse the front matter of a markdown document.
///
/// Documents without front matter produce an empty [`FrontMatter`].
///
/// # Errors
///
/// Returns an error if the YAML block is malformed.
pub fn parse_front_matter(content: &str) -> Result<FrontMatter, FrontMatterError> {
    let Some(block) = split_front_matter(content) else {
        return Ok(FrontMatter::default());
    };

    let trimmed = block.trim();
    if trimmed.is_empty() {
        return Ok(FrontMatter::default());
    }

    serde_yaml::from_str(trimmed).map_err(|e| FrontMatterError::Parse(format!("Invalid YAML: {e}")))
}

/// Read and parse the front matter of the document at `path`.
///
/// Missing files, unreadable files and malformed YAML all resolve to an
/// empty [`FrontMatter`].
#[must_use]
pub fn read_front_matter(path: &Path) -> FrontMatter {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return FrontMatter::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read document");
            return FrontMatter::default();
        }
    };

    parse_front_matter(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed front matter");
        FrontMatter::default()
    })
}

/// Interpret a YAML value as an integer.
///
/// Floats are truncated. Strings are accepted when they hold an integer.
pub(crate) fn number_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            #[allow(clippy::cast_possible_truncation)]
            n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

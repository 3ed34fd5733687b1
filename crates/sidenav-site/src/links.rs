//! Link and slug generation.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w-]+").unwrap());
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"--+").unwrap());
static SLASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/{2,}").unwrap());

/// Path of `path` relative to `base`, joined with `/`.
///
/// Returns `None` when `path` is not below `base`.
#[must_use]
pub fn relative_path(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    Some(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// Link of a markdown file: `/{lang}/{rel}.html`.
#[must_use]
pub fn file_link(lang: &str, relative: &str) -> String {
    let stem = relative.strip_suffix(".md").unwrap_or(relative);
    collapse_slashes(&format!("/{lang}/{stem}.html"))
}

/// Link of a directory's index document: `/{lang}/{rel}/`.
#[must_use]
pub fn dir_link(lang: &str, relative: &str) -> String {
    collapse_slashes(&format!("/{lang}/{relative}/"))
}

/// URL-safe slug of a title.
///
/// Lowercases, turns whitespace into `-`, drops everything but word
/// characters and `-`, then collapses and trims dashes.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let dashed = WHITESPACE.replace_all(lower.trim(), "-");
    let cleaned = NON_SLUG.replace_all(&dashed, "");
    let collapsed = DASHES.replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_owned()
}

fn collapse_slashes(link: &str) -> String {
    SLASHES.replace_all(link, "/").into_owned()
}

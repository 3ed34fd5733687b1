//! `sidenav.toml` loading.
//!
//! A config file is looked up from the working directory upwards unless a
//! path is given. Relative paths in the file are anchored at the file's
//! directory; without any file, defaults are anchored at the working
//! directory. Command-line values from [`CliSettings`] win over the file.
//!
//! Path values may reference environment variables as `${VAR}` or
//! `${VAR:-fallback}`. This applies to `docs.source_dir`, `overrides.dir`
//! and `cache.dir`.
//!
//! ```toml
//! [docs]
//! source_dir = "docs"
//! languages = ["en", "zh"]
//!
//! [overrides]
//! dir = ".vitepress/config/sidebar"
//!
//! [cache]
//! dir = ".vitepress/cache/sidebar"
//! ttl_secs = 300
//!
//! [generator]
//! exclude = ["vendor/book"]
//! ```

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const FILE_NAME: &str = "sidenav.toml";
const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_DOCS_DIR: &str = "docs";
const DEFAULT_OVERRIDES_DIR: &str = ".vitepress/config/sidebar";
const DEFAULT_CACHE_DIR: &str = ".vitepress/cache/sidebar";

/// Values given on the command line.
///
/// `None` keeps whatever the config file says.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub source_dir: Option<PathBuf>,
    /// Replaces the configured language list when non-empty.
    pub languages: Option<Vec<String>>,
    pub dev_mode: Option<bool>,
    pub cache_enabled: Option<bool>,
}

/// Fully resolved configuration with absolute paths.
#[derive(Debug)]
pub struct Config {
    pub docs_resolved: DocsConfig,
    pub overrides_resolved: OverridesConfig,
    pub cache_resolved: CacheConfig,
    pub generator: GeneratorConfig,
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
}

/// Content location and languages.
#[derive(Debug)]
pub struct DocsConfig {
    /// Content root containing one directory per language.
    pub source_dir: PathBuf,
    /// Languages in declaration order.
    ///
    /// The empty string denotes an unprefixed single-language site.
    pub languages: Vec<String>,
    /// Include drafts and other local-only content.
    pub dev_mode: bool,
}

/// Root of the sidecar tree holding overrides, metadata and archives.
#[derive(Debug)]
pub struct OverridesConfig {
    pub dir: PathBuf,
}

/// Snapshot cache settings.
#[derive(Debug)]
pub struct CacheConfig {
    /// Whether snapshots are written to disk.
    pub enabled: bool,
    pub dir: PathBuf,
    /// Lifetime of both the memory and the file tier.
    pub ttl: Duration,
}

/// Structural generator settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Paths relative to each language root that are never listed.
    pub exclude: Vec<String>,
    /// Skip directories holding a `SUMMARY.md` (imported books).
    pub detect_imported: bool,
    /// Global defaults file, relative to the docs root.
    pub global_config: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            detect_imported: true,
            global_config: ".sidebarrc.yml".to_owned(),
        }
    }
}

/// Configuration loading failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid sidenav.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// A referenced environment variable is not set.
    #[error("Cannot expand {field}: {message}")]
    EnvVar { field: String, message: String },
}

/// `sidenav.toml` as written, before path resolution.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    docs: DocsSection,
    overrides: OverridesSection,
    cache: CacheSection,
    generator: GeneratorConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocsSection {
    source_dir: Option<String>,
    languages: Vec<String>,
    dev_mode: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OverridesSection {
    dir: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CacheSection {
    enabled: bool,
    dir: Option<String>,
    ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let mut file: Self = toml::from_str(&std::fs::read_to_string(path)?)?;
        file.docs.source_dir = expand_opt(file.docs.source_dir, "docs.source_dir")?;
        file.overrides.dir = expand_opt(file.overrides.dir, "overrides.dir")?;
        file.cache.dir = expand_opt(file.cache.dir, "cache.dir")?;
        Ok(file)
    }

    /// Anchor every relative path at `base`.
    fn resolve(self, base: &Path) -> Config {
        let anchored = |path: Option<String>, default: &str| {
            base.join(path.as_deref().unwrap_or(default))
        };
        Config {
            docs_resolved: DocsConfig {
                source_dir: anchored(self.docs.source_dir, DEFAULT_DOCS_DIR),
                languages: self.docs.languages,
                dev_mode: self.docs.dev_mode,
            },
            overrides_resolved: OverridesConfig {
                dir: anchored(self.overrides.dir, DEFAULT_OVERRIDES_DIR),
            },
            cache_resolved: CacheConfig {
                enabled: self.cache.enabled,
                dir: anchored(self.cache.dir, DEFAULT_CACHE_DIR),
                ttl: Duration::from_secs(self.cache.ttl_secs),
            },
            generator: self.generator,
            config_path: None,
        }
    }
}

fn expand_opt(value: Option<String>, field: &str) -> Result<Option<String>, ConfigError> {
    value.map(|v| expand::expand_env(&v, field)).transpose()
}

/// Nearest `sidenav.toml` in the working directory or one of its parents.
fn locate() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(FILE_NAME))
        .find(|candidate| candidate.is_file())
}

impl Config {
    /// Load, override and validate the configuration.
    ///
    /// Reads `config_path` when given (it must exist), otherwise the nearest
    /// discovered `sidenav.toml`, otherwise starts from defaults. Validation
    /// runs after `cli` is applied, so languages given only on the command
    /// line are enough.
    pub fn load(
        config_path: Option<&Path>,
        cli: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => locate(),
        };

        let mut config = match path {
            Some(path) => {
                let base = path.parent().unwrap_or(Path::new(".")).to_path_buf();
                let mut config = ConfigFile::read(&path)?.resolve(&base);
                config.config_path = Some(path);
                config
            }
            None => Self::defaults_at(&std::env::current_dir().unwrap_or_default()),
        };

        if let Some(cli) = cli {
            config.overlay(cli);
        }
        config.validate()?;
        Ok(config)
    }

    /// Default configuration with paths anchored at `base`.
    #[must_use]
    pub fn defaults_at(base: &Path) -> Self {
        ConfigFile::default().resolve(base)
    }

    /// Path of the global defaults file.
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.docs_resolved
            .source_dir
            .join(&self.generator.global_config)
    }

    fn overlay(&mut self, cli: &CliSettings) {
        if let Some(source_dir) = &cli.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(languages) = &cli.languages
            && !languages.is_empty()
        {
            self.docs_resolved.languages.clone_from(languages);
        }
        if let Some(dev_mode) = cli.dev_mode {
            self.docs_resolved.dev_mode = dev_mode;
        }
        if let Some(enabled) = cli.cache_enabled {
            self.cache_resolved.enabled = enabled;
        }
    }

    /// Check languages, TTL and the global defaults file name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Validation(msg)) };

        let languages = &self.docs_resolved.languages;
        if languages.is_empty() {
            return invalid("docs.languages must list at least one language".to_owned());
        }
        let mut seen = HashSet::new();
        for lang in languages {
            if lang.contains(['/', '\\']) || lang == "." || lang == ".." {
                return invalid(format!(
                    "docs.languages entry {lang:?} must be a single directory name"
                ));
            }
            if !seen.insert(lang.as_str()) {
                return invalid(format!("docs.languages contains {lang:?} more than once"));
            }
        }

        if self.cache_resolved.ttl.is_zero() {
            return invalid("cache.ttl_secs must be greater than 0".to_owned());
        }
        if self.generator.global_config.is_empty() {
            return invalid("generator.global_config cannot be empty".to_owned());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn with_languages(languages: &[&str]) -> Config {
        let mut config = Config::defaults_at(Path::new("/site"));
        config.docs_resolved.languages = languages.iter().map(|l| (*l).to_owned()).collect();
        config
    }

    fn write_config(tmp: &TempDir, content: &str) -> PathBuf {
        let path = tmp.path().join(FILE_NAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    // ── defaults and resolution ─────────────────────────────────────

    #[test]
    fn test_defaults() {
        let config = Config::defaults_at(Path::new("/site"));

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/site/docs"));
        assert_eq!(
            config.overrides_resolved.dir,
            PathBuf::from("/site/.vitepress/config/sidebar")
        );
        assert_eq!(
            config.cache_resolved.dir,
            PathBuf::from("/site/.vitepress/cache/sidebar")
        );
        assert!(config.cache_resolved.enabled);
        assert_eq!(config.cache_resolved.ttl, Duration::from_secs(300));
        assert!(config.generator.detect_imported);
        assert_eq!(
            config.global_config_path(),
            PathBuf::from("/site/docs/.sidebarrc.yml")
        );
    }

    #[test]
    fn test_resolve_anchors_paths() {
        let file: ConfigFile = toml::from_str(
            r#"
[docs]
source_dir = "content"
languages = ["en", "zh"]
dev_mode = true

[overrides]
dir = "meta/sidebar"

[cache]
enabled = false
dir = "/var/cache/sidenav"
ttl_secs = 60

[generator]
exclude = ["imported/book"]
detect_imported = false
"#,
        )
        .unwrap();

        let config = file.resolve(Path::new("/project"));

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/project/content"));
        assert_eq!(config.docs_resolved.languages, vec!["en", "zh"]);
        assert!(config.docs_resolved.dev_mode);
        assert_eq!(config.overrides_resolved.dir, PathBuf::from("/project/meta/sidebar"));
        assert!(!config.cache_resolved.enabled);
        assert_eq!(config.cache_resolved.dir, PathBuf::from("/var/cache/sidenav"));
        assert_eq!(config.cache_resolved.ttl, Duration::from_secs(60));
        assert_eq!(config.generator.exclude, vec!["imported/book"]);
        assert!(!config.generator.detect_imported);
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(toml::from_str::<ConfigFile>("[server]\nport = 1").is_err());
    }

    // ── validation ──────────────────────────────────────────────────

    #[test]
    fn test_validate_requires_languages() {
        let err = with_languages(&[]).validate().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
        assert!(err.to_string().contains("docs.languages"));
    }

    #[test]
    fn test_validate_languages() {
        assert!(with_languages(&[""]).validate().is_ok());
        assert!(with_languages(&["en", "ru"]).validate().is_ok());
        assert!(with_languages(&["en/us"]).validate().is_err());
        assert!(with_languages(&[".."]).validate().is_err());

        let err = with_languages(&["en", "en"]).validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = with_languages(&["en"]);
        config.cache_resolved.ttl = Duration::ZERO;

        assert!(config.validate().unwrap_err().to_string().contains("ttl_secs"));
    }

    // ── command-line overlay ────────────────────────────────────────

    #[test]
    fn test_overlay_replaces_given_values() {
        let mut config = with_languages(&["en"]);

        config.overlay(&CliSettings {
            source_dir: Some(PathBuf::from("/custom/docs")),
            languages: Some(vec!["ja".to_owned()]),
            dev_mode: Some(true),
            cache_enabled: Some(false),
        });

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/custom/docs"));
        assert_eq!(config.docs_resolved.languages, vec!["ja"]);
        assert!(config.docs_resolved.dev_mode);
        assert!(!config.cache_resolved.enabled);
        assert_eq!(
            config.overrides_resolved.dir,
            PathBuf::from("/site/.vitepress/config/sidebar")
        );
    }

    #[test]
    fn test_overlay_ignores_empty_languages() {
        let mut config = with_languages(&["en"]);

        config.overlay(&CliSettings {
            languages: Some(Vec::new()),
            ..Default::default()
        });

        assert_eq!(config.docs_resolved.languages, vec!["en"]);
    }

    // ── load ────────────────────────────────────────────────────────

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/sidenav.toml")), None);

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_anchors_at_config_dir() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[docs]\nlanguages = [\"en\"]\n");

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.docs_resolved.source_dir, tmp.path().join("docs"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[docs\nlanguages = 3");

        assert!(matches!(Config::load(Some(&path), None), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_with_cli_languages_only() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "");
        let cli = CliSettings {
            languages: Some(vec!["en".to_owned()]),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&cli)).unwrap();

        assert_eq!(config.docs_resolved.languages, vec!["en"]);
    }

    #[test]
    fn test_load_expands_env_fallback() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            "[docs]\nsource_dir = \"${SIDENAV_TEST_SURELY_UNSET:-content}\"\nlanguages = [\"\"]\n",
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.docs_resolved.source_dir, tmp.path().join("content"));
    }
}

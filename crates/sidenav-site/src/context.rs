//! Settings shared by every navigation build.

use std::path::PathBuf;
use std::time::Duration;

use sidenav_config::Config;
use sidenav_resolver::ConfigResolver;

/// Resolved settings for the navigation pipeline.
#[derive(Debug, Clone)]
pub struct NavContext {
    /// Content root containing one directory per language.
    pub docs_root: PathBuf,
    /// Configured languages. The empty string is an unprefixed site.
    pub languages: Vec<String>,
    /// Root of the override sidecar tree.
    pub overrides_dir: PathBuf,
    /// Snapshot directory, `None` when the file tier is disabled.
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: Duration,
    /// Paths below each language root that are never listed.
    pub exclude: Vec<String>,
    pub detect_imported: bool,
    /// Global defaults file.
    pub global_config: PathBuf,
    pub dev_mode: bool,
}

impl NavContext {
    /// Content directory of `lang`; the docs root itself for an unprefixed site.
    #[must_use]
    pub fn lang_root(&self, lang: &str) -> PathBuf {
        if lang.is_empty() {
            self.docs_root.clone()
        } else {
            self.docs_root.join(lang)
        }
    }

    /// A resolver with empty caches, for one generation pass.
    #[must_use]
    pub fn resolver(&self) -> ConfigResolver {
        ConfigResolver::new(&self.docs_root, &self.global_config)
    }
}

impl From<&Config> for NavContext {
    fn from(config: &Config) -> Self {
        Self {
            docs_root: config.docs_resolved.source_dir.clone(),
            languages: config.docs_resolved.languages.clone(),
            overrides_dir: config.overrides_resolved.dir.clone(),
            cache_dir: config
                .cache_resolved
                .enabled
                .then(|| config.cache_resolved.dir.clone()),
            cache_ttl: config.cache_resolved.ttl,
            exclude: config.generator.exclude.clone(),
            detect_imported: config.generator.detect_imported,
            global_config: config.global_config_path(),
            dev_mode: config.docs_resolved.dev_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sidenav_config::CliSettings;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sidenav.toml");
        fs::write(
            &path,
            "[docs]\nsource_dir = \"content\"\nlanguages = [\"en\", \"ru\"]\n\n[cache]\nenabled = false\n\n[generator]\nexclude = [\"vendor\"]\n",
        )
        .unwrap();
        let settings = CliSettings {
            dev_mode: Some(true),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        let context = NavContext::from(&config);

        assert_eq!(context.docs_root, tmp.path().join("content"));
        assert_eq!(context.languages, vec!["en".to_owned(), "ru".to_owned()]);
        assert_eq!(context.cache_dir, None);
        assert_eq!(context.exclude, vec!["vendor".to_owned()]);
        assert_eq!(context.global_config, tmp.path().join("content/.sidebarrc.yml"));
        assert!(context.dev_mode);
        assert_eq!(context.lang_root("ru"), tmp.path().join("content/ru"));
        assert_eq!(context.lang_root(""), tmp.path().join("content"));
    }
}

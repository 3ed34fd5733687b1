//! CLI command implementations.

pub(crate) mod clean;
pub(crate) mod generate;
pub(crate) mod languages;
pub(crate) mod watch;

use std::path::PathBuf;

use clap::Args;
use sidenav_config::{CliSettings, Config};
use sidenav_site::{NavContext, Navigator};

use crate::error::CliError;

pub(crate) use generate::GenerateArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct ContextArgs {
    /// Path to configuration file (default: auto-discover sidenav.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long, global = true)]
    source_dir: Option<PathBuf>,

    /// Language to process; repeat for several (overrides config).
    #[arg(short, long = "language", global = true)]
    languages: Vec<String>,

    /// Generate for local development.
    #[arg(long, global = true)]
    dev: bool,

    /// Disable the snapshot cache.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl ContextArgs {
    /// Load configuration with the command-line overrides applied.
    pub(crate) fn load(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            languages: (!self.languages.is_empty()).then(|| self.languages.clone()),
            dev_mode: self.dev.then_some(true),
            cache_enabled: self.no_cache.then_some(false),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Load configuration and create a navigator for it.
    pub(crate) fn navigator(&self) -> Result<(Config, Navigator), CliError> {
        let config = self.load()?;
        let navigator = Navigator::new(NavContext::from(&config))?;
        Ok((config, navigator))
    }

    /// Languages selected on the command line.
    pub(crate) fn selected_languages(&self) -> &[String] {
        &self.languages
    }
}

/// Display name of a language code.
pub(crate) fn language_label(lang: &str) -> &str {
    if lang.is_empty() { "(root)" } else { lang }
}

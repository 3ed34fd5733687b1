//! `sidenav watch` command implementation.
//!
//! Builds every language once, then watches the docs and override roots.
//! Relevant changes invalidate the affected language and trigger a
//! background rebuild; triggers arriving while that language is building
//! are dropped.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use glob::{MatchOptions, Pattern};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use sidenav_site::{NavContext, Navigator};
use tokio::sync::mpsc;

use super::{ContextArgs, language_label};
use crate::error::CliError;
use crate::output::Output;

/// Quiet period collecting events into one rebuild.
const DEBOUNCE: Duration = Duration::from_millis(150);

static MARKDOWN: LazyLock<Pattern> = LazyLock::new(|| Pattern::new("**/*.md").unwrap());
static INDEX: LazyLock<Pattern> = LazyLock::new(|| Pattern::new("**/index.md").unwrap());
static SIDECAR: LazyLock<Pattern> = LazyLock::new(|| Pattern::new("**/*.json").unwrap());

/// Execute the watch command until interrupted.
pub(crate) async fn execute(context: &ContextArgs) -> Result<(), CliError> {
    let output = Output::new();
    let config = context.load()?;
    let navigator = Arc::new(Navigator::new(NavContext::from(&config))?);

    navigator.prebuild(navigator.languages()).await?;
    output.success("Initial navigation built");

    let docs_root = config.docs_resolved.source_dir.clone();
    let overrides_root = config.overrides_resolved.dir.clone();
    fs::create_dir_all(&overrides_root)?;
    let rules = WatchRules::new(
        docs_root.clone(),
        overrides_root.clone(),
        navigator.languages().to_vec(),
    );

    let (tx, mut rx) = mpsc::channel::<Event>(256);
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            // Use blocking_send since callback is sync
            let _ = tx.blocking_send(event);
        }
    })?;
    watcher.watch(&docs_root, RecursiveMode::Recursive)?;
    watcher.watch(&overrides_root, RecursiveMode::Recursive)?;

    output.info(&format!("Watching {}", docs_root.display()));
    output.info(&format!("Watching {}", overrides_root.display()));
    output.info("Press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                let mut affected = rules.affected(&event);
                tokio::time::sleep(DEBOUNCE).await;
                while let Ok(event) = rx.try_recv() {
                    affected.extend(rules.affected(&event));
                }
                for lang in affected {
                    navigator.invalidate(Some(&lang))?;
                    if navigator.trigger(&lang)? {
                        output.detail(&format!("rebuilding {}", language_label(&lang)));
                    } else {
                        tracing::debug!(lang = %lang, "Rebuild already running, change dropped");
                    }
                }
            }
        }
    }

    drop(watcher);
    output.info("Stopped watching");
    Ok(())
}

/// Decides which language a filesystem event affects.
pub(crate) struct WatchRules {
    docs_root: PathBuf,
    overrides_root: PathBuf,
    languages: Vec<String>,
}

impl WatchRules {
    pub(crate) fn new(docs_root: PathBuf, overrides_root: PathBuf, languages: Vec<String>) -> Self {
        Self {
            docs_root,
            overrides_root,
            languages,
        }
    }

    /// Languages affected by any path of `event`.
    pub(crate) fn affected(&self, event: &Event) -> BTreeSet<String> {
        event
            .paths
            .iter()
            .filter_map(|path| self.language_for(&event.kind, path))
            .collect()
    }

    /// Language affected by a change of `path`, if the change matters.
    ///
    /// - Sidecar and metadata `.json` files count on any change, archives
    ///   never do.
    /// - Content `index.md` files count on any change.
    /// - Other markdown files and directories count when created, removed or
    ///   renamed.
    pub(crate) fn language_for(&self, kind: &EventKind, path: &Path) -> Option<String> {
        let structural = matches!(
            kind,
            EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
        );
        if !structural && !matches!(kind, EventKind::Modify(_)) {
            return None;
        }

        if let Ok(relative) = path.strip_prefix(&self.overrides_root) {
            let relative = relative.to_string_lossy();
            if relative.starts_with(".archive") || !SIDECAR.matches(&relative) {
                return None;
            }
            let relative = relative.strip_prefix(".metadata/").unwrap_or(&relative);
            return self.language_of(relative);
        }

        let relative = path.strip_prefix(&self.docs_root).ok()?.to_string_lossy();
        if relative.split('/').any(|segment| segment.starts_with('.')) {
            return None;
        }
        let relevant = if structural {
            MARKDOWN.matches(&relative) || path.extension().is_none()
        } else {
            INDEX.matches_with(
                &relative,
                MatchOptions {
                    case_sensitive: false,
                    ..MatchOptions::new()
                },
            )
        };
        if !relevant {
            return None;
        }
        self.language_of(&relative)
    }

    fn language_of(&self, relative: &str) -> Option<String> {
        let first = relative.split('/').next().unwrap_or_default();
        self.languages
            .iter()
            .find(|lang| !lang.is_empty() && *lang == first)
            .or_else(|| self.languages.iter().find(|lang| lang.is_empty()))
            .cloned()
    }
}

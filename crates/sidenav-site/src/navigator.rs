//! Two-phase navigation access.
//!
//! [`Navigator`] owns the per-language caches and serializes builds:
//!
//! 1. [`Navigator::prebuild`] (or [`Navigator::generate`]) runs the pipeline
//!    on a blocking worker and fills both cache tiers.
//! 2. [`Navigator::get`] reads the caches synchronously and never builds.
//!
//! # Thread Safety
//!
//! Each language has its own async mutex acting as the in-flight flag:
//! `generate` waits for it, [`Navigator::trigger`] drops the request when it
//! is held. Languages build independently.
//!
//! Every build reads front matter through a fresh resolver, so edits to
//! `index.md` or the global defaults show up on the next build without an
//! explicit invalidation.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::Arc;

use sidenav_cache::{Cache, CacheExt, FileCache, MemoryCache, NullCache};
use tokio::sync::Mutex;

use crate::context::NavContext;
use crate::item::RouteMap;
use crate::pipeline::build_routes;

/// Caller misuse of the [`Navigator`].
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// The language is not configured.
    #[error("Unknown language {lang:?} (configured: {})", .available.join(", "))]
    UnknownLanguage {
        lang: String,
        available: Vec<String>,
    },
    /// The navigator cannot be built from the given context.
    #[error("Navigator not initialized: {0}")]
    NotInitialized(String),
    /// The build worker panicked or was cancelled.
    #[error("Navigation build did not complete: {0}")]
    Join(String),
}

/// Cached, serialized access to the navigation of every configured language.
pub struct Navigator {
    context: Arc<NavContext>,
    memory: MemoryCache<RouteMap>,
    snapshots: Box<dyn Cache>,
    in_flight: HashMap<String, Arc<Mutex<()>>>,
}

impl Navigator {
    /// Create a navigator for `context`.
    ///
    /// Fails when the context lists no language.
    pub fn new(context: NavContext) -> Result<Self, NavError> {
        if context.languages.is_empty() {
            return Err(NavError::NotInitialized("no languages configured".to_owned()));
        }

        let snapshots: Box<dyn Cache> = match &context.cache_dir {
            Some(dir) => Box::new(FileCache::new(
                dir.clone(),
                env!("CARGO_PKG_VERSION"),
                context.cache_ttl,
            )),
            None => Box::new(NullCache),
        };
        let in_flight = context
            .languages
            .iter()
            .map(|lang| (lang.clone(), Arc::new(Mutex::new(()))))
            .collect();

        Ok(Self {
            memory: MemoryCache::new(context.cache_ttl),
            snapshots,
            in_flight,
            context: Arc::new(context),
        })
    }

    /// Configured languages in declaration order.
    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.context.languages
    }

    /// Build the navigation of `lang` and store it in both cache tiers.
    ///
    /// Waits for a build of the same language already in flight.
    pub async fn generate(&self, lang: &str) -> Result<Arc<RouteMap>, NavError> {
        let lock = self.in_flight(lang)?;
        let _guard = lock.lock().await;
        self.build(lang).await
    }

    /// Build every language in `langs` concurrently.
    ///
    /// All languages are validated before any build starts. Duplicates are
    /// built once.
    pub async fn prebuild(&self, langs: &[String]) -> Result<(), NavError> {
        let mut seen = HashSet::new();
        let locks = langs
            .iter()
            .filter(|lang| seen.insert(lang.as_str()))
            .map(|lang| self.in_flight(lang).map(|lock| (lang, Arc::clone(lock))))
            .collect::<Result<Vec<_>, _>>()?;

        let mut pending = Vec::with_capacity(locks.len());
        for (lang, lock) in locks {
            let guard = lock.lock_owned().await;
            pending.push((lang, guard, self.spawn_build(lang)));
        }
        for (lang, _guard, handle) in pending {
            let routes = handle.await.map_err(|e| NavError::Join(e.to_string()))?;
            self.store(lang, routes);
        }
        Ok(())
    }

    /// Start a background build of `lang`.
    ///
    /// Returns `false` without doing anything when a build of the language
    /// is already in flight.
    pub fn trigger(self: &Arc<Self>, lang: &str) -> Result<bool, NavError> {
        let lock = self.in_flight(lang)?;
        let Ok(guard) = Arc::clone(lock).try_lock_owned() else {
            tracing::debug!(lang, "Build in flight, dropping trigger");
            return Ok(false);
        };

        let navigator = Arc::clone(self);
        let lang = lang.to_owned();
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = navigator.build(&lang).await {
                tracing::error!(lang, error = %e, "Background navigation build failed");
            }
        });
        Ok(true)
    }

    /// Best-effort navigation of `lang` from the caches.
    ///
    /// Order: fresh memory entry, fresh snapshot (promoted to memory), stale
    /// memory entry, stale snapshot, empty map. Never builds.
    pub fn get(&self, lang: &str) -> Result<Arc<RouteMap>, NavError> {
        self.in_flight(lang)?;
        let key = memory_key(lang);
        if let Some(routes) = self.memory.get(&key) {
            return Ok(routes);
        }

        let source_mtime = fs::metadata(self.context.lang_root(lang))
            .and_then(|m| m.modified())
            .ok();
        let snapshot = self
            .snapshots
            .get_json::<RouteMap>(&snapshot_key(lang), source_mtime);
        let snapshot = match snapshot {
            Some((routes, true)) => {
                let routes = Arc::new(routes);
                self.memory.insert(&key, Arc::clone(&routes));
                return Ok(routes);
            }
            other => other,
        };

        if let Some(routes) = self.memory.get_stale(&key) {
            tracing::debug!(lang, "Serving expired navigation");
            return Ok(routes);
        }
        if let Some((routes, _)) = snapshot {
            tracing::info!(lang, "Serving stale navigation snapshot");
            return Ok(Arc::new(routes));
        }

        tracing::debug!(lang, "No navigation built yet");
        Ok(Arc::new(RouteMap::new()))
    }

    /// Drop cached navigation of one language, or of all when `None`.
    pub fn invalidate(&self, lang: Option<&str>) -> Result<(), NavError> {
        match lang {
            Some(lang) => {
                self.in_flight(lang)?;
                self.memory.remove(&memory_key(lang));
                self.snapshots.remove(&snapshot_key(lang));
            }
            None => {
                self.memory.clear();
                self.snapshots.clear();
            }
        }
        Ok(())
    }

    fn in_flight(&self, lang: &str) -> Result<&Arc<Mutex<()>>, NavError> {
        self.in_flight
            .get(lang)
            .ok_or_else(|| NavError::UnknownLanguage {
                lang: lang.to_owned(),
                available: self.context.languages.clone(),
            })
    }

    async fn build(&self, lang: &str) -> Result<Arc<RouteMap>, NavError> {
        let routes = self
            .spawn_build(lang)
            .await
            .map_err(|e| NavError::Join(e.to_string()))?;
        Ok(self.store(lang, routes))
    }

    fn spawn_build(&self, lang: &str) -> tokio::task::JoinHandle<RouteMap> {
        let context = Arc::clone(&self.context);
        let lang = lang.to_owned();
        tokio::task::spawn_blocking(move || build_routes(&context, &context.resolver(), &lang))
    }

    fn store(&self, lang: &str, routes: RouteMap) -> Arc<RouteMap> {
        let routes = Arc::new(routes);
        self.snapshots.set_json(&snapshot_key(lang), &*routes);
        self.memory.insert(&memory_key(lang), Arc::clone(&routes));
        routes
    }
}

/// Memory tier key of a language; `root` stands for the unprefixed site.
fn memory_key(lang: &str) -> String {
    format!("sidebar_{}", if lang.is_empty() { "root" } else { lang })
}

fn snapshot_key(lang: &str) -> String {
    format!("{}.json", memory_key(lang))
}

#[cfg(test)]
mod tests {
    static_assertions::assert_impl_all!(super::Navigator: Send, Sync);

    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn context(tmp: &TempDir, cache: bool) -> NavContext {
        let docs_root = tmp.path().join("docs");
        write(&docs_root, "en/a.md", "# A");
        write(&docs_root, "ru/b.md", "# B");
        NavContext {
            global_config: docs_root.join(".sidebarrc.yml"),
            docs_root,
            languages: vec!["en".to_owned(), "ru".to_owned()],
            overrides_dir: tmp.path().join("overrides"),
            cache_dir: cache.then(|| tmp.path().join("cache")),
            cache_ttl: Duration::from_secs(300),
            exclude: Vec::new(),
            detect_imported: true,
            dev_mode: false,
        }
    }

    // ── construction ────────────────────────────────────────────────

    #[test]
    fn test_new_requires_languages() {
        let tmp = TempDir::new().unwrap();
        let mut context = context(&tmp, false);
        context.languages.clear();

        assert!(matches!(Navigator::new(context), Err(NavError::NotInitialized(_))));
    }

    #[test]
    fn test_keys() {
        assert_eq!(memory_key("en"), "sidebar_en");
        assert_eq!(snapshot_key(""), "sidebar_root.json");
    }

    // ── access ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unknown_language_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let navigator = Navigator::new(context(&tmp, false)).unwrap();

        let err = navigator.generate("de").await.unwrap_err();

        assert!(matches!(err, NavError::UnknownLanguage { ref lang, .. } if lang == "de"));
        assert!(navigator.get("de").is_err());
        assert!(navigator.invalidate(Some("de")).is_err());
    }

    #[tokio::test]
    async fn test_get_before_prebuild_is_empty() {
        let tmp = TempDir::new().unwrap();
        let navigator = Navigator::new(context(&tmp, false)).unwrap();

        assert!(navigator.get("en").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prebuild_then_get() {
        let tmp = TempDir::new().unwrap();
        let navigator = Navigator::new(context(&tmp, false)).unwrap();

        navigator.prebuild(navigator.languages()).await.unwrap();

        let en = navigator.get("en").unwrap();
        assert_eq!(en["/en/"][0].text, "a");
        let ru = navigator.get("ru").unwrap();
        assert_eq!(ru["/ru/"][0].text, "b");
    }

    #[tokio::test]
    async fn test_snapshot_survives_restart() {
        let tmp = TempDir::new().unwrap();
        let first = Navigator::new(context(&tmp, true)).unwrap();
        first.generate("en").await.unwrap();
        assert!(tmp.path().join("cache/sidebar_en.json").is_file());

        let second = Navigator::new(context(&tmp, true)).unwrap();

        assert_eq!(second.get("en").unwrap()["/en/"][0].text, "a");
    }

    #[tokio::test]
    async fn test_invalidate_clears_both_tiers() {
        let tmp = TempDir::new().unwrap();
        let navigator = Navigator::new(context(&tmp, true)).unwrap();
        navigator.prebuild(navigator.languages()).await.unwrap();

        navigator.invalidate(Some("en")).unwrap();
        assert!(navigator.get("en").unwrap().is_empty());
        assert!(!navigator.get("ru").unwrap().is_empty());

        navigator.invalidate(None).unwrap();
        assert!(navigator.get("ru").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_rereads_changed_front_matter() {
        let tmp = TempDir::new().unwrap();
        let navigator = Navigator::new(context(&tmp, false)).unwrap();
        let docs = tmp.path().join("docs");
        write(&docs, "en/guide/index.md", "---\ntitle: First\n---\n");
        write(&docs, "en/guide/x.md", "# X");

        let first = navigator.generate("en").await.unwrap();
        write(&docs, "en/guide/index.md", "---\ntitle: Second\n---\n");
        let second = navigator.generate("en").await.unwrap();

        let titles = |routes: &RouteMap| -> Vec<String> {
            routes["/en/"].iter().map(|i| i.text.clone()).collect()
        };
        assert!(titles(&first).contains(&"First".to_owned()));
        assert!(titles(&second).contains(&"Second".to_owned()));
        assert!(!titles(&second).contains(&"First".to_owned()));
    }

    // ── background builds ───────────────────────────────────────────

    #[tokio::test]
    async fn test_trigger_is_dropped_while_in_flight() {
        let tmp = TempDir::new().unwrap();
        let navigator = Arc::new(Navigator::new(context(&tmp, false)).unwrap());

        let held = Arc::clone(navigator.in_flight("en").unwrap()).lock_owned().await;
        assert!(!navigator.trigger("en").unwrap());
        drop(held);

        assert!(navigator.trigger("en").unwrap());
        drop(navigator.in_flight("en").unwrap().lock().await);
        let routes = navigator.generate("en").await.unwrap();
        assert_eq!(routes["/en/"][0].text, "a");
    }
}

//! The full navigation build of one language.
//!
//! ```text
//! generate views → sync + reapply overrides → clean sidecars → sort → route map
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use sidenav_overrides::{ArchiveService, MetadataStore, OverrideStore, ROOT_SIGNATURE, SidecarLayout};
use sidenav_resolver::ConfigResolver;

use crate::cleanup::DirectoryCleanup;
use crate::context::NavContext;
use crate::exclude::Exclusions;
use crate::generator::Generator;
use crate::item::{NavItem, RouteMap};
use crate::signatures::active_signatures;
use crate::sorter::sort_tree;
use crate::synchronizer::Synchronizer;

struct View {
    route: String,
    dir: PathBuf,
    items: Vec<NavItem>,
}

/// Build the route map of `lang`.
///
/// Reads content through `resolver` and updates the sidecars below
/// `context.overrides_dir` as a side effect. Never fails: unreadable files
/// contribute nothing and sidecar write errors are logged.
pub fn build_routes(context: &NavContext, resolver: &ConfigResolver, lang: &str) -> RouteMap {
    let start = Instant::now();
    let lang_root = resolver.lang_root(lang);
    let exclusions = Exclusions::new(&lang_root, &context.exclude, context.detect_imported);
    let generator = Generator::new(resolver, lang, exclusions, context.dev_mode);

    let mut views: Vec<View> = generator
        .views()
        .into_iter()
        .map(|dir| View {
            route: generator.route_for(&dir),
            items: generator.generate_view(&dir),
            dir,
        })
        .collect();

    let layout = SidecarLayout::new(&context.overrides_dir);
    let overrides = OverrideStore::new(layout.clone());
    let metadata = MetadataStore::new(layout.clone());
    let archive = ArchiveService::new(layout.clone());
    let synchronizer = Synchronizer::new(&overrides, &metadata, &archive, lang, &lang_root);
    for view in &mut views {
        synchronizer.sync_view(&view.dir, &mut view.items);
        synchronizer.reapply_view(&view.dir, &mut view.items);
    }

    let mut active = BTreeSet::from([ROOT_SIGNATURE.to_owned()]);
    for view in &views {
        active.extend(active_signatures(&view.items, &lang_root));
    }
    let report = DirectoryCleanup::new(&layout, &metadata, lang, &lang_root).run(&active);

    let mut routes = RouteMap::new();
    for mut view in views {
        sort_tree(&mut view.items);
        let visible = NavItem::without_hidden(&view.items);
        if visible.is_empty() {
            tracing::debug!(route = %view.route, "Skipping empty view");
            continue;
        }
        routes.insert(view.route, visible);
    }

    tracing::info!(
        lang,
        routes = routes.len(),
        deleted = report.deleted.len(),
        soft_archived = report.soft_archived.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Built navigation"
    );
    routes
}

//! Navigation generation for sidenav.
//!
//! This crate provides:
//! - [`Generator`]: builds navigation views from the content tree
//! - [`Synchronizer`]: reconciles views with the override sidecars
//! - [`DirectoryCleanup`]: removes sidecars of deleted directories
//! - [`Navigator`]: cached two-phase access for every language
//!
//! # Quick Start
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use sidenav_config::Config;
//! use sidenav_site::{NavContext, Navigator};
//!
//! let config = Config::load(None, None)?;
//! let navigator = Navigator::new(NavContext::from(&config))?;
//!
//! // Phase one: build every language
//! navigator.prebuild(navigator.languages()).await?;
//!
//! // Phase two: synchronous reads
//! let routes = navigator.get("en")?;
//! # Ok(())
//! # }
//! ```

mod cleanup;
mod context;
mod engine;
mod exclude;
mod generator;
mod groups;
mod item;
mod links;
mod navigator;
mod pipeline;
mod signatures;
mod sorter;
mod synchronizer;

pub use cleanup::{CleanupReport, DirectoryCleanup};
pub use context::NavContext;
pub use engine::{SyncStats, default_value, order_number, sync_records};
pub use exclude::{Exclusions, IMPORTED_MARKER};
pub use generator::Generator;
pub use item::{NavItem, RouteMap, UNORDERED_PRIORITY};
pub use links::{dir_link, file_link, slugify};
pub use navigator::{NavError, Navigator};
pub use pipeline::build_routes;
pub use signatures::{active_signatures, on_disk_signatures};
pub use sorter::{sort_structural, sort_tree};
pub use synchronizer::Synchronizer;

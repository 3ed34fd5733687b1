//! `sidenav generate` command implementation.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use sidenav_site::{NavItem, RouteMap};

use super::ContextArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Directory to write one `sidebar_<lang>.json` file per language to.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the navigation of every language as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or an output file cannot be
    /// written.
    pub(crate) async fn execute(self, context: &ContextArgs) -> Result<(), CliError> {
        let output = Output::new();
        let (config, navigator) = context.navigator()?;

        output.info(&format!(
            "Source directory: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!(
            "Overrides directory: {}",
            config.overrides_resolved.dir.display()
        ));

        let start = Instant::now();
        navigator.prebuild(navigator.languages()).await?;

        let mut generated: Vec<(String, Arc<RouteMap>)> = Vec::new();
        for lang in navigator.languages() {
            let routes = navigator.get(lang)?;
            output.language(lang);
            if routes.is_empty() {
                output.detail("no navigation items");
            }
            for (route, items) in routes.iter() {
                output.route(route, count_items(items));
            }
            if let Some(dir) = &self.output {
                let path = write_routes(dir, lang, &routes)?;
                output.detail(&format!("written to {}", path.display()));
            }
            generated.push((lang.clone(), routes));
        }

        if self.json {
            let maps: BTreeMap<&str, &RouteMap> = generated
                .iter()
                .map(|(lang, routes)| (lang.as_str(), routes.as_ref()))
                .collect();
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &maps)?;
            stdout.write_all(b"\n")?;
        }

        output.success(&format!(
            "Generated navigation for {} language(s) in {:.0}ms",
            generated.len(),
            start.elapsed().as_secs_f64() * 1000.0
        ));
        Ok(())
    }
}

/// Navigation file name of a language; `root` stands for the unprefixed site.
fn output_file_name(lang: &str) -> String {
    format!("sidebar_{}.json", if lang.is_empty() { "root" } else { lang })
}

fn write_routes(dir: &Path, lang: &str, routes: &RouteMap) -> Result<PathBuf, CliError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(output_file_name(lang));
    let mut json = serde_json::to_string_pretty(routes)?;
    json.push('\n');
    fs::write(&path, json)?;
    Ok(path)
}

/// Number of items in a tree, at every depth.
fn count_items(items: &[NavItem]) -> usize {
    items
        .iter()
        .map(|item| 1 + count_items(item.children()))
        .sum()
}

//! sidenav CLI - documentation navigation generator.
//!
//! Provides commands for:
//! - `generate`: Build the navigation of every configured language
//! - `languages`: List configured languages
//! - `clean`: Drop cached navigation
//! - `watch`: Rebuild navigation when content or overrides change

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ContextArgs, GenerateArgs};
use error::CliError;
use output::Output;

/// sidenav - documentation navigation generator.
#[derive(Parser)]
#[command(name = "sidenav", version, about)]
struct Cli {
    #[command(flatten)]
    context: ContextArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build navigation and print a summary.
    Generate(GenerateArgs),
    /// List configured languages.
    Languages,
    /// Drop cached navigation.
    Clean,
    /// Rebuild navigation whenever content or overrides change.
    Watch,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.context.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate(args) => runtime()?.block_on(args.execute(&cli.context)),
        Commands::Languages => commands::languages::execute(&cli.context),
        Commands::Clean => commands::clean::execute(&cli.context),
        Commands::Watch => runtime()?.block_on(commands::watch::execute(&cli.context)),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    Ok(tokio::runtime::Runtime::new()?)
}

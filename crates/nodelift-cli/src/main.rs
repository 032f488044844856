//! # nodelift
//!
//! Converts npm packages into the form a jspm-style module loader consumes.
//!
//! This is the entry point of the CLI. It parses arguments, sets up logging
//! and dispatches to the command handlers.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use nodelift_core::error::{LiftError, LiftResult};
use tracing::{debug, error};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// npm to jspm package converter
#[derive(Parser)]
#[command(name = "nodelift", version, about = "npm to jspm package converter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate npm version ranges
    Translate {
        #[arg(required = true)]
        ranges: Vec<String>,
    },
    /// Normalize a package.json
    Normalize {
        /// Manifest to read (defaults to ./package.json)
        manifest: Option<Utf8PathBuf>,
        /// Overwrite the manifest instead of printing it
        #[arg(long)]
        write: bool,
    },
    /// Rewrite an extracted package directory in place
    Build {
        /// Package root (defaults to the current directory)
        dir: Option<Utf8PathBuf>,
    },
    /// List the published versions of a package
    Lookup { name: String },
    /// Download and convert NAME@VERSION
    Import {
        package: String,
        #[arg(long)]
        out: Utf8PathBuf,
    },
    /// Show or update the registry endpoint configuration
    Config {
        #[arg(long)]
        registry: Option<String>,
        #[arg(long, requires = "password")]
        username: Option<String>,
        #[arg(long, requires = "username")]
        password: Option<String>,
        /// Write to ~/.nodelift/config.toml instead of the project file
        #[arg(long)]
        global: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    debug!("Starting nodelift v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", ErrorFormatter::new().format_error(&e));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> LiftResult<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| LiftError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new()?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("nodelift={0},nodelift_core={0},nodelift_semver={0},nodelift_config={0},nodelift_registry={0},nodelift_cache={0},nodelift_build={0}", level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("nodelift encountered an unexpected error: {}", panic_info);
        eprintln!("nodelift crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/nodelift/nodelift/issues");
        eprintln!("Error: {}", panic_info);
    }));
}

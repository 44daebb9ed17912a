//! Cutline CLI - Inspect and transform timeline compositions.
//!
//! Usage:
//!   cutline validate <PATH>               Check a composition document
//!   cutline info <PATH>                   Summarize tracks and elements
//!   cutline edl <PATH>                    Print the render EDL
//!   cutline synthesize <META> -o <PATH>   Build a composition from project metadata
//!   cutline apply <PATH> <MODS>           Fill template slots

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cutline_core::EditorConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cutline", about = "Timeline composition toolkit", version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Editor configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a composition document
    Validate {
        /// Path to the composition JSON
        path: PathBuf,
    },

    /// Show composition information
    Info {
        /// Path to the composition JSON
        path: PathBuf,
    },

    /// Print the edit decision list
    Edl {
        /// Path to the composition JSON
        path: PathBuf,

        /// Only video elements from video tracks, as one merged track
        #[arg(long)]
        primary: bool,
    },

    /// Build a starting composition from project metadata
    Synthesize {
        /// Path to the project metadata JSON
        metadata: PathBuf,

        /// Where to write the composition
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Apply template modifications to a composition
    Apply {
        /// Path to the composition JSON
        path: PathBuf,

        /// JSON object of modification key → value or patch
        modifications: PathBuf,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => EditorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Info { path } => commands::info::run(path, &config),
        Commands::Edl { path, primary } => commands::edl::run(path, primary),
        Commands::Synthesize { metadata, output } => {
            commands::synthesize::run(metadata, output, &config)
        }
        Commands::Apply {
            path,
            modifications,
            output,
        } => commands::apply::run(path, modifications, output, &config),
    }
}

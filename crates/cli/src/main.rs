//! repograph CLI - portfolio graph builder and retrieval endpoint
//!
//! This binary provides the command-line interface for the repograph system.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repograph::commands;
use repograph_core::config::Config;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repograph")]
#[command(about = "Portfolio graph builder and retrieval-augmented chat endpoint")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the repository graph from crawled repository documents
    Build {
        /// Skip repository metadata requests
        #[arg(long)]
        offline: bool,

        /// Directory of crawled `<repo>.txt` documents
        #[arg(long, value_name = "DIR")]
        dataset: Option<PathBuf>,

        /// Directory of `<project>.json` detail records
        #[arg(long, value_name = "DIR")]
        details: Option<PathBuf>,

        /// Graph output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Seed for the randomized layout rotations
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },
    /// Serve the retrieval endpoint
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Build the retrieval corpus from the dataset and detail records
    PrepareRag {
        /// Corpus output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print node type and extension counts of a graph file
    Stats {
        /// Graph file
        file: PathBuf,
    },
    /// Re-normalize the keys of a node-shaped JSON document
    Normalize {
        /// Input document
        input: PathBuf,

        /// Output file (defaults to rewriting the input)
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            offline,
            dataset,
            details,
            output,
            seed,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(dir) = dataset {
                config.paths.dataset_dir = path_string(&dir);
            }
            if let Some(dir) = details {
                config.paths.details_dir = path_string(&dir);
            }
            if let Some(file) = output {
                config.paths.output_file = path_string(&file);
            }
            if seed.is_some() {
                config.layout.seed = seed;
            }
            config.validate()?;

            let report = commands::build(&config, offline).await?;
            info!("Graph written to {}", config.paths.output_file);
            println!("{report}");
            Ok(())
        }
        Commands::Serve { port } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            repograph_server::run_server(config)
                .await
                .context("Retrieval server failed")
        }
        Commands::PrepareRag { output } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(file) = output {
                config.paths.rag_data_file = path_string(&file);
            }
            config.validate()?;

            let count = commands::prepare_rag(&config).await?;
            println!("{count} documents written to {}", config.paths.rag_data_file);
            Ok(())
        }
        Commands::Stats { file } => {
            let stats = commands::stats(&file)?;
            println!("{stats}");
            Ok(())
        }
        Commands::Normalize { input, output } => {
            let written = commands::normalize(&input, output.as_deref())?;
            println!("Normalized document written to {}", written.display());
            Ok(())
        }
    }
}

/// Initialize logging system; `RUST_LOG` takes precedence over `--verbose`
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("repograph={level},tower_http={level}")));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load configuration")
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

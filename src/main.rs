//! # Route Registry CLI (`rreg`)
//!
//! ## Usage
//!
//! ```bash
//! rreg --config ./config/registry.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rreg routes` | List routes discovered under the app directory |
//! | `rreg scan [--route R]` | Scan routes and write registry artifacts |
//! | `rreg show <route>` | Print a stored artifact |
//! | `rreg search "<query>"` | Rank components or routes against a query |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default
//! `info`); command output goes to stdout.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use route_registry::config::{self, Config};
use route_registry::search::SearchTarget;
use route_registry::{scan, search, show};

/// Route Registry: static route scanner and semantic component search.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/registry.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "rreg",
    about = "Route Registry — static route scanner and semantic component search",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/registry.toml`. If the file does not exist,
    /// built-in defaults rooted at the current directory are used.
    #[arg(long, global = true, default_value = "./config/registry.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered routes.
    Routes,

    /// Scan routes and persist one artifact per route.
    ///
    /// Failing routes are reported and skipped.
    Scan {
        /// Scan only this route (e.g. `main/match`; `/` for the root).
        #[arg(long)]
        route: Option<String>,
    },

    /// Print the stored artifact for a route.
    Show {
        /// Route id (e.g. `auth/login`; `/` for the root).
        route: String,

        /// Print the raw JSON artifact.
        #[arg(long)]
        json: bool,
    },

    /// Search stored artifacts by semantic similarity.
    Search {
        /// Free-text query.
        query: String,

        /// Index to search.
        #[arg(long, value_enum, default_value = "components")]
        target: SearchTarget,

        /// Maximum number of results (defaults to `search.default_limit`).
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn load(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = load(&cli.config)?;

    match cli.command {
        Commands::Routes => scan::run_routes(&cfg)?,
        Commands::Scan { route } => scan::run_scan(&cfg, route.as_deref())?,
        Commands::Show { route, json } => show::run_show(&cfg, &route, json)?,
        Commands::Search {
            query,
            target,
            limit,
        } => search::run_search(&cfg, &query, target, limit)?,
    }

    Ok(())
}

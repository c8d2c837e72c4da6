//! Postshelf CLI
//!
//! Runs one query against the configured post store and prints the result
//! as JSON on stdout. Logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use postshelf::{open_store, BackendKind, PostStore, StoreConfig};
use serde::Serialize;

// =============================================================================
// Constants
// =============================================================================

/// Application name
pub const APP_NAME: &str = "postshelf";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// CLI
// =============================================================================

/// Read blog posts from a local JSON file or Cloud Firestore
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(version)]
struct Cli {
    /// Backend to query (overrides POSTSHELF_BACKEND)
    #[arg(short, long, value_enum, global = true)]
    backend: Option<BackendKind>,

    /// Directory holding posts.json (overrides POSTSHELF_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every post, sorted by title
    List,
    /// List every post identifier as {params: {id}}
    Ids,
    /// Fetch one post by identifier
    Get {
        /// Post identifier
        id: String,
    },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Missing .env is fine
    dotenvy::dotenv().ok();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} v{}", APP_NAME, APP_VERSION);

    let mut config = match cli.backend {
        Some(kind) => StoreConfig::for_kind(kind, |key| std::env::var(key).ok()),
        None => StoreConfig::from_env(),
    }
    .context("failed to load configuration")?;
    if let Some(dir) = &cli.data_dir {
        config = config
            .with_data_dir(dir)
            .context("--data-dir cannot be used here")?;
    }

    let store = open_store(&config).context("failed to open post store")?;

    match &cli.command {
        Command::List => {
            let posts = store.list_sorted().await.context("failed to list posts")?;
            print_json(&posts, cli.pretty)?;
        }
        Command::Ids => {
            let paths = store
                .list_identifiers()
                .await
                .context("failed to list post identifiers")?;
            print_json(&paths, cli.pretty)?;
        }
        Command::Get { id } => {
            let lookup = store
                .get_by_id(id)
                .await
                .with_context(|| format!("failed to get post {id}"))?;
            if !lookup.is_found() {
                tracing::info!(id = %id, "post not found");
            }
            print_json(&lookup, cli.pretty)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

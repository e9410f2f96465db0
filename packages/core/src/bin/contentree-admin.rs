//! Operator CLI for a contentree database
//!
//! Reads the database location from `CONTENTREE_DB_PATH` (or `--db`) and
//! runs one read or maintenance command against it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contentree_core::{
    ContentId, ContentService, ContentreeConfig, DatabaseService, TursoStore, UserId,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "contentree-admin")]
#[command(about = "Inspect and maintain contentree content trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database file (overrides CONTENTREE_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List a user's roots in order
    Roots { user_id: UserId },

    /// Show a node with its reference slots resolved
    Resolve { content_id: ContentId },

    /// Print the public JSON rendering of a root
    Render { root_id: ContentId },

    /// Reclaim unreachable rows under a root
    Gc { root_id: ContentId },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ContentreeConfig::from_env()?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("Database: {}", config.database_path.display());

    let db = DatabaseService::new(config.database_path.clone())
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    let store = Arc::new(TursoStore::new(Arc::new(db)));
    let service = ContentService::with_event_capacity(store, config.event_channel_capacity);

    match cli.command {
        Command::Roots { user_id } => {
            let roots = service.list_roots(user_id).await?;
            println!("{}", serde_json::to_string_pretty(&roots)?);
        }
        Command::Resolve { content_id } => {
            let resolved = service.resolve(content_id).await?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Command::Render { root_id } => {
            let rendered = service.render_root(root_id).await?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
        Command::Gc { root_id } => {
            let report = service.collect_garbage(root_id).await?;
            tracing::info!("Reclaimed {} rows under {}", report.len(), root_id);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

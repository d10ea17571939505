//! Courier CLI: the `serve` lifecycle plus queue maintenance commands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use courier_core::Config;
use courier_storage::{PendingStore, SqliteStore};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "At-least-once notification delivery service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the delivery service.
    Serve {
        /// Listen port; overrides COURIER_PORT.
        #[arg(short, long)]
        port: Option<u16>,
        /// Listen host; overrides COURIER_HOST.
        #[arg(short = 'H', long)]
        host: Option<String>,
    },
    /// List queued messages as JSON.
    Queue {
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// Print queue statistics as JSON.
    Stats,
    /// Return all dead letters to the queue.
    RequeueDead,
    /// Delete all dead letters.
    PurgeDead,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.http_port = port;
            }
            if let Some(host) = host {
                config.http_host = host;
            }
            commands::serve::run(config).await
        },
        Commands::Queue { limit } => {
            let store = SqliteStore::connect(&config.database_url).await?;
            let messages = store.list(limit).await?;
            println!("{}", serde_json::to_string_pretty(&messages)?);
            Ok(())
        },
        Commands::Stats => {
            let store = SqliteStore::connect(&config.database_url).await?;
            let stats = store.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        },
        Commands::RequeueDead => {
            let store = SqliteStore::connect(&config.database_url).await?;
            let requeued = store.requeue_dead().await?;
            println!("requeued {requeued} dead letters");
            Ok(())
        },
        Commands::PurgeDead => {
            let store = SqliteStore::connect(&config.database_url).await?;
            let purged = store.purge_dead().await?;
            println!("purged {purged} dead letters");
            Ok(())
        },
    }
}

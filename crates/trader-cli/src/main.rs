use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trader_core::RemoveOutcome;
use trader_storage::PgStore;
use trader_sync::{import_watchlist, AppConfig, DashboardViewBuilder, Synchronizer};

#[derive(Debug, Parser)]
#[command(name = "trader-cli")]
#[command(about = "Smart Trader favorites command-line interface")]
struct Cli {
    /// Overrides DATABASE_URL.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve {
        /// Overrides PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply database migrations and exit.
    Migrate,
    /// Favorite a ticker.
    Add { ticker: String },
    /// Unfavorite a ticker; its enrichment record is kept.
    Remove { ticker: String },
    /// Print the dashboard rows as JSON.
    List,
    /// Favorite every ticker in a YAML watchlist (`tickers: [...]`).
    Import { path: PathBuf },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(config: &AppConfig) -> Result<Arc<PgStore>> {
    let store = PgStore::connect(&config.pool_config())
        .await
        .context("connecting to database")?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            trader_web::serve(&config).await?;
        }
        Commands::Migrate => {
            connect(&config).await?.migrate().await.context("applying migrations")?;
            info!("migrations applied");
        }
        Commands::Add { ticker } => {
            let sync = Synchronizer::new(connect(&config).await?);
            let outcome = sync.add_favorite(&ticker).await?;
            println!(
                "added {} (favorite_created={} placeholder_created={})",
                outcome.ticker, outcome.favorite_created, outcome.placeholder_created
            );
        }
        Commands::Remove { ticker } => {
            let sync = Synchronizer::new(connect(&config).await?);
            let (ticker, outcome) = sync.remove_favorite(&ticker).await?;
            match outcome {
                RemoveOutcome::Removed => println!("removed {ticker}"),
                RemoveOutcome::NotFound => println!("{ticker} was not a favorite"),
            }
        }
        Commands::List => {
            let view = DashboardViewBuilder::new(connect(&config).await?);
            let rows = view.list_favorites_with_enrichment().await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Import { path } => {
            let sync = Synchronizer::new(connect(&config).await?);
            let summary = import_watchlist(&sync, &path).await?;
            println!(
                "import complete: created={} existing={} invalid={}",
                summary.created,
                summary.existing,
                summary.invalid.len()
            );
        }
    }

    Ok(())
}

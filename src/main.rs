use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_client::{OpenFoodFactsClient, validate_code};
use clap::{Parser, Subcommand};
use product_vectors::{
    AppConfig, QdrantIndex, SimilarityService, pipeline, read_migrated_vocabulary,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "food-similarity",
    about = "Vectorizes Open Food Facts products by recipe categories and finds similar ones"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch catalog pages and write a new dataset.
    Fetch,
    /// Replace the Qdrant collection with the latest dataset and record it as migrated.
    Migrate,
    /// Print the products most similar to a barcode.
    Query {
        /// Product barcode (digits only).
        #[arg(long)]
        product: String,
    },
    /// Serve the HTTP API.
    Serve {
        /// Address to bind the HTTP server to (host:port).
        #[arg(long, env = "API_ADDRESS", default_value = "127.0.0.1:3000")]
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the environment.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,product_vectors=info,catalog_client=info"))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Command::Fetch => {
            let catalog = OpenFoodFactsClient::from_config(cfg.catalog.clone())?;
            let summary = pipeline::build_dataset(&catalog, &cfg)
                .await
                .context("fetch failed")?;
            info!(
                "Dataset ready: {} products, {} categories",
                summary.products, summary.vocabulary_size
            );
        }
        Command::Migrate => {
            let index = QdrantIndex::new(&cfg.qdrant)?;
            let (report, _) = pipeline::migrate_latest(&index, &cfg.dataset_root)
                .await
                .context("migration failed")?;
            info!(
                "Migrated {} products from {} ({} stored, vocabulary {})",
                report.written, report.dataset_dir, report.stored, report.vocabulary_id
            );
        }
        Command::Query { product } => {
            validate_code(&product)?;
            let vocabulary = read_migrated_vocabulary(&cfg.dataset_root).with_context(|| {
                format!(
                    "cannot load the migrated vocabulary under {}",
                    cfg.dataset_root.display()
                )
            })?;

            let service = SimilarityService::new(
                vocabulary,
                Arc::new(OpenFoodFactsClient::from_config(cfg.catalog.clone())?),
                Arc::new(QdrantIndex::new(&cfg.qdrant)?),
                cfg.similarity.clone(),
            );
            let hits = service.find_similar(&product).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Command::Serve { address } => {
            let state = api::AppState::from_config(&cfg)?;
            api::start(state, &address).await?;
        }
    }

    Ok(())
}

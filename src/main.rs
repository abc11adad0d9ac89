//! Vantage - activity dashboard gateway

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vantage::{
    activity::ActivitySource,
    cache::{FileSlot, FreshnessCache},
    config::Args,
    db::{MongoActivitySource, MongoClient},
    server::{self, AppState},
    services::RecommenderClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("vantage={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Vantage - activity dashboard gateway");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db '{}')", args.mongodb_uri, args.mongodb_db);
    info!("Cache TTL: {}ms, dir {}", args.cache_ttl_ms, args.cache_dir.display());
    match args.recommender_url {
        Some(ref url) => info!("Recommender: {}", url),
        None => info!("Recommender: not configured"),
    }
    info!("======================================");

    // Connect to MongoDB (optional in dev mode)
    let source: Option<Arc<dyn ActivitySource>> =
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => match MongoActivitySource::new(&client).await {
                Ok(source) => {
                    info!("MongoDB connected, collections indexed");
                    Some(Arc::new(source))
                }
                Err(e) => {
                    error!("Failed to open collections: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, continuing without): {}", e);
                    None
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    // Persistent slot for the category summary cache
    let slot = FileSlot::new(args.cache_dir.clone())?;
    let category_cache = FreshnessCache::new(Box::new(slot), args.cache_ttl());

    let recommender = match args.recommender_url {
        Some(ref url) => Some(RecommenderClient::new(url.clone())?),
        None => None,
    };

    let state = Arc::new(AppState::new(args, source, category_cache, recommender));

    server::run(state).await?;

    Ok(())
}

//! One-shot schema setup for the cart store.
//!
//! Runs once per deployment: ensures the carts collection and its indexes
//! exist, then exits. Safe to re-run.

use anyhow::Context;
use cart_store::config::CartStoreConfig;
use cart_store::mongodb::MongoClient;
use cart_store::schema::{ensure_schema, MongoSchemaSink};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Parameters used to config the cart store.
#[derive(Debug, Clone, Parser)]
#[command(name = "cart-store", about = "Cart storage schema setup")]
struct CartStoreCliArgs {
    /// The connection string to the MongoDB server.
    #[arg(env = "CART_STORE_MONGODB_CONNECTION_URL", long, default_value = "mongodb://localhost:27017")]
    mongodb_connection_url: String,

    /// The name of the database.
    #[arg(env = "CART_STORE_DATABASE_NAME", long, default_value = "cartdb")]
    database_name: String,

    /// The name of the carts collection.
    #[arg(env = "CART_STORE_COLLECTION_NAME", long, default_value = "carts")]
    collection_name: String,

    /// Seconds after which abandoned carts expire.
    #[arg(env = "CART_STORE_ABANDONED_TTL_SECS", long, default_value_t = 2_592_000)]
    abandoned_ttl_secs: u64,
}

impl From<CartStoreCliArgs> for CartStoreConfig {
    fn from(args: CartStoreCliArgs) -> Self {
        Self {
            mongodb_uri: args.mongodb_connection_url,
            database_name: args.database_name,
            collection_name: args.collection_name,
            abandoned_ttl_secs: args.abandoned_ttl_secs,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config: CartStoreConfig = CartStoreCliArgs::parse().into();
    anyhow::ensure!(config.is_valid(), "Invalid cart store configuration");

    info!(database = %config.database_name, collection = %config.collection_name, "Setting up cart schema");

    let client = MongoClient::new(&config).await.context("Connecting to MongoDB")?;
    let sink = MongoSchemaSink::new(client.database().clone());
    let index_names = ensure_schema(&sink, &config).await.context("Ensuring cart schema")?;

    info!(indexes = ?index_names, "Cart schema setup complete");

    Ok(())
}

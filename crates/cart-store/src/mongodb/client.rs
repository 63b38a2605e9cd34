//! MongoDB connection management.

use crate::config::CartStoreConfig;
use crate::error::DatabaseError;
use crate::types::Cart;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Collection, Database};
use std::time::Duration;

/// MongoDB client wrapper for cart storage operations.
pub struct MongoClient {
    client: mongodb::Client,
    database: Database,
    collection_name: String,
}

impl MongoClient {
    /// Creates a new MongoDB client and verifies connectivity with a ping.
    pub async fn new(config: &CartStoreConfig) -> Result<Self, DatabaseError> {
        let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
        options.max_pool_size = Some(config.pool_size);
        options.min_pool_size = Some(config.min_pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        options.server_selection_timeout = Some(Duration::from_secs(config.server_selection_timeout_secs));

        let client = mongodb::Client::with_options(options)?;
        client.database("admin").run_command(doc! { "ping": 1 }, None).await?;

        let database = client.database(&config.database_name);

        Ok(Self { client, database, collection_name: config.collection_name.clone() })
    }

    /// The carts collection, typed.
    pub fn carts(&self) -> Collection<Cart> {
        self.database.collection(&self.collection_name)
    }

    /// Get a typed collection by name.
    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Mongodb client uses Arc internally, reducing the cost of clone.
    pub fn client(&self) -> mongodb::Client {
        self.client.clone()
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

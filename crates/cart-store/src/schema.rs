//! Schema setup for the carts collection.
//!
//! One-shot, idempotent: ensures the collection exists and that the index
//! set from [`crate::mongodb::indexes`] is in place. Expected to run on
//! every deployment; repeated runs are no-ops.

use crate::config::CartStoreConfig;
use crate::error::DatabaseError;
use crate::mongodb::indexes::get_index_models;
use mongodb::bson::Document;
use mongodb::error::ErrorKind;
use mongodb::{Database, IndexModel};
use std::time::Duration;
use tracing::{debug, info};

/// Storage operations the schema setup is written against.
#[async_trait::async_trait]
pub trait SchemaSink: Send + Sync {
    async fn collection_names(&self) -> Result<Vec<String>, DatabaseError>;
    async fn create_collection(&self, name: &str) -> Result<(), DatabaseError>;
    async fn create_indexes(&self, collection: &str, indexes: Vec<IndexModel>) -> Result<Vec<String>, DatabaseError>;
}

/// Schema sink backed by a MongoDB database handle.
pub struct MongoSchemaSink {
    database: Database,
}

impl MongoSchemaSink {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait::async_trait]
impl SchemaSink for MongoSchemaSink {
    async fn collection_names(&self) -> Result<Vec<String>, DatabaseError> {
        Ok(self.database.list_collection_names(None).await?)
    }

    async fn create_collection(&self, name: &str) -> Result<(), DatabaseError> {
        match self.database.create_collection(name, None).await {
            Ok(()) => Ok(()),
            // NamespaceExists: another run got there first.
            Err(err) if is_namespace_exists_error(&err) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn create_indexes(&self, collection: &str, indexes: Vec<IndexModel>) -> Result<Vec<String>, DatabaseError> {
        let result = self.database.collection::<Document>(collection).create_indexes(indexes, None).await?;
        Ok(result.index_names)
    }
}

fn is_namespace_exists_error(err: &mongodb::error::Error) -> bool {
    matches!(&*err.kind, ErrorKind::Command(command_error) if command_error.code == 48)
}

/// Ensures the carts collection and its four secondary indexes exist.
///
/// Collection creation is skipped when the collection is already present
/// (and tolerates a concurrent creation); `createIndexes` with identical
/// specs is a server-side no-op, so the index set never duplicates. An
/// incompatible pre-existing index with the same keys surfaces as the
/// server's conflict error.
pub async fn ensure_schema(sink: &dyn SchemaSink, config: &CartStoreConfig) -> Result<Vec<String>, DatabaseError> {
    let existing = sink.collection_names().await?;
    if existing.iter().any(|name| name == &config.collection_name) {
        debug!(collection = %config.collection_name, "Collection already exists");
    } else {
        sink.create_collection(&config.collection_name).await?;
        info!(collection = %config.collection_name, "Collection created");
    }

    let indexes = get_index_models(Duration::from_secs(config.abandoned_ttl_secs));
    let index_names = sink.create_indexes(&config.collection_name, indexes).await?;
    info!(indexes = ?index_names, "Cart indexes ensured");

    Ok(index_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;
    use std::sync::Mutex;

    struct FakeSink {
        collections: Mutex<Vec<String>>,
        create_collection_calls: Mutex<Vec<String>>,
        create_indexes_calls: Mutex<Vec<Vec<Document>>>,
    }

    impl FakeSink {
        fn new() -> Self {
            Self {
                collections: Mutex::new(Vec::new()),
                create_collection_calls: Mutex::new(Vec::new()),
                create_indexes_calls: Mutex::new(Vec::new()),
            }
        }
    }

    // Index names derived the way the server derives them: "field_direction"
    // segments joined with underscores.
    fn derive_index_name(keys: &Document) -> String {
        keys.iter()
            .map(|(field, direction)| match direction {
                Bson::Int32(direction) => format!("{}_{}", field, direction),
                other => format!("{}_{}", field, other),
            })
            .collect::<Vec<_>>()
            .join("_")
    }

    #[async_trait::async_trait]
    impl SchemaSink for FakeSink {
        async fn collection_names(&self) -> Result<Vec<String>, DatabaseError> {
            Ok(self.collections.lock().unwrap().clone())
        }

        async fn create_collection(&self, name: &str) -> Result<(), DatabaseError> {
            self.create_collection_calls.lock().unwrap().push(name.to_string());
            self.collections.lock().unwrap().push(name.to_string());
            Ok(())
        }

        async fn create_indexes(
            &self,
            _collection: &str,
            indexes: Vec<IndexModel>,
        ) -> Result<Vec<String>, DatabaseError> {
            let keys: Vec<Document> = indexes.iter().map(|model| model.keys.clone()).collect();
            let names = keys.iter().map(derive_index_name).collect();
            self.create_indexes_calls.lock().unwrap().push(keys);
            Ok(names)
        }
    }

    #[tokio::test]
    async fn first_run_creates_collection_and_four_indexes() {
        let sink = FakeSink::new();
        let config = CartStoreConfig::new("mongodb://localhost:27017".to_string());

        let index_names = ensure_schema(&sink, &config).await.unwrap();

        assert_eq!(*sink.create_collection_calls.lock().unwrap(), vec!["carts".to_string()]);
        assert_eq!(index_names.len(), 4);
        assert!(index_names.contains(&"userId_1".to_string()));
        assert!(index_names.contains(&"status_1_updatedAt_-1".to_string()));
        assert!(index_names.contains(&"items.productId_1".to_string()));
        assert!(index_names.contains(&"updatedAt_1".to_string()));
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let sink = FakeSink::new();
        let config = CartStoreConfig::new("mongodb://localhost:27017".to_string());

        ensure_schema(&sink, &config).await.unwrap();
        ensure_schema(&sink, &config).await.unwrap();

        // Collection only created once; the index request is byte-identical,
        // which the server treats as a no-op.
        assert_eq!(sink.create_collection_calls.lock().unwrap().len(), 1);
        let calls = sink.create_indexes_calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn ttl_follows_configured_retention() {
        let config = CartStoreConfig {
            abandoned_ttl_secs: 60,
            ..CartStoreConfig::new("mongodb://localhost:27017".to_string())
        };
        let models = get_index_models(Duration::from_secs(config.abandoned_ttl_secs));
        let ttl_options = models[3].options.as_ref().unwrap();
        assert_eq!(ttl_options.expire_after, Some(Duration::from_secs(60)));
    }
}

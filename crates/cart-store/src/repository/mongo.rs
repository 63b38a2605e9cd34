use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use opentelemetry::KeyValue;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use super::CartRepository;
use crate::error::DatabaseError;
use crate::metrics::CartStoreMetrics;
use crate::mongodb::{MongoClient, ToDocument};
use crate::types::{Cart, CartStatus, CartUpdates};

/// MongoDB-backed cart repository.
pub struct MongoCartRepository {
    client: Arc<MongoClient>,
    metrics: Arc<CartStoreMetrics>,
}

impl MongoCartRepository {
    pub fn new(client: Arc<MongoClient>, metrics: Arc<CartStoreMetrics>) -> Self {
        Self { client, metrics }
    }

    fn record_latency(&self, operation: &'static str, start: Instant) {
        let attributes = [KeyValue::new("db_operation_name", operation)];
        self.metrics.db_call_latency.record(start.elapsed().as_secs_f64(), &attributes);
    }

    async fn find_carts(&self, filter: Document, options: Option<FindOptions>) -> Result<Vec<Cart>, DatabaseError> {
        let cursor = self.client.carts().find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }
}

fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}

fn uuid_filter(id: Uuid) -> Document {
    doc! { "_id": bson::Uuid::from_uuid_1(id) }
}

#[async_trait]
impl CartRepository for MongoCartRepository {
    async fn create_cart(&self, cart: Cart) -> Result<Cart, DatabaseError> {
        let start = Instant::now();

        match self.client.carts().insert_one(&cart, None).await {
            Ok(_) => {
                debug!(cart_id = %cart.id, user_id = %cart.user_id, "Cart created");
                self.metrics.carts_written.add(1, &[]);
                self.record_latency("create_cart", start);
                Ok(cart)
            }
            Err(err) if is_duplicate_key_error(&err) => {
                self.metrics.storage_errors.add(1, &[]);
                Err(DatabaseError::ItemAlreadyExists(format!("Cart already exists with id {}", cart.id)))
            }
            Err(err) => {
                self.metrics.storage_errors.add(1, &[]);
                Err(DatabaseError::InsertFailed(format!("Failed to insert cart {}: {}", cart.id, err)))
            }
        }
    }

    async fn get_cart(&self, id: Uuid) -> Result<Option<Cart>, DatabaseError> {
        let start = Instant::now();
        let cart = self.client.carts().find_one(uuid_filter(id), None).await?;
        self.record_latency("get_cart", start);
        Ok(cart)
    }

    async fn get_carts_by_user(&self, user_id: &str) -> Result<Vec<Cart>, DatabaseError> {
        let start = Instant::now();
        let carts = self.find_carts(doc! { "userId": user_id }, None).await?;
        debug!(user_id = %user_id, cart_count = carts.len(), "Fetched carts by user");
        self.record_latency("get_carts_by_user", start);
        Ok(carts)
    }

    async fn get_cart_by_user_and_status(
        &self,
        user_id: &str,
        status: CartStatus,
    ) -> Result<Option<Cart>, DatabaseError> {
        let start = Instant::now();
        let filter = doc! {
            "userId": user_id,
            "status": bson::to_bson(&status)?,
        };
        let cart = self.client.carts().find_one(filter, None).await?;
        self.record_latency("get_cart_by_user_and_status", start);
        Ok(cart)
    }

    async fn get_carts_by_status(&self, status: CartStatus, limit: Option<i64>) -> Result<Vec<Cart>, DatabaseError> {
        let start = Instant::now();
        let filter = doc! { "status": bson::to_bson(&status)? };
        // Served by the { status, updatedAt } compound index.
        let find_options = FindOptions::builder().sort(doc! { "updatedAt": -1 }).limit(limit).build();

        let carts = self.find_carts(filter, Some(find_options)).await?;
        debug!(status = %status, cart_count = carts.len(), "Fetched carts by status");
        self.record_latency("get_carts_by_status", start);
        Ok(carts)
    }

    async fn get_carts_containing_product(&self, product_id: &str) -> Result<Vec<Cart>, DatabaseError> {
        let start = Instant::now();
        let carts = self.find_carts(doc! { "items.productId": product_id }, None).await?;
        debug!(product_id = %product_id, cart_count = carts.len(), "Fetched carts containing product");
        self.record_latency("get_carts_containing_product", start);
        Ok(carts)
    }

    async fn get_abandoned_before(&self, threshold: DateTime<Utc>) -> Result<Vec<Cart>, DatabaseError> {
        let start = Instant::now();
        let filter = doc! {
            "status": bson::to_bson(&CartStatus::Abandoned)?,
            "updatedAt": { "$lt": Bson::DateTime(threshold.into()) },
        };

        let carts = self.find_carts(filter, None).await?;
        debug!(threshold = %threshold, cart_count = carts.len(), "Fetched abandoned carts");
        self.record_latency("get_abandoned_before", start);
        Ok(carts)
    }

    async fn update_cart(&self, current_cart: &Cart, update: CartUpdates) -> Result<Cart, DatabaseError> {
        let start = Instant::now();
        let filter = uuid_filter(current_cart.id);
        let options = FindOneAndUpdateOptions::builder().upsert(false).return_document(ReturnDocument::After).build();

        let updates = update.to_document()?;

        // remove null values from the updates
        let mut non_null_updates = Document::new();
        updates.iter().for_each(|(key, value)| {
            if value != &Bson::Null {
                non_null_updates.insert(key.clone(), value.clone());
            }
        });

        // throw an error if there's no field to be updated
        if non_null_updates.is_empty() {
            return Err(DatabaseError::NoUpdateFound("No field to be updated, likely a false call".to_string()));
        }

        // updatedAt is always stamped; it drives the recency ordering and the TTL
        non_null_updates.insert("updatedAt", Bson::DateTime(Utc::now().round_subsecs(0).into()));

        let update = doc! { "$set": non_null_updates };

        let result = self.client.carts().find_one_and_update(filter, update, options).await?;
        match result {
            Some(cart) => {
                debug!(cart_id = %cart.id, "Cart updated");
                self.metrics.carts_written.add(1, &[]);
                self.record_latency("update_cart", start);
                Ok(cart)
            }
            None => {
                warn!(cart_id = %current_cart.id, "Failed to update cart, not found");
                Err(DatabaseError::UpdateFailed(format!("Failed to update cart. Identifier - {}", current_cart.id)))
            }
        }
    }

    async fn delete_cart(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let start = Instant::now();
        let result = self.client.carts().delete_one(uuid_filter(id), None).await?;

        debug!(cart_id = %id, deleted_count = result.deleted_count, "Cart deletion attempted");
        self.metrics.carts_deleted.add(result.deleted_count, &[]);
        self.record_latency("delete_cart", start);
        Ok(result.deleted_count > 0)
    }
}

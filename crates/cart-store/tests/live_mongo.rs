//! Integration tests against a live MongoDB instance.
//!
//! Ignored by default; run with a local server via
//! `MONGODB_URI=mongodb://localhost:27017 cargo test -- --ignored`.

use bigdecimal::BigDecimal;
use cart_store::config::CartStoreConfig;
use cart_store::error::DatabaseError;
use cart_store::metrics::CartStoreMetrics;
use cart_store::mongodb::MongoClient;
use cart_store::repository::{CartRepository, MongoCartRepository};
use cart_store::schema::{ensure_schema, MongoSchemaSink};
use cart_store::types::{Cart, CartItem, CartStatus, CartUpdates};
use futures::TryStreamExt;
use mongodb::bson::doc;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn test_config() -> CartStoreConfig {
    let uri = env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    // Unique database per run so parallel test runs cannot collide.
    CartStoreConfig { database_name: format!("cartdb_test_{}", Uuid::new_v4().simple()), ..CartStoreConfig::new(uri) }
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn schema_setup_is_idempotent() {
    let config = test_config();
    let client = MongoClient::new(&config).await.unwrap();
    let sink = MongoSchemaSink::new(client.database().clone());

    ensure_schema(&sink, &config).await.unwrap();
    ensure_schema(&sink, &config).await.unwrap();

    // _id plus the four secondary indexes, no duplicates after the rerun.
    let names = client.carts().list_index_names().await.unwrap();
    assert_eq!(names.len(), 5);

    let indexes: Vec<_> = client.carts().list_indexes(None).await.unwrap().try_collect().await.unwrap();
    let ttl = indexes
        .iter()
        .find(|model| model.options.as_ref().and_then(|options| options.name.as_deref()) == Some("updatedAt_1"))
        .expect("TTL index missing");
    let options = ttl.options.as_ref().unwrap();
    assert_eq!(options.expire_after, Some(Duration::from_secs(2_592_000)));
    assert_eq!(options.partial_filter_expression, Some(doc! { "status": "ABANDONED" }));

    client.database().drop(None).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn repository_round_trip() {
    let config = test_config();
    let client = Arc::new(MongoClient::new(&config).await.unwrap());
    let sink = MongoSchemaSink::new(client.database().clone());
    ensure_schema(&sink, &config).await.unwrap();

    let repository = MongoCartRepository::new(client.clone(), Arc::new(CartStoreMetrics::register()));

    let mut cart = Cart::create("user-42".to_string(), Some("groceries".to_string()));
    cart.add_item(CartItem::new("p1".to_string(), "Product One".to_string(), 2, BigDecimal::from(10u32)));

    let created = repository.create_cart(cart.clone()).await.unwrap();
    assert_eq!(created, cart);

    let duplicate = repository.create_cart(cart.clone()).await;
    assert!(matches!(duplicate, Err(DatabaseError::ItemAlreadyExists(_))));

    let fetched = repository.get_cart(cart.id).await.unwrap().unwrap();
    assert_eq!(fetched, cart);

    let by_user = repository.get_carts_by_user("user-42").await.unwrap();
    assert_eq!(by_user.len(), 1);

    let containing = repository.get_carts_containing_product("p1").await.unwrap();
    assert_eq!(containing.len(), 1);

    let abandoned = repository
        .update_cart(&fetched, CartUpdates::new().update_status(CartStatus::Abandoned))
        .await
        .unwrap();
    assert_eq!(abandoned.status, CartStatus::Abandoned);
    assert!(abandoned.updated_at >= fetched.updated_at);

    let eligible = repository.get_abandoned_before(chrono::Utc::now() + chrono::Duration::days(1)).await.unwrap();
    assert!(eligible.iter().any(|candidate| candidate.id == cart.id));

    let recent = repository.get_carts_by_status(CartStatus::Abandoned, Some(10)).await.unwrap();
    assert_eq!(recent.len(), 1);

    assert!(repository.delete_cart(cart.id).await.unwrap());
    assert!(!repository.delete_cart(cart.id).await.unwrap());

    client.database().drop(None).await.unwrap();
}

use crate::types::CartStatus;
use mongodb::bson;
use uuid::Uuid;

/// Errors surfaced by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("MongoDB error: {0:#}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("BSON serialization error: {0}")]
    BsonSerError(#[from] bson::ser::Error),

    #[error("BSON deserialization error: {0}")]
    BsonDeError(#[from] bson::de::Error),

    #[error("Failed to serialize document: {0}")]
    FailedToSerializeDocument(String),

    #[error("Item already exists: {0}")]
    ItemAlreadyExists(String),

    #[error("Failed to insert item: {0}")]
    InsertFailed(String),

    #[error("Failed to update item: {0}")]
    UpdateFailed(String),

    #[error("No update found: {0}")]
    NoUpdateFound(String),
}

/// Errors surfaced by cart domain operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Cart not found: {0}")]
    CartNotFound(Uuid),

    #[error("Cart {id} cannot transition from {from} to {to}")]
    InvalidStateTransition { id: Uuid, from: CartStatus, to: CartStatus },

    #[error("Cart {id} is not active (status: {status})")]
    CartNotActive { id: Uuid, status: CartStatus },

    #[error("No item for product {product_id} in cart {cart_id}")]
    ItemNotFound { cart_id: Uuid, product_id: String },

    #[error("Cart {0} has no items")]
    EmptyCart(Uuid),

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(u32),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub mod mongo;

pub use mongo::MongoCartRepository;

use crate::error::DatabaseError;
use crate::types::{Cart, CartStatus, CartUpdates};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Trait defining cart storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// create_cart - Insert a new cart in the collection
    async fn create_cart(&self, cart: Cart) -> Result<Cart, DatabaseError>;

    /// get_cart - Get a cart by its ID
    async fn get_cart(&self, id: Uuid) -> Result<Option<Cart>, DatabaseError>;

    /// get_carts_by_user - Get all carts belonging to a user
    async fn get_carts_by_user(&self, user_id: &str) -> Result<Vec<Cart>, DatabaseError>;

    /// get_cart_by_user_and_status - Get a user's cart in a given status
    async fn get_cart_by_user_and_status(
        &self,
        user_id: &str,
        status: CartStatus,
    ) -> Result<Option<Cart>, DatabaseError>;

    /// get_carts_by_status - Get carts in a status, most recently updated first
    async fn get_carts_by_status(&self, status: CartStatus, limit: Option<i64>) -> Result<Vec<Cart>, DatabaseError>;

    /// get_carts_containing_product - Get carts holding a line item for a product
    async fn get_carts_containing_product(&self, product_id: &str) -> Result<Vec<Cart>, DatabaseError>;

    /// get_abandoned_before - Get abandoned carts last updated before `threshold`
    async fn get_abandoned_before(&self, threshold: DateTime<Utc>) -> Result<Vec<Cart>, DatabaseError>;

    /// update_cart - Apply updates to a cart; `updatedAt` is always stamped
    async fn update_cart(&self, current_cart: &Cart, update: CartUpdates) -> Result<Cart, DatabaseError>;

    /// delete_cart - Delete a cart; returns whether a document was removed
    async fn delete_cart(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

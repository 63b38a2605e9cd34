//! Cart domain operations over the repository.
//!
//! Status rules live here: mutating operations require an active cart,
//! checkout and completion require a non-empty one, and a completed
//! purchase can never be abandoned.

use crate::error::CartError;
use crate::repository::CartRepository;
use crate::types::{Cart, CartItem, CartStatus, CartUpdates};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct CartService {
    repository: Arc<dyn CartRepository>,
}

impl CartService {
    pub fn new(repository: Arc<dyn CartRepository>) -> Self {
        Self { repository }
    }

    /// Creates a new active cart for a user.
    pub async fn create_cart(&self, user_id: String, description: Option<String>) -> Result<Cart, CartError> {
        let cart = self.repository.create_cart(Cart::create(user_id, description)).await?;
        info!(cart_id = %cart.id, user_id = %cart.user_id, "Cart created");
        Ok(cart)
    }

    pub async fn get_cart(&self, id: Uuid) -> Result<Cart, CartError> {
        self.repository.get_cart(id).await?.ok_or(CartError::CartNotFound(id))
    }

    pub async fn get_carts_by_user(&self, user_id: &str) -> Result<Vec<Cart>, CartError> {
        Ok(self.repository.get_carts_by_user(user_id).await?)
    }

    pub async fn get_carts_by_status(&self, status: CartStatus, limit: Option<i64>) -> Result<Vec<Cart>, CartError> {
        Ok(self.repository.get_carts_by_status(status, limit).await?)
    }

    pub async fn get_carts_containing_product(&self, product_id: &str) -> Result<Vec<Cart>, CartError> {
        Ok(self.repository.get_carts_containing_product(product_id).await?)
    }

    pub async fn get_abandoned_before(&self, threshold: DateTime<Utc>) -> Result<Vec<Cart>, CartError> {
        Ok(self.repository.get_abandoned_before(threshold).await?)
    }

    /// Adds a line item to an active cart.
    pub async fn add_item(&self, cart_id: Uuid, item: CartItem) -> Result<Cart, CartError> {
        let mut cart = self.active_cart(cart_id).await?;
        cart.add_item(item);

        let updated = self.repository.update_cart(&cart, CartUpdates::from_cart_items(&cart)).await?;
        debug!(cart_id = %cart_id, "Item added to cart");
        Ok(updated)
    }

    /// Removes a line item from an active cart. Removing an absent item is a
    /// no-op, matching the collection semantics of the cart itself.
    pub async fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<Cart, CartError> {
        let mut cart = self.active_cart(cart_id).await?;
        cart.remove_item(item_id);

        let updated = self.repository.update_cart(&cart, CartUpdates::from_cart_items(&cart)).await?;
        debug!(cart_id = %cart_id, item_id = %item_id, "Item removed from cart");
        Ok(updated)
    }

    /// Sets the quantity of the line item for `product_id`.
    pub async fn update_item_quantity(
        &self,
        cart_id: Uuid,
        product_id: &str,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let mut cart = self.active_cart(cart_id).await?;
        if !cart.update_item_quantity(product_id, quantity) {
            return Err(CartError::ItemNotFound { cart_id, product_id: product_id.to_string() });
        }

        let updated = self.repository.update_cart(&cart, CartUpdates::from_cart_items(&cart)).await?;
        debug!(cart_id = %cart_id, product_id = %product_id, quantity, "Item quantity updated");
        Ok(updated)
    }

    /// Applies a promo code with its computed discount to an active cart.
    pub async fn apply_promo_code(
        &self,
        cart_id: Uuid,
        promo_code: String,
        discount: bigdecimal::BigDecimal,
    ) -> Result<Cart, CartError> {
        let mut cart = self.active_cart(cart_id).await?;
        cart.apply_promo_code(promo_code.clone(), discount);

        let updated = self.repository.update_cart(&cart, CartUpdates::from_cart_items(&cart)).await?;
        info!(cart_id = %cart_id, promo_code = %promo_code, "Promo code applied");
        Ok(updated)
    }

    /// Starts checkout: ACTIVE -> CHECKOUT_IN_PROGRESS. Empty carts are rejected.
    pub async fn checkout(&self, cart_id: Uuid) -> Result<Cart, CartError> {
        let cart = self.get_cart(cart_id).await?;
        self.ensure_transition(&cart, CartStatus::CheckoutInProgress)?;
        if cart.items.is_empty() {
            return Err(CartError::EmptyCart(cart_id));
        }

        let updated =
            self.repository.update_cart(&cart, CartUpdates::new().update_status(CartStatus::CheckoutInProgress)).await?;
        info!(cart_id = %cart_id, "Checkout started");
        Ok(updated)
    }

    /// Completes the purchase: ACTIVE -> COMPLETED, stamping `completedAt`.
    pub async fn complete(&self, cart_id: Uuid) -> Result<Cart, CartError> {
        let cart = self.get_cart(cart_id).await?;
        self.ensure_transition(&cart, CartStatus::Completed)?;
        if cart.items.is_empty() {
            return Err(CartError::EmptyCart(cart_id));
        }

        let updates = CartUpdates::new()
            .update_status(CartStatus::Completed)
            .update_completed_at(Utc::now().round_subsecs(0));
        let updated = self.repository.update_cart(&cart, updates).await?;
        info!(cart_id = %cart_id, "Cart completed");
        Ok(updated)
    }

    /// Abandons a cart. The TTL index purges it 30 days after this update.
    pub async fn abandon(&self, cart_id: Uuid) -> Result<Cart, CartError> {
        let cart = self.get_cart(cart_id).await?;
        self.ensure_transition(&cart, CartStatus::Abandoned)?;

        let updated = self.repository.update_cart(&cart, CartUpdates::new().update_status(CartStatus::Abandoned)).await?;
        info!(cart_id = %cart_id, "Cart abandoned");
        Ok(updated)
    }

    pub async fn delete_cart(&self, id: Uuid) -> Result<(), CartError> {
        if self.repository.delete_cart(id).await? {
            info!(cart_id = %id, "Cart deleted");
            Ok(())
        } else {
            Err(CartError::CartNotFound(id))
        }
    }

    async fn active_cart(&self, id: Uuid) -> Result<Cart, CartError> {
        let cart = self.get_cart(id).await?;
        if cart.status != CartStatus::Active {
            return Err(CartError::CartNotActive { id, status: cart.status });
        }
        Ok(cart)
    }

    fn ensure_transition(&self, cart: &Cart, next: CartStatus) -> Result<(), CartError> {
        if cart.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(CartError::InvalidStateTransition { id: cart.id, from: cart.status, to: next })
        }
    }
}

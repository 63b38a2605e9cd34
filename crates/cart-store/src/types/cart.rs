use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::serde_helpers::{chrono_datetime_as_bson_datetime, uuid_1_as_binary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::optional_chrono_datetime_as_bson_datetime;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CartStatus {
    /// Cart is open and items can be added to it
    #[default]
    Active,
    /// Checkout has started and the cart is frozen
    CheckoutInProgress,
    /// Purchase completed, the cart is immutable
    Completed,
    /// Cart was given up; the TTL index purges these 30 days after the last update
    Abandoned,
}

impl CartStatus {
    /// Whether a cart in this status may move to `next`.
    ///
    /// Completion and checkout both require an active cart; abandonment is
    /// allowed from any state except a completed purchase.
    pub fn can_transition_to(self, next: CartStatus) -> bool {
        match (self, next) {
            (CartStatus::Active, CartStatus::CheckoutInProgress) => true,
            (CartStatus::Active, CartStatus::Completed) => true,
            (from, CartStatus::Abandoned) => from != CartStatus::Completed,
            _ => false,
        }
    }
}

/// A single line item in a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line-item identifier, assigned when the item is added to a cart
    #[serde(with = "uuid_1_as_binary")]
    pub id: Uuid,
    /// Identifier of the product in the catalog
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: BigDecimal,
    pub image_url: Option<String>,
}

impl CartItem {
    pub fn new(product_id: String, product_name: String, quantity: u32, unit_price: BigDecimal) -> Self {
        Self { id: Uuid::new_v4(), product_id, product_name, quantity, unit_price, image_url: None }
    }

    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// A shopping cart document.
///
/// Wire field names are camelCase; `userId`, `status`, `updatedAt` and
/// `items.productId` are the fields the collection's indexes are built on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Unique identifier for the cart
    #[serde(rename = "_id", with = "uuid_1_as_binary")]
    pub id: Uuid,
    /// Identifier of the owning user
    pub user_id: String,
    pub description: Option<String>,
    /// Lifecycle status of the cart
    pub status: CartStatus,
    /// Timestamp when the cart was created
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last modification; drives the abandoned-cart TTL
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    /// Sum of item subtotals minus any discount
    pub total_amount: BigDecimal,
    pub items: Vec<CartItem>,
    pub promo_code: Option<String>,
    pub discount_amount: Option<BigDecimal>,
    /// Timestamp when the purchase was completed
    #[serde(default, with = "optional_chrono_datetime_as_bson_datetime")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Creates a new active cart for a user.
    pub fn create(user_id: String, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            description,
            status: CartStatus::Active,
            created_at: Utc::now().round_subsecs(0),
            updated_at: Utc::now().round_subsecs(0),
            total_amount: BigDecimal::zero(),
            items: Vec::new(),
            promo_code: None,
            discount_amount: None,
            completed_at: None,
        }
    }

    /// Adds a line item, assigning it a fresh id.
    pub fn add_item(&mut self, mut item: CartItem) {
        item.id = Uuid::new_v4();
        self.items.push(item);
        self.recalculate_total();
    }

    /// Removes a line item by its id.
    pub fn remove_item(&mut self, item_id: Uuid) {
        self.items.retain(|item| item.id != item_id);
        self.recalculate_total();
    }

    /// Sets the quantity of the line item carrying `product_id`.
    /// Returns false when no such item exists.
    pub fn update_item_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        match self.items.iter_mut().find(|item| item.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                self.recalculate_total();
                true
            }
            None => false,
        }
    }

    /// Recomputes `total_amount` from item subtotals and the discount, and
    /// stamps `updated_at`. The total never goes below zero.
    pub fn recalculate_total(&mut self) {
        let mut total = self.items.iter().map(CartItem::subtotal).fold(BigDecimal::zero(), |acc, subtotal| acc + subtotal);

        if let Some(discount) = &self.discount_amount {
            if discount > &BigDecimal::zero() {
                total = total - discount;
            }
        }

        if total < BigDecimal::zero() {
            total = BigDecimal::zero();
        }

        self.total_amount = total;
        self.updated_at = Utc::now().round_subsecs(0);
    }

    /// Applies a promo code with its computed discount.
    pub fn apply_promo_code(&mut self, promo_code: String, discount: BigDecimal) {
        self.promo_code = Some(promo_code);
        self.discount_amount = Some(discount);
        self.recalculate_total();
    }

    pub fn find_item(&self, item_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

/// Changes to be applied to a stored cart.
///
/// `id` and `createdAt` are never updatable; `updatedAt` is stamped by the
/// repository on every update.
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdates {
    pub status: Option<CartStatus>,
    pub items: Option<Vec<CartItem>>,
    pub total_amount: Option<BigDecimal>,
    pub promo_code: Option<String>,
    pub discount_amount: Option<BigDecimal>,
    #[serde(with = "optional_chrono_datetime_as_bson_datetime")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CartUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_status(mut self, status: CartStatus) -> CartUpdates {
        self.status = Some(status);
        self
    }

    pub fn update_items(mut self, items: Vec<CartItem>) -> CartUpdates {
        self.items = Some(items);
        self
    }

    pub fn update_total_amount(mut self, total_amount: BigDecimal) -> CartUpdates {
        self.total_amount = Some(total_amount);
        self
    }

    pub fn update_promo_code(mut self, promo_code: String) -> CartUpdates {
        self.promo_code = Some(promo_code);
        self
    }

    pub fn update_discount_amount(mut self, discount_amount: BigDecimal) -> CartUpdates {
        self.discount_amount = Some(discount_amount);
        self
    }

    pub fn update_completed_at(mut self, completed_at: DateTime<Utc>) -> CartUpdates {
        self.completed_at = Some(completed_at);
        self
    }

    /// Snapshot of the mutable item state of `cart`, for persisting a cart
    /// that was mutated in memory.
    pub fn from_cart_items(cart: &Cart) -> CartUpdates {
        let mut updates = CartUpdates::new().update_items(cart.items.clone()).update_total_amount(cart.total_amount.clone());
        if let Some(promo_code) = &cart.promo_code {
            updates = updates.update_promo_code(promo_code.clone());
        }
        if let Some(discount) = &cart.discount_amount {
            updates = updates.update_discount_amount(discount.clone());
        }
        updates
    }
}

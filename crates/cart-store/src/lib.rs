//! Cart Storage Service
//!
//! This crate provides MongoDB-backed storage for shopping carts: the typed
//! document model, the repository operations the service layer is built on,
//! and the schema setup that prepares the collection's access paths.
//!
//! ## Architecture
//!
//! Schema setup runs once on startup (or via the `cart-store` binary as a
//! deployment step) and is idempotent: it ensures the `carts` collection
//! exists and that its four secondary indexes are in place, including the
//! TTL index that lets the server purge abandoned carts 30 days after their
//! last update.
//!
//! ## Key Features
//!
//! - **Query Patterns**: Lookup by user, by status ordered by recency, and
//!   by contained product, each backed by a dedicated index
//! - **Retention**: Carts in the ABANDONED state expire server-side via a
//!   partial TTL index on `updatedAt`
//! - **Lifecycle Tracking**: Status transitions (active, checked out,
//!   completed, abandoned) are enforced in the service layer

pub mod config;
pub mod error;
pub mod metrics;
pub mod mongodb;
pub mod repository;
pub mod schema;
pub mod service;
pub mod types;

pub use config::CartStoreConfig;
pub use error::{CartError, DatabaseError};
pub use service::CartService;

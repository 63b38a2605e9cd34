//! MongoDB index definitions.
//!
//! Index definitions for the carts collection. These indexes are created on
//! service startup to optimize query patterns and enforce retention.
//!
//! Indexes:
//! - `{ "_id": 1 }` - Primary key (automatic)
//! - `{ "userId": 1 }` - For lookup of all carts of a user
//! - `{ "status": 1, "updatedAt": -1 }` - For status queries with recency ordering
//! - `{ "items.productId": 1 }` - For lookup of carts containing a product
//! - `{ "updatedAt": 1 }` - TTL, partial on `{ "status": "ABANDONED" }`:
//!   abandoned carts are purged `expireAfterSeconds` after their last update

use mongodb::{bson::doc, options::IndexOptions, IndexModel};
use std::time::Duration;

/// Wire value of the status the TTL index is restricted to.
pub const ABANDONED_STATUS: &str = "ABANDONED";

pub fn get_index_models(abandoned_ttl: Duration) -> Vec<IndexModel> {
    vec![
        IndexModel::builder().keys(doc! { "userId": 1 }).build(),
        IndexModel::builder().keys(doc! { "status": 1, "updatedAt": -1 }).build(),
        IndexModel::builder().keys(doc! { "items.productId": 1 }).build(),
        IndexModel::builder()
            .keys(doc! { "updatedAt": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(abandoned_ttl)
                    .partial_filter_expression(doc! { "status": ABANDONED_STATUS })
                    .build(),
            )
            .build(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CartStatus;
    use mongodb::bson::{self, Bson};

    #[test]
    fn four_indexes_with_expected_keys() {
        let models = get_index_models(Duration::from_secs(2_592_000));
        assert_eq!(models.len(), 4);

        assert_eq!(models[0].keys, doc! { "userId": 1 });
        assert_eq!(models[1].keys, doc! { "status": 1, "updatedAt": -1 });
        assert_eq!(models[2].keys, doc! { "items.productId": 1 });
        assert_eq!(models[3].keys, doc! { "updatedAt": 1 });

        // Only the TTL index carries options.
        assert!(models[0].options.is_none());
        assert!(models[1].options.is_none());
        assert!(models[2].options.is_none());
    }

    #[test]
    fn ttl_index_expires_abandoned_carts_only() {
        let models = get_index_models(Duration::from_secs(2_592_000));
        let options = models[3].options.as_ref().unwrap();

        assert_eq!(options.expire_after, Some(Duration::from_secs(2_592_000)));
        assert_eq!(options.partial_filter_expression, Some(doc! { "status": "ABANDONED" }));
    }

    #[test]
    fn partial_filter_matches_status_wire_format() {
        assert_eq!(bson::to_bson(&CartStatus::Abandoned).unwrap(), Bson::String(ABANDONED_STATUS.to_string()));
    }
}

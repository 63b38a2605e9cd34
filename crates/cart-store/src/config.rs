//! Configuration for the cart storage service.

use serde::{Deserialize, Serialize};

fn default_database_name() -> String {
    "cartdb".to_string()
}

fn default_collection_name() -> String {
    "carts".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_min_pool_size() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_server_selection_timeout_secs() -> u64 {
    10
}

fn default_abandoned_ttl_secs() -> u64 {
    2_592_000 // 30 days
}

/// Configuration for the cart store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CartStoreConfig {
    /// MongoDB connection URI
    /// Example: "mongodb://localhost:27017"
    pub mongodb_uri: String,

    /// Database name
    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Collection name for cart documents
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Minimum connection pool size
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: u32,

    /// MongoDB connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// MongoDB server selection timeout in seconds
    #[serde(default = "default_server_selection_timeout_secs")]
    pub server_selection_timeout_secs: u64,

    /// Retention: abandoned carts expire N seconds after their last update
    #[serde(default = "default_abandoned_ttl_secs")]
    pub abandoned_ttl_secs: u64,
}

impl Default for CartStoreConfig {
    fn default() -> Self {
        Self {
            mongodb_uri: String::new(),
            database_name: default_database_name(),
            collection_name: default_collection_name(),
            pool_size: default_pool_size(),
            min_pool_size: default_min_pool_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
            server_selection_timeout_secs: default_server_selection_timeout_secs(),
            abandoned_ttl_secs: default_abandoned_ttl_secs(),
        }
    }
}

impl CartStoreConfig {
    /// Creates a new config with the given MongoDB URI.
    pub fn new(mongodb_uri: String) -> Self {
        Self { mongodb_uri, ..Default::default() }
    }

    /// Returns true if the config is valid for starting the service.
    pub fn is_valid(&self) -> bool {
        !self.mongodb_uri.is_empty() && self.abandoned_ttl_secs > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CartStoreConfig::default();
        assert!(config.mongodb_uri.is_empty());
        assert_eq!(config.database_name, "cartdb");
        assert_eq!(config.collection_name, "carts");
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.min_pool_size, 1);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.server_selection_timeout_secs, 10);
        assert_eq!(config.abandoned_ttl_secs, 2_592_000);
    }

    #[test]
    fn test_is_valid() {
        let config = CartStoreConfig::default();
        assert!(!config.is_valid());

        let config = CartStoreConfig::new("mongodb://localhost:27017".to_string());
        assert!(config.is_valid());

        let config =
            CartStoreConfig { abandoned_ttl_secs: 0, ..CartStoreConfig::new("mongodb://localhost:27017".to_string()) };
        assert!(!config.is_valid());
    }
}

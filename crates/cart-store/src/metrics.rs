//! OpenTelemetry metrics for cart storage operations.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Metrics for cart storage operations.
pub struct CartStoreMetrics {
    /// Total carts written (created or updated)
    pub carts_written: Counter<u64>,

    /// Carts deleted explicitly (TTL expiry happens server-side)
    pub carts_deleted: Counter<u64>,

    /// MongoDB connection/operation errors
    pub storage_errors: Counter<u64>,

    /// Database call latency histogram (seconds)
    pub db_call_latency: Histogram<f64>,
}

impl CartStoreMetrics {
    /// Register metrics with the global meter provider.
    pub fn register() -> Self {
        let meter = opentelemetry::global::meter("cart_store");
        Self::register_with_meter(&meter)
    }

    /// Register metrics with a specific meter (useful for testing).
    pub fn register_with_meter(meter: &Meter) -> Self {
        Self {
            carts_written: meter
                .u64_counter("cart_store_carts_written")
                .with_description("Total carts written to storage")
                .init(),
            carts_deleted: meter
                .u64_counter("cart_store_carts_deleted")
                .with_description("Carts deleted explicitly")
                .init(),
            storage_errors: meter
                .u64_counter("cart_store_storage_errors")
                .with_description("MongoDB connection/operation errors")
                .init(),
            db_call_latency: meter
                .f64_histogram("cart_store_db_call_latency_seconds")
                .with_description("Database call latency in seconds")
                .init(),
        }
    }
}

pub mod db;
pub mod domain;
pub mod forms;
pub mod models;
pub mod rates;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

/// Grams in one troy ounce; spot feeds quote bullion per troy ounce.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

/// GST percentage applied when a product does not carry its own rate.
pub const DEFAULT_TAX_PERCENT: f64 = 3.0;

/// Maximum age of the spot-price table before a pricing query re-fetches rates.
pub const DEFAULT_SPOT_MAX_AGE_DAYS: i64 = 4;

/// Maximum age of a cached product price before the sweeper recomputes it.
pub const DEFAULT_PRICE_REFRESH_HOURS: i64 = 4;

/// Upper bound on products recomputed in one sweep run.
pub const DEFAULT_SWEEP_BATCH_SIZE: i64 = 100;

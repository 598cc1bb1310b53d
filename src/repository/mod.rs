use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool};
use crate::domain::metal::Metal;
use crate::domain::product::{NewProduct, Product};
use crate::domain::spot_price::{NewSpotPrice, SpotPrice};

pub mod errors;
pub mod product;
pub mod spot_price;

#[cfg(test)]
pub mod mock;

use errors::RepositoryResult;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[derive(Debug, Clone, Default)]
/// Query definition used to list catalog products.
pub struct ProductListQuery {
    /// Whether inactive products should be included in the results.
    pub include_inactive: bool,
}

impl ProductListQuery {
    /// Construct a query over active, non-deleted products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include inactive products in the results.
    pub fn include_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }
}

/// Read-only operations over stored spot prices.
pub trait SpotPriceReader {
    fn get_spot_price(&self, metal: Metal, purity: &str) -> RepositoryResult<Option<SpotPrice>>;
    fn list_spot_prices(&self) -> RepositoryResult<Vec<SpotPrice>>;
    /// Max `updated_at` across all rows; `None` when the store is empty.
    fn latest_spot_update(&self) -> RepositoryResult<Option<NaiveDateTime>>;
}

/// Write operations over stored spot prices.
pub trait SpotPriceWriter {
    /// Insert or overwrite the row for (metal, purity), computing the change
    /// figures against the prior stored value (0 when there is none).
    fn upsert_spot_price(&self, new_price: &NewSpotPrice) -> RepositoryResult<SpotPrice>;
}

/// Read-only operations over catalog products.
pub trait ProductReader {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Active, non-deleted products whose cached price is missing or older
    /// than `threshold`, oldest first, capped at `limit`.
    fn list_stale_products(
        &self,
        threshold: NaiveDateTime,
        limit: i64,
    ) -> RepositoryResult<Vec<Product>>;
    fn count_stale_products(&self, threshold: NaiveDateTime) -> RepositoryResult<usize>;
}

/// Write operations over catalog products.
pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    /// Store a computed base price and stamp `latest_price_update`.
    fn set_product_price(
        &self,
        product_id: i32,
        total_price: f64,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<()>;
    /// Store a computed variant price and stamp the parent product's
    /// `latest_price_update`.
    fn set_variant_price(
        &self,
        product_id: i32,
        variant_id: i32,
        total_price: f64,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<()>;
}

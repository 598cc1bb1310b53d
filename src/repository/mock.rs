use chrono::NaiveDateTime;
use mockall::mock;

use super::{
    ProductListQuery, ProductReader, ProductWriter, SpotPriceReader, SpotPriceWriter,
};
use crate::domain::metal::Metal;
use crate::domain::product::{NewProduct, Product};
use crate::domain::spot_price::{NewSpotPrice, SpotPrice};
use crate::repository::errors::RepositoryResult;

mock! {
    pub SpotPriceReader {}

    impl SpotPriceReader for SpotPriceReader {
        fn get_spot_price(&self, metal: Metal, purity: &str) -> RepositoryResult<Option<SpotPrice>>;
        fn list_spot_prices(&self) -> RepositoryResult<Vec<SpotPrice>>;
        fn latest_spot_update(&self) -> RepositoryResult<Option<NaiveDateTime>>;
    }
}

mock! {
    pub SpotPriceWriter {}

    impl SpotPriceWriter for SpotPriceWriter {
        fn upsert_spot_price(&self, new_price: &NewSpotPrice) -> RepositoryResult<SpotPrice>;
    }
}

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
        fn list_stale_products(&self, threshold: NaiveDateTime, limit: i64) -> RepositoryResult<Vec<Product>>;
        fn count_stale_products(&self, threshold: NaiveDateTime) -> RepositoryResult<usize>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn set_product_price(&self, product_id: i32, total_price: f64, updated_at: NaiveDateTime) -> RepositoryResult<()>;
        fn set_variant_price(&self, product_id: i32, variant_id: i32, total_price: f64, updated_at: NaiveDateTime) -> RepositoryResult<()>;
    }
}

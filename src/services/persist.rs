//! Write-back of computed totals onto the catalog.

use crate::repository::ProductWriter;
use crate::services::pricing::ProductBreakdown;

/// Persist a computed price onto the product document.
///
/// With `selected_variant` the matching breakdown's rounded total is written
/// to that variant; otherwise the first breakdown's rounded total becomes the
/// product's base price. Either way the product's `latest_price_update` is
/// stamped. Failures are logged and swallowed: the caller already holds the
/// computed price, and a failed cache write must never fail their response.
pub fn persist_price<R>(
    repo: &R,
    product_id: i32,
    breakdowns: &[ProductBreakdown],
    selected_variant: Option<i32>,
) where
    R: ProductWriter + ?Sized,
{
    let now = chrono::Local::now().naive_utc();

    match selected_variant {
        Some(variant_id) => {
            let Some(entry) = breakdowns
                .iter()
                .find(|entry| entry.variant_id == Some(variant_id))
            else {
                log::warn!(
                    "no computed breakdown for variant {variant_id} of product {product_id}; nothing persisted"
                );
                return;
            };

            if let Err(err) =
                repo.set_variant_price(product_id, variant_id, entry.rounded_total, now)
            {
                log::error!(
                    "failed to persist price for variant {variant_id} of product {product_id}: {err}"
                );
            }
        }
        None => {
            let Some(entry) = breakdowns.first() else {
                log::warn!("no computed breakdown for product {product_id}; nothing persisted");
                return;
            };

            if let Err(err) = repo.set_product_price(product_id, entry.rounded_total, now) {
                log::error!("failed to persist price for product {product_id}: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    use crate::domain::product::{NewProduct, Product};
    use crate::repository::errors::{RepositoryError, RepositoryResult};
    use crate::repository::mock::MockProductWriter;

    fn entry(variant_id: Option<i32>, rounded_total: f64) -> ProductBreakdown {
        ProductBreakdown {
            making: 0.0,
            tax_percent: 3.0,
            tax: 0.0,
            subtotal: 0.0,
            total: rounded_total,
            rounded_total,
            variant_id,
            partial: false,
            last_updated: None,
        }
    }

    struct FakeRepo {
        writer: MockProductWriter,
    }

    impl ProductWriter for FakeRepo {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product> {
            self.writer.create_product(new_product)
        }

        fn set_product_price(
            &self,
            product_id: i32,
            total_price: f64,
            updated_at: NaiveDateTime,
        ) -> RepositoryResult<()> {
            self.writer
                .set_product_price(product_id, total_price, updated_at)
        }

        fn set_variant_price(
            &self,
            product_id: i32,
            variant_id: i32,
            total_price: f64,
            updated_at: NaiveDateTime,
        ) -> RepositoryResult<()> {
            self.writer
                .set_variant_price(product_id, variant_id, total_price, updated_at)
        }
    }

    #[test]
    fn writes_first_breakdown_to_base_price() {
        let mut writer = MockProductWriter::new();
        writer
            .expect_set_product_price()
            .times(1)
            .withf(|product_id, total_price, _| {
                assert_eq!(*product_id, 17);
                assert_eq!(*total_price, 66950.0);
                true
            })
            .returning(|_, _, _| Ok(()));
        let repo = FakeRepo { writer };

        persist_price(
            &repo,
            17,
            &[entry(None, 66950.0), entry(Some(2), 70000.0)],
            None,
        );
    }

    #[test]
    fn writes_matching_variant_breakdown() {
        let mut writer = MockProductWriter::new();
        writer
            .expect_set_variant_price()
            .times(1)
            .withf(|product_id, variant_id, total_price, _| {
                assert_eq!(*product_id, 17);
                assert_eq!(*variant_id, 42);
                assert_eq!(*total_price, 47895.0);
                true
            })
            .returning(|_, _, _, _| Ok(()));
        let repo = FakeRepo { writer };

        persist_price(
            &repo,
            17,
            &[entry(Some(41), 31930.0), entry(Some(42), 47895.0)],
            Some(42),
        );
    }

    #[test]
    fn unknown_variant_persists_nothing() {
        let writer = MockProductWriter::new();
        let repo = FakeRepo { writer };

        // No expectations set; any repository call would panic.
        persist_price(&repo, 17, &[entry(Some(41), 31930.0)], Some(99));
    }

    #[test]
    fn repeated_persistence_stores_the_same_value() {
        let mut writer = MockProductWriter::new();
        writer
            .expect_set_product_price()
            .times(2)
            .withf(|_, total_price, _| {
                assert_eq!(*total_price, 12345.0);
                true
            })
            .returning(|_, _, _| Ok(()));
        let repo = FakeRepo { writer };

        let breakdowns = [entry(None, 12345.0)];
        persist_price(&repo, 5, &breakdowns, None);
        persist_price(&repo, 5, &breakdowns, None);
    }

    #[test]
    fn write_failure_is_swallowed() {
        let mut writer = MockProductWriter::new();
        writer
            .expect_set_product_price()
            .times(1)
            .returning(|_, _, _| Err(RepositoryError::NotFound));
        let repo = FakeRepo { writer };

        // Must not panic or propagate.
        persist_price(&repo, 404, &[entry(None, 1.0)], None);
    }
}

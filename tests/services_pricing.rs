use chrono::Duration;

use sona_pricing::GRAMS_PER_TROY_OUNCE;
use sona_pricing::domain::metal::Metal;
use sona_pricing::domain::product::{GemstoneLine, MetalLine, NewProduct, NewVariant};
use sona_pricing::domain::spot_price::{NewSpotPrice, SpotSource};
use sona_pricing::rates::StaticRates;
use sona_pricing::repository::{
    DieselRepository, ProductReader, ProductWriter, SpotPriceReader, SpotPriceWriter,
};
use sona_pricing::services::ServiceError;
use sona_pricing::services::pricing::{PriceBreakdown, PriceQuery, SingleMetalQuery, compute_price};
use sona_pricing::services::refresh::{RefreshPolicy, ensure_fresh};
use sona_pricing::services::sweeper::{SweeperConfig, sweep_once};

mod common;

fn seed_gold(repo: &DieselRepository, purity: &str, price_per_gram: f64) {
    repo.upsert_spot_price(&NewSpotPrice::new(
        Metal::Gold,
        purity,
        price_per_gram,
        SpotSource::Mock,
    ))
    .unwrap();
}

#[actix_web::test]
async fn test_ensure_fresh_seeds_full_board() {
    let test_db = common::TestDb::new("test_ensure_fresh_seeds_full_board.db");
    let repo = DieselRepository::new(test_db.pool());
    let policy = RefreshPolicy::from_days(4);

    ensure_fresh(&repo, &StaticRates::default(), &policy)
        .await
        .unwrap();

    // Every (metal, purity) pair from the purity tables gets a row.
    let rows = repo.list_spot_prices().unwrap();
    assert_eq!(rows.len(), 15);

    let pure = repo.get_spot_price(Metal::Gold, "24k").unwrap().unwrap();
    let expected = 220_000.0 / GRAMS_PER_TROY_OUNCE * 0.999;
    assert!((pure.price_per_gram - expected).abs() < 1e-6);
    assert_eq!(pure.source, SpotSource::Mock);

    // A second call within the freshness window is a no-op.
    ensure_fresh(&repo, &StaticRates::default(), &policy)
        .await
        .unwrap();
    assert_eq!(repo.list_spot_prices().unwrap().len(), 15);
}

#[test]
fn test_compute_product_price_and_persist() {
    let test_db = common::TestDb::new("test_compute_product_price_and_persist.db");
    let repo = DieselRepository::new(test_db.pool());
    seed_gold(&repo, "22k", 6500.0);

    let created = repo
        .create_product(
            &NewProduct::new("Bangle")
                .making_charge(2500.0)
                .with_metal(MetalLine::new(Metal::Gold, "22k", 10.0)),
        )
        .unwrap();

    let breakdowns = compute_price(
        &repo,
        PriceQuery::Product {
            product_id: created.id,
            persist: true,
            selected_variant: None,
        },
    )
    .unwrap();

    assert_eq!(breakdowns.len(), 1);
    let PriceBreakdown::Product(breakdown) = &breakdowns[0] else {
        panic!("expected a product breakdown");
    };
    // 10g * 6500 + 2500 making = 67500; 3% tax = 2025.
    assert_eq!(breakdown.subtotal, 67500.0);
    assert_eq!(breakdown.tax, 2025.0);
    assert_eq!(breakdown.total, 69525.0);
    assert_eq!(breakdown.rounded_total, 69525.0);
    assert!(!breakdown.partial);
    assert!(breakdown.variant_id.is_none());

    let fetched = repo.get_product_by_id(created.id).unwrap().unwrap();
    assert_eq!(fetched.total_price, Some(69525.0));
    assert!(fetched.latest_price_update.is_some());
}

#[test]
fn test_compute_variant_prices_and_persist_selected() {
    let test_db = common::TestDb::new("test_compute_variant_prices_and_persist_selected.db");
    let repo = DieselRepository::new(test_db.pool());
    seed_gold(&repo, "22k", 6500.0);
    seed_gold(&repo, "18k", 5000.0);

    let created = repo
        .create_product(
            &NewProduct::new("Chain")
                .with_gemstone(GemstoneLine::new("Diamond", 0.25, 2).priced(5000.0))
                .with_variant(
                    NewVariant::new("Small", 1000.0)
                        .with_metal(MetalLine::new(Metal::Gold, "22k", 10.0)),
                )
                .with_variant(
                    NewVariant::new("Large", 1500.0)
                        .with_metal(MetalLine::new(Metal::Gold, "18k", 14.0)),
                ),
        )
        .unwrap();
    let small_id = created.variants[0].id;

    let breakdowns = compute_price(
        &repo,
        PriceQuery::Product {
            product_id: created.id,
            persist: true,
            selected_variant: Some(small_id),
        },
    )
    .unwrap();

    assert_eq!(breakdowns.len(), 2);
    let PriceBreakdown::Product(small) = &breakdowns[0] else {
        panic!("expected a product breakdown");
    };
    let PriceBreakdown::Product(large) = &breakdowns[1] else {
        panic!("expected a product breakdown");
    };
    // Gemstones (2 * 5000) are shared across variants.
    // Small: 65000 + 10000 + 1000 = 76000; 3% tax = 2280.
    assert_eq!(small.subtotal, 76000.0);
    assert_eq!(small.total, 78280.0);
    assert_eq!(small.variant_id, Some(small_id));
    // Large: 70000 + 10000 + 1500 = 81500; 3% tax = 2445.
    assert_eq!(large.subtotal, 81500.0);
    assert_eq!(large.total, 83945.0);

    // Only the selected variant's total is written back.
    let fetched = repo.get_product_by_id(created.id).unwrap().unwrap();
    assert_eq!(fetched.variants[0].total_price, Some(78280.0));
    assert_eq!(fetched.variants[1].total_price, None);
    assert!(fetched.latest_price_update.is_some());
}

#[test]
fn test_single_metal_requires_spot_row() {
    let test_db = common::TestDb::new("test_single_metal_requires_spot_row.db");
    let repo = DieselRepository::new(test_db.pool());

    let query = SingleMetalQuery {
        metal: Metal::Gold,
        purity: "22k".to_string(),
        weight_grams: 10.0,
        making_charge: 500.0,
        tax_percent: None,
    };

    let err = compute_price(&repo, PriceQuery::SingleMetal(query.clone()))
        .expect_err("expected missing spot price to fail");
    assert!(matches!(err, ServiceError::NotFound));

    seed_gold(&repo, "22k", 6500.0);
    let breakdowns = compute_price(&repo, PriceQuery::SingleMetal(query)).unwrap();
    let PriceBreakdown::SingleMetal(breakdown) = &breakdowns[0] else {
        panic!("expected a single-metal breakdown");
    };
    assert_eq!(breakdown.metal_value, 65000.0);
    assert_eq!(breakdown.subtotal, 65500.0);
    assert_eq!(breakdown.tax, 1965.0);
    assert_eq!(breakdown.total, 67465.0);
}

#[test]
fn test_sweep_once_prices_stale_products() {
    let test_db = common::TestDb::new("test_sweep_once_prices_stale_products.db");
    let repo = DieselRepository::new(test_db.pool());
    seed_gold(&repo, "22k", 6500.0);

    let created = repo
        .create_product(
            &NewProduct::new("Pendant")
                .making_charge(350.0)
                .with_metal(MetalLine::new(Metal::Gold, "22k", 2.0)),
        )
        .unwrap();

    let report = sweep_once(&repo, &SweeperConfig::default()).unwrap();
    assert_eq!(report.scanned, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(report.failed, 0);

    // 2 * 6500 + 350 = 13350; 3% tax = 400.5; total 13750.5 rounds to 13751.
    let fetched = repo.get_product_by_id(created.id).unwrap().unwrap();
    assert_eq!(fetched.total_price, Some(13751.0));

    // Freshly priced products are no longer stale.
    let report = sweep_once(&repo, &SweeperConfig::default()).unwrap();
    assert_eq!(report.scanned, 0);
}

#[test]
fn test_sweep_once_honors_batch_size() {
    let test_db = common::TestDb::new("test_sweep_once_honors_batch_size.db");
    let repo = DieselRepository::new(test_db.pool());
    seed_gold(&repo, "22k", 6500.0);

    for n in 0..5 {
        repo.create_product(
            &NewProduct::new(format!("Ring {n}"))
                .with_metal(MetalLine::new(Metal::Gold, "22k", 1.0)),
        )
        .unwrap();
    }

    let config = SweeperConfig {
        batch_size: 3,
        ..SweeperConfig::default()
    };
    let report = sweep_once(&repo, &config).unwrap();
    assert_eq!(report.scanned, 3);
    assert_eq!(report.updated, 3);

    // The remainder is left for the next run.
    let threshold = chrono::Local::now().naive_utc() - Duration::hours(4);
    assert_eq!(repo.count_stale_products(threshold).unwrap(), 2);
}

//! The single authoritative price computation.
//!
//! Every caller — the compute endpoint, the per-product price endpoint and the
//! background sweeper — goes through `product_breakdowns` /
//! `single_metal_breakdown` so the arithmetic can never diverge between call
//! paths. Computation is pure over a `SpotBoard` snapshot; persistence is a
//! separate explicit step.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::DEFAULT_TAX_PERCENT;
use crate::domain::metal::Metal;
use crate::domain::product::{GemstoneLine, MetalLine, Product};
use crate::domain::spot_price::SpotPrice;
use crate::repository::{ProductReader, ProductWriter, SpotPriceReader};
use crate::services::{ServiceError, ServiceResult, persist};

/// Round to two decimals for display values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// In-memory snapshot of the spot price store, keyed by (metal, purity).
/// Purity labels are matched case-insensitively, like the purity table.
#[derive(Debug, Default)]
pub struct SpotBoard {
    prices: HashMap<(Metal, String), SpotPrice>,
}

impl SpotBoard {
    pub fn from_rows(rows: Vec<SpotPrice>) -> Self {
        let prices = rows
            .into_iter()
            .map(|row| ((row.metal, row.purity.to_ascii_lowercase()), row))
            .collect();
        Self { prices }
    }

    pub fn get(&self, metal: Metal, purity: &str) -> Option<&SpotPrice> {
        self.prices.get(&(metal, purity.to_ascii_lowercase()))
    }

    pub fn price_per_gram(&self, metal: Metal, purity: &str) -> Option<f64> {
        self.get(metal, purity).map(|row| row.price_per_gram)
    }

    /// Max `updated_at` across the snapshot; attached to breakdowns as
    /// `lastUpdated`.
    pub fn latest_update(&self) -> Option<NaiveDateTime> {
        self.prices.values().map(|row| row.updated_at).max()
    }
}

/// Itemized result for one product or variant (full-product mode).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductBreakdown {
    pub making: f64,
    pub tax_percent: f64,
    pub tax: f64,
    pub subtotal: f64,
    pub total: f64,
    /// `total` rounded to the nearest whole currency unit; the value that
    /// gets persisted.
    pub rounded_total: f64,
    #[serde(rename = "variant_id", skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<i32>,
    /// True when a spot price was missing for at least one metal line and its
    /// contribution was taken as zero.
    pub partial: bool,
    pub last_updated: Option<NaiveDateTime>,
}

/// Itemized result for an ad-hoc single-metal calculation. All money values
/// are rounded to two decimals for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SingleMetalBreakdown {
    pub metal: String,
    pub purity: String,
    pub weight_grams: f64,
    pub price_per_gram: f64,
    pub metal_value: f64,
    pub making: f64,
    pub tax_percent: f64,
    pub tax: f64,
    pub subtotal: f64,
    pub total: f64,
    pub last_updated: Option<NaiveDateTime>,
}

/// Parameters of a single-metal calculation.
#[derive(Debug, Clone)]
pub struct SingleMetalQuery {
    pub metal: Metal,
    pub purity: String,
    pub weight_grams: f64,
    pub making_charge: f64,
    pub tax_percent: Option<f64>,
}

/// A parsed pricing request, one of the two supported shapes.
#[derive(Debug, Clone)]
pub enum PriceQuery {
    Product {
        product_id: i32,
        persist: bool,
        selected_variant: Option<i32>,
    },
    SingleMetal(SingleMetalQuery),
}

/// One entry of the response `data` array.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PriceBreakdown {
    Product(ProductBreakdown),
    SingleMetal(SingleMetalBreakdown),
}

/// Metal value of a composition against the board. Lines without a stored
/// spot price contribute zero and flip the partial flag.
fn metal_value(lines: &[MetalLine], board: &SpotBoard) -> (f64, bool) {
    let mut value = 0.0;
    let mut partial = false;

    for line in lines {
        match board.price_per_gram(line.metal, &line.purity) {
            Some(price_per_gram) => value += price_per_gram * line.weight_grams,
            None => {
                log::warn!(
                    "no spot price stored for {} {}; metal line valued at 0",
                    line.metal,
                    line.purity
                );
                partial = true;
            }
        }
    }

    (value, partial)
}

fn gemstone_value(lines: &[GemstoneLine]) -> f64 {
    lines.iter().map(GemstoneLine::value).sum()
}

fn breakdown(
    metals: &[MetalLine],
    gemstones: &[GemstoneLine],
    making: f64,
    tax_percent: f64,
    variant_id: Option<i32>,
    board: &SpotBoard,
) -> ProductBreakdown {
    let (metal_value, partial) = metal_value(metals, board);
    let subtotal = metal_value + gemstone_value(gemstones) + making;
    let tax = subtotal * tax_percent / 100.0;
    let total = subtotal + tax;

    ProductBreakdown {
        making,
        tax_percent,
        tax,
        subtotal,
        total,
        rounded_total: total.round(),
        variant_id,
        partial,
        last_updated: board.latest_update(),
    }
}

/// Breakdowns for a product: one for the base composition, or one per variant
/// in variant order. Variant metals fully replace base metals; gemstones are
/// shared either way.
pub fn product_breakdowns(product: &Product, board: &SpotBoard) -> Vec<ProductBreakdown> {
    let tax_percent = product.tax_percent.unwrap_or(DEFAULT_TAX_PERCENT);

    if product.has_variants() {
        product
            .variants
            .iter()
            .map(|variant| {
                breakdown(
                    &variant.metals,
                    &product.gemstones,
                    variant.making_charge,
                    tax_percent,
                    Some(variant.id),
                    board,
                )
            })
            .collect()
    } else {
        vec![breakdown(
            &product.metals,
            &product.gemstones,
            product.making_charge,
            tax_percent,
            None,
            board,
        )]
    }
}

/// Ad-hoc calculation for one metal line. Unlike full-product mode a missing
/// spot price is a hard not-found here.
pub fn single_metal_breakdown(
    query: &SingleMetalQuery,
    board: &SpotBoard,
) -> ServiceResult<SingleMetalBreakdown> {
    let spot = board
        .get(query.metal, &query.purity)
        .ok_or(ServiceError::NotFound)?;

    let tax_percent = query.tax_percent.unwrap_or(DEFAULT_TAX_PERCENT);
    let metal_value = spot.price_per_gram * query.weight_grams;
    let subtotal = metal_value + query.making_charge;
    let tax = subtotal * tax_percent / 100.0;
    let total = subtotal + tax;

    Ok(SingleMetalBreakdown {
        metal: query.metal.to_string(),
        purity: spot.purity.clone(),
        weight_grams: query.weight_grams,
        price_per_gram: round2(spot.price_per_gram),
        metal_value: round2(metal_value),
        making: round2(query.making_charge),
        tax_percent,
        tax: round2(tax),
        subtotal: round2(subtotal),
        total: round2(total),
        last_updated: Some(spot.updated_at),
    })
}

/// Entry point used by the pricing routes: resolves the request shape, loads
/// the spot board, computes, and optionally persists the computed totals.
pub fn compute_price<R>(repo: &R, query: PriceQuery) -> ServiceResult<Vec<PriceBreakdown>>
where
    R: ProductReader + ProductWriter + SpotPriceReader + ?Sized,
{
    let board = SpotBoard::from_rows(repo.list_spot_prices()?);

    match query {
        PriceQuery::Product {
            product_id,
            persist: persist_totals,
            selected_variant,
        } => {
            let product = repo
                .get_product_by_id(product_id)?
                .ok_or(ServiceError::NotFound)?;

            let breakdowns = product_breakdowns(&product, &board);

            if persist_totals {
                persist::persist_price(repo, product.id, &breakdowns, selected_variant);
            }

            Ok(breakdowns.into_iter().map(PriceBreakdown::Product).collect())
        }
        PriceQuery::SingleMetal(single) => {
            let entry = single_metal_breakdown(&single, &board)?;
            Ok(vec![PriceBreakdown::SingleMetal(entry)])
        }
    }
}

/// View of one stored spot price, serialized for the prices listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotPriceView {
    pub metal: String,
    pub purity: String,
    pub price_per_gram: f64,
    pub percent_change: f64,
    pub absolute_change: f64,
    pub source: String,
    pub updated_at: NaiveDateTime,
}

impl From<SpotPrice> for SpotPriceView {
    fn from(value: SpotPrice) -> Self {
        Self {
            metal: value.metal.to_string(),
            purity: value.purity,
            price_per_gram: value.price_per_gram,
            percent_change: value.percent_change,
            absolute_change: value.absolute_change,
            source: value.source.to_string(),
            updated_at: value.updated_at,
        }
    }
}

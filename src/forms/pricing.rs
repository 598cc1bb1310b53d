use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::metal::UnknownMetal;
use crate::services::pricing::{PriceQuery, SingleMetalQuery};

/// Result type returned by the pricing form helpers.
pub type PriceFormResult<T> = Result<T, PriceFormError>;

/// Errors that can occur while resolving a compute-price request.
#[derive(Debug, Error)]
pub enum PriceFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The named metal is not priced by this catalog.
    #[error(transparent)]
    Metal(#[from] UnknownMetal),
    /// Neither request shape was provided.
    #[error("either `product` or `metal`, `purity` and `weightGrams` is required")]
    MissingFields,
}

/// Body accepted by the compute-price endpoint. Two shapes share one payload:
/// a `product` reference for full-product mode, or `metal`/`purity`/
/// `weightGrams` for an ad-hoc single-metal calculation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputePriceForm {
    /// Catalog product to price.
    pub product: Option<i32>,
    /// Metal name for single-metal mode (e.g. "Gold").
    pub metal: Option<String>,
    /// Purity label for single-metal mode (e.g. "22k").
    pub purity: Option<String>,
    #[validate(range(min = 0.001))]
    pub weight_grams: Option<f64>,
    #[validate(range(min = 0.0))]
    pub making_charge: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_percent: Option<f64>,
    /// Write the computed total back onto the product document.
    pub persist: bool,
    /// Variant whose total should be persisted, when `persist` is set.
    pub selected_variant: Option<i32>,
}

impl ComputePriceForm {
    /// Validate the payload and resolve which request shape it carries.
    pub fn into_query(self) -> PriceFormResult<PriceQuery> {
        self.validate()?;

        if let Some(product_id) = self.product {
            return Ok(PriceQuery::Product {
                product_id,
                persist: self.persist,
                selected_variant: self.selected_variant,
            });
        }

        match (self.metal, self.purity, self.weight_grams) {
            (Some(metal), Some(purity), Some(weight_grams)) => {
                Ok(PriceQuery::SingleMetal(SingleMetalQuery {
                    metal: metal.parse()?,
                    purity,
                    weight_grams,
                    making_charge: self.making_charge.unwrap_or(0.0),
                    tax_percent: self.tax_percent,
                }))
            }
            _ => Err(PriceFormError::MissingFields),
        }
    }
}

/// Query parameters accepted by the per-product price endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPriceParams {
    pub persist: bool,
    pub selected_variant: Option<i32>,
}

impl ProductPriceParams {
    pub fn into_query(self, product_id: i32) -> PriceQuery {
        PriceQuery::Product {
            product_id,
            persist: self.persist,
            selected_variant: self.selected_variant,
        }
    }
}

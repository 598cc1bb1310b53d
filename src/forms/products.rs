use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::metal::UnknownMetal;
use crate::domain::product::{GemstoneLine, MetalLine, NewProduct, NewVariant};

/// Maximum allowed length for a product name.
const NAME_MAX_LEN: u64 = 128;

/// Maximum allowed length for a SKU.
const SKU_MAX_LEN: u64 = 64;

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product forms.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after trimming.
    #[error("product name cannot be empty")]
    EmptyName,
    /// A metal line names a metal the catalog does not price.
    #[error(transparent)]
    Metal(#[from] UnknownMetal),
    /// Base metals and variants were both supplied.
    #[error("products with variants carry metals on the variants, not the base product")]
    MixedComposition,
    /// A product with neither base metals nor variants cannot be priced.
    #[error("a product needs base metals or at least one variant")]
    EmptyComposition,
}

/// One metal line of the payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MetalLineForm {
    pub metal: String,
    #[validate(length(min = 1))]
    pub purity: String,
    #[validate(range(min = 0.001))]
    pub weight_grams: f64,
}

impl MetalLineForm {
    fn into_line(self) -> ProductFormResult<MetalLine> {
        Ok(MetalLine::new(
            self.metal.parse()?,
            self.purity,
            self.weight_grams,
        ))
    }
}

/// One gemstone line of the payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GemstoneLineForm {
    #[validate(length(min = 1))]
    pub kind: String,
    #[validate(range(min = 0.001))]
    pub carat_weight: f64,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(range(min = 0.0))]
    pub price_per_item: Option<f64>,
}

impl GemstoneLineForm {
    fn into_line(self) -> GemstoneLine {
        GemstoneLine {
            kind: self.kind,
            carat_weight: self.carat_weight,
            quantity: self.quantity,
            price_per_item: self.price_per_item,
        }
    }
}

/// One variant of the payload, with its own metals and making charge.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantForm {
    #[validate(length(min = 1))]
    pub label: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub making_charge: f64,
    #[validate(nested)]
    pub metals: Vec<MetalLineForm>,
}

impl VariantForm {
    fn into_new_variant(self) -> ProductFormResult<NewVariant> {
        let mut variant = NewVariant::new(self.label.trim(), self.making_charge);
        for line in self.metals {
            variant.metals.push(line.into_line()?);
        }
        Ok(variant)
    }
}

/// Payload accepted when creating a catalog product.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddProductForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(max = SKU_MAX_LEN))]
    pub sku: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub making_charge: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_percent: Option<f64>,
    #[serde(default)]
    #[validate(nested)]
    pub metals: Vec<MetalLineForm>,
    #[serde(default)]
    #[validate(nested)]
    pub gemstones: Vec<GemstoneLineForm>,
    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<VariantForm>,
}

impl AddProductForm {
    /// Validates and converts the payload into a domain `NewProduct`,
    /// enforcing the base-metals/variants exclusivity.
    pub fn into_new_product(self) -> ProductFormResult<NewProduct> {
        self.validate()?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductFormError::EmptyName);
        }

        if !self.variants.is_empty() && !self.metals.is_empty() {
            return Err(ProductFormError::MixedComposition);
        }
        if self.variants.is_empty() && self.metals.is_empty() {
            return Err(ProductFormError::EmptyComposition);
        }

        let mut payload = NewProduct::new(name).making_charge(self.making_charge);

        if let Some(sku) = self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            payload = payload.with_sku(sku);
        }
        if let Some(description) = self.description {
            payload = payload.with_description(description);
        }
        if let Some(tax_percent) = self.tax_percent {
            payload = payload.tax_percent(tax_percent);
        }

        for line in self.metals {
            payload.metals.push(line.into_line()?);
        }
        for line in self.gemstones {
            payload.gemstones.push(line.into_line());
        }
        for variant in self.variants {
            payload.variants.push(variant.into_new_variant()?);
        }

        Ok(payload)
    }
}

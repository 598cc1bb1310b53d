use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::metal::Metal;

/// One metal line of a composition: a weight of a metal at a purity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalLine {
    pub metal: Metal,
    /// Purity label, metal-specific (e.g. "22k" for gold, "Sterling" for silver).
    pub purity: String,
    /// Weight in grams, always positive.
    pub weight_grams: f64,
}

impl MetalLine {
    pub fn new(metal: Metal, purity: impl Into<String>, weight_grams: f64) -> Self {
        Self {
            metal,
            purity: purity.into(),
            weight_grams,
        }
    }
}

/// One gemstone line. Gemstones belong to the product and are shared across
/// every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GemstoneLine {
    /// Stone kind, free text (e.g. "Diamond", "Ruby").
    pub kind: String,
    pub carat_weight: f64,
    /// Number of stones, at least 1.
    pub quantity: i32,
    /// Price per stone; `None` prices the line at zero.
    pub price_per_item: Option<f64>,
}

impl GemstoneLine {
    pub fn new(kind: impl Into<String>, carat_weight: f64, quantity: i32) -> Self {
        Self {
            kind: kind.into(),
            carat_weight,
            quantity,
            price_per_item: None,
        }
    }

    pub fn priced(mut self, price_per_item: f64) -> Self {
        self.price_per_item = Some(price_per_item);
        self
    }

    /// Line value used by the price computation.
    pub fn value(&self) -> f64 {
        self.price_per_item.unwrap_or(0.0) * self.quantity as f64
    }
}

/// A purchasable variant of a product. Variant metals fully replace the base
/// product metals; they are never combined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: i32,
    pub label: String,
    pub making_charge: f64,
    /// Last persisted price, if any.
    pub total_price: Option<f64>,
    pub metals: Vec<MetalLine>,
}

/// Domain representation of a catalog product with its full composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    /// Artisan fee for the base product; variants carry their own.
    pub making_charge: f64,
    /// Tax rate override; the engine default applies when `None`.
    pub tax_percent: Option<f64>,
    /// Last persisted base price, if any.
    pub total_price: Option<f64>,
    /// When a price was last persisted for this product.
    pub latest_price_update: Option<NaiveDateTime>,
    pub is_active: bool,
    pub is_deleted: bool,
    /// Base composition; empty when the product uses variants.
    pub metals: Vec<MetalLine>,
    /// Shared across the base product and every variant.
    pub gemstones: Vec<GemstoneLine>,
    pub variants: Vec<Variant>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// Payload for one new variant, created alongside its product.
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub label: String,
    pub making_charge: f64,
    pub metals: Vec<MetalLine>,
}

impl NewVariant {
    pub fn new(label: impl Into<String>, making_charge: f64) -> Self {
        Self {
            label: label.into(),
            making_charge,
            metals: Vec::new(),
        }
    }

    pub fn with_metal(mut self, line: MetalLine) -> Self {
        self.metals.push(line);
        self
    }
}

/// Payload required to insert a new product with its composition.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub making_charge: f64,
    pub tax_percent: Option<f64>,
    pub is_active: bool,
    pub metals: Vec<MetalLine>,
    pub gemstones: Vec<GemstoneLine>,
    pub variants: Vec<NewVariant>,
    /// Timestamp captured when the payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a new product payload with the supplied name and current timestamp.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sku: None,
            description: None,
            making_charge: 0.0,
            tax_percent: None,
            is_active: true,
            metals: Vec::new(),
            gemstones: Vec::new(),
            variants: Vec::new(),
            updated_at: chrono::Local::now().naive_utc(),
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn making_charge(mut self, making_charge: f64) -> Self {
        self.making_charge = making_charge;
        self
    }

    pub fn tax_percent(mut self, tax_percent: f64) -> Self {
        self.tax_percent = Some(tax_percent);
        self
    }

    pub fn with_metal(mut self, line: MetalLine) -> Self {
        self.metals.push(line);
        self
    }

    pub fn with_gemstone(mut self, line: GemstoneLine) -> Self {
        self.gemstones.push(line);
        self
    }

    pub fn with_variant(mut self, variant: NewVariant) -> Self {
        self.variants.push(variant);
        self
    }
}

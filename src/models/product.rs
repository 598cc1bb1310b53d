use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    GemstoneLine as DomainGemstoneLine, MetalLine as DomainMetalLine, Product as DomainProduct,
    Variant as DomainVariant,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub making_charge: f64,
    pub tax_percent: Option<f64>,
    pub total_price: Option<f64>,
    pub latest_price_update: Option<NaiveDateTime>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub sku: Option<&'a str>,
    pub description: Option<&'a str>,
    pub making_charge: f64,
    pub tax_percent: Option<f64>,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_metals)]
#[diesel(belongs_to(Product))]
pub struct ProductMetal {
    pub id: i32,
    pub product_id: i32,
    pub metal: String,
    pub purity: String,
    pub weight_grams: f64,
    pub position: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_metals)]
pub struct NewProductMetal<'a> {
    pub product_id: i32,
    pub metal: &'a str,
    pub purity: &'a str,
    pub weight_grams: f64,
    pub position: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_gemstones)]
#[diesel(belongs_to(Product))]
pub struct ProductGemstone {
    pub id: i32,
    pub product_id: i32,
    pub kind: String,
    pub carat_weight: f64,
    pub quantity: i32,
    pub price_per_item: Option<f64>,
    pub position: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_gemstones)]
pub struct NewProductGemstone<'a> {
    pub product_id: i32,
    pub kind: &'a str,
    pub carat_weight: f64,
    pub quantity: i32,
    pub price_per_item: Option<f64>,
    pub position: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_variants)]
#[diesel(belongs_to(Product))]
pub struct ProductVariant {
    pub id: i32,
    pub product_id: i32,
    pub label: String,
    pub making_charge: f64,
    pub total_price: Option<f64>,
    pub position: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_variants)]
pub struct NewProductVariant<'a> {
    pub product_id: i32,
    pub label: &'a str,
    pub making_charge: f64,
    pub position: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::variant_metals)]
#[diesel(belongs_to(ProductVariant, foreign_key = variant_id))]
pub struct VariantMetal {
    pub id: i32,
    pub variant_id: i32,
    pub metal: String,
    pub purity: String,
    pub weight_grams: f64,
    pub position: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::variant_metals)]
pub struct NewVariantMetal<'a> {
    pub variant_id: i32,
    pub metal: &'a str,
    pub purity: &'a str,
    pub weight_grams: f64,
    pub position: i32,
}

impl From<Product> for DomainProduct {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sku: value.sku,
            description: value.description,
            making_charge: value.making_charge,
            tax_percent: value.tax_percent,
            total_price: value.total_price,
            latest_price_update: value.latest_price_update,
            is_active: value.is_active,
            is_deleted: value.is_deleted,
            metals: Vec::new(),
            gemstones: Vec::new(),
            variants: Vec::new(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<ProductMetal> for DomainMetalLine {
    fn from(value: ProductMetal) -> Self {
        Self {
            // Rows are only written through Metal::as_str, so a failed parse
            // is unreachable in practice.
            metal: value.metal.parse().unwrap_or_default(),
            purity: value.purity,
            weight_grams: value.weight_grams,
        }
    }
}

impl From<VariantMetal> for DomainMetalLine {
    fn from(value: VariantMetal) -> Self {
        Self {
            metal: value.metal.parse().unwrap_or_default(),
            purity: value.purity,
            weight_grams: value.weight_grams,
        }
    }
}

impl From<ProductGemstone> for DomainGemstoneLine {
    fn from(value: ProductGemstone) -> Self {
        Self {
            kind: value.kind,
            carat_weight: value.carat_weight,
            quantity: value.quantity,
            price_per_item: value.price_per_item,
        }
    }
}

impl From<ProductVariant> for DomainVariant {
    fn from(value: ProductVariant) -> Self {
        Self {
            id: value.id,
            label: value.label,
            making_charge: value.making_charge,
            total_price: value.total_price,
            metals: Vec::new(),
        }
    }
}

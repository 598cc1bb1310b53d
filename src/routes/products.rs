use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::json;

use crate::domain::product::Product;
use crate::forms::pricing::ProductPriceParams;
use crate::forms::products::AddProductForm;
use crate::rates::RateClient;
use crate::repository::{DieselRepository, ProductListQuery, ProductReader, ProductWriter};
use crate::routes::failure;
use crate::services::ServiceError;
use crate::services::pricing;
use crate::services::refresh::{self, RefreshPolicy};
use crate::services::sweeper::SweepHandle;

/// Storefront summary of one product, including the cached price.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummaryView {
    pub id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub total_price: Option<f64>,
    pub latest_price_update: Option<NaiveDateTime>,
    pub variant_count: usize,
}

impl From<Product> for ProductSummaryView {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sku: value.sku,
            total_price: value.total_price,
            latest_price_update: value.latest_price_update,
            variant_count: value.variants.len(),
        }
    }
}

#[get("/v1/products")]
/// List active products with their cached prices.
///
/// Listing also pokes the background sweeper, so products whose cached price
/// has gone stale get recomputed shortly after — without blocking this
/// response.
pub async fn list_products(
    repo: web::Data<DieselRepository>,
    sweeper: web::Data<SweepHandle>,
) -> impl Responder {
    match repo.list_products(ProductListQuery::new()) {
        Ok((total, products)) => {
            sweeper.poke();

            let data: Vec<ProductSummaryView> = products.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(json!({ "success": true, "total": total, "data": data }))
        }
        Err(err) => {
            log::error!("Failed to list products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/products/{id}/price")]
/// Compute the live price breakdown(s) for one product, optionally persisting
/// the computed total back onto the document.
pub async fn product_price(
    path: web::Path<i32>,
    params: web::Query<ProductPriceParams>,
    repo: web::Data<DieselRepository>,
    rates: web::Data<RateClient>,
    policy: web::Data<RefreshPolicy>,
) -> impl Responder {
    if let Err(err) = refresh::ensure_fresh(repo.get_ref(), rates.get_ref(), policy.get_ref()).await
    {
        log::warn!("spot refresh failed, computing from stored prices: {err}");
    }

    let query = params.into_inner().into_query(path.into_inner());

    match pricing::compute_price(repo.get_ref(), query) {
        Ok(data) => HttpResponse::Ok().json(json!({ "success": true, "data": data })),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().json(failure("product not found")),
        Err(err) => {
            log::error!("Failed to price product: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/v1/products")]
/// Create a catalog product with its metal/gemstone/variant composition.
pub async fn add_product(
    form: web::Json<AddProductForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload = match form.into_inner().into_new_product() {
        Ok(payload) => payload,
        Err(err) => return HttpResponse::BadRequest().json(failure(&err.to_string())),
    };

    match repo.create_product(&payload) {
        Ok(created) => HttpResponse::Created().json(json!({ "success": true, "data": created })),
        Err(err) => {
            log::error!("Failed to create product: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

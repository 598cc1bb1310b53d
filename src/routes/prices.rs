use actix_web::{HttpResponse, Responder, get, post, web};
use serde_json::json;

use crate::forms::pricing::ComputePriceForm;
use crate::rates::RateClient;
use crate::repository::{DieselRepository, SpotPriceReader};
use crate::routes::failure;
use crate::services::pricing::{self, SpotPriceView};
use crate::services::refresh::{self, RefreshPolicy};
use crate::services::ServiceError;

#[get("/v1/prices")]
/// Return the stored spot price table, refreshing it first when stale.
///
/// A failed refresh is logged and the stored (possibly stale) table is served
/// anyway; this endpoint never fails because the rate feed is down.
pub async fn list_prices(
    repo: web::Data<DieselRepository>,
    rates: web::Data<RateClient>,
    policy: web::Data<RefreshPolicy>,
) -> impl Responder {
    if let Err(err) = refresh::ensure_fresh(repo.get_ref(), rates.get_ref(), policy.get_ref()).await
    {
        log::warn!("spot refresh failed, serving stored prices: {err}");
    }

    match repo.list_spot_prices() {
        Ok(rows) => {
            let data: Vec<SpotPriceView> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(json!({ "success": true, "data": data }))
        }
        Err(err) => {
            log::error!("Failed to list spot prices: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/v1/prices/compute")]
/// The central pricing endpoint: full-product or single-metal mode, selected
/// by the fields present in the body. The spot store is refreshed first when
/// stale, so this call can block on the external feed.
pub async fn compute_prices(
    form: web::Json<ComputePriceForm>,
    repo: web::Data<DieselRepository>,
    rates: web::Data<RateClient>,
    policy: web::Data<RefreshPolicy>,
) -> impl Responder {
    let query = match form.into_inner().into_query() {
        Ok(query) => query,
        Err(err) => return HttpResponse::BadRequest().json(failure(&err.to_string())),
    };

    if let Err(err) = refresh::ensure_fresh(repo.get_ref(), rates.get_ref(), policy.get_ref()).await
    {
        log::warn!("spot refresh failed, computing from stored prices: {err}");
    }

    match pricing::compute_price(repo.get_ref(), query) {
        Ok(data) => HttpResponse::Ok().json(json!({ "success": true, "data": data })),
        Err(ServiceError::NotFound) => {
            HttpResponse::NotFound().json(failure("price data not found"))
        }
        Err(err) => {
            log::error!("Failed to compute price: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

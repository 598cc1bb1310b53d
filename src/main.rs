use std::env;

use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;

use sona_pricing::db::establish_connection_pool;
use sona_pricing::rates::RateClient;
use sona_pricing::repository::DieselRepository;
use sona_pricing::routes::prices::{compute_prices, list_prices};
use sona_pricing::routes::products::{add_product, list_products, product_price};
use sona_pricing::services::refresh::RefreshPolicy;
use sona_pricing::services::sweeper::{PriceSweeper, SweeperConfig};
use sona_pricing::{DEFAULT_PRICE_REFRESH_HOURS, DEFAULT_SPOT_MAX_AGE_DAYS, DEFAULT_SWEEP_BATCH_SIZE};

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let database_url = env::var("DATABASE_URL").unwrap_or("pricing.db".to_string());
    let port = env::var("PORT").unwrap_or("8080".to_string());
    let port = port.parse::<u16>().unwrap_or(8080);
    let address = env::var("ADDRESS").unwrap_or("127.0.0.1".to_string());

    let spot_max_age_days = env_i64("SPOT_MAX_AGE_DAYS", DEFAULT_SPOT_MAX_AGE_DAYS);
    let price_refresh_hours = env_i64("PRICE_REFRESH_HOURS", DEFAULT_PRICE_REFRESH_HOURS);
    let sweep_batch_size = env_i64("SWEEP_BATCH_SIZE", DEFAULT_SWEEP_BATCH_SIZE);

    let pool = match establish_connection_pool(&database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let rates = RateClient::from_api_key(env::var("METALPRICE_API_KEY").ok());
    let policy = RefreshPolicy::from_days(spot_max_age_days);

    let sweeper_config = SweeperConfig {
        stale_after: chrono::Duration::hours(price_refresh_hours),
        batch_size: sweep_batch_size,
    };
    let (sweeper, sweep_handle) = PriceSweeper::new(repo.clone(), sweeper_config);
    actix_web::rt::spawn(sweeper.run());

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api")
                    .service(list_prices)
                    .service(compute_prices)
                    .service(list_products)
                    .service(product_price)
                    .service(add_product),
            )
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(rates.clone()))
            .app_data(web::Data::new(policy.clone()))
            .app_data(web::Data::new(sweep_handle.clone()))
    })
    .bind((address, port))?
    .run()
    .await
}

//! Client for the external metals-rate feed.
//!
//! The feed quotes INR-denominated troy-ounce bullion rates for XAU/XAG/XPT/XPD
//! in a single request. A static fallback provider stands in when no API key is
//! configured, so the service can run end to end without network access.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::metal::Metal;
use crate::domain::spot_price::SpotSource;

/// Production endpoint of the rate feed.
pub const DEFAULT_BASE_URL: &str = "https://api.metalpriceapi.com";

/// Errors raised while fetching rates.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The feed answered but flagged the response as unsuccessful.
    #[error("rate feed reported failure")]
    Upstream,
}

/// INR-denominated troy-ounce rates, one entry per metal the feed returned.
/// A metal missing from the feed response is simply absent here; callers skip
/// it for the cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TroyOunceRates {
    rates: HashMap<Metal, f64>,
}

impl TroyOunceRates {
    pub fn insert(&mut self, metal: Metal, rate: f64) {
        self.rates.insert(metal, rate);
    }

    pub fn rate_for(&self, metal: Metal) -> Option<f64> {
        self.rates.get(&metal).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Source of troy-ounce rates consumed by the refresh service.
// Callers run on the actix runtime; the returned futures never need Send.
#[allow(async_fn_in_trait)]
pub trait RateProvider {
    async fn latest_rates(&self) -> Result<TroyOunceRates, RateError>;
    /// Source label stamped on upserted spot prices.
    fn source(&self) -> SpotSource;
}

/// Wire shape of the feed's `/v1/latest` response.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    success: bool,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// HTTP client for the live rate feed.
#[derive(Debug, Clone)]
pub struct MetalPriceApi {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MetalPriceApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different endpoint; used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn latest_url(&self) -> String {
        let currencies: Vec<&str> = Metal::ALL.iter().map(|metal| metal.rate_symbol()).collect();
        format!(
            "{}/v1/latest?api_key={}&base=INR&currencies={}",
            self.base_url,
            self.api_key,
            currencies.join(",")
        )
    }
}

impl RateProvider for MetalPriceApi {
    async fn latest_rates(&self) -> Result<TroyOunceRates, RateError> {
        let response = self
            .http
            .get(self.latest_url())
            .send()
            .await?
            .error_for_status()?;

        let payload: LatestRatesResponse = response.json().await?;
        rates_from_response(payload)
    }

    fn source(&self) -> SpotSource {
        SpotSource::Api
    }
}

/// Map a feed response onto per-metal rates. The feed keys quotes as
/// `INRXAU`, `INRXAG` and so on; metals without a quote are left out.
fn rates_from_response(payload: LatestRatesResponse) -> Result<TroyOunceRates, RateError> {
    if !payload.success {
        return Err(RateError::Upstream);
    }

    let mut rates = TroyOunceRates::default();
    for metal in Metal::ALL {
        let key = format!("INR{}", metal.rate_symbol());
        if let Some(rate) = payload.rates.get(&key) {
            rates.insert(metal, *rate);
        }
    }

    Ok(rates)
}

/// Fallback provider with fixed rates, used when no API key is configured.
#[derive(Debug, Clone)]
pub struct StaticRates {
    rates: TroyOunceRates,
}

impl Default for StaticRates {
    fn default() -> Self {
        let mut rates = TroyOunceRates::default();
        rates.insert(Metal::Gold, 220_000.0);
        rates.insert(Metal::Silver, 2_700.0);
        rates.insert(Metal::Platinum, 92_000.0);
        rates.insert(Metal::Palladium, 88_000.0);
        Self { rates }
    }
}

impl RateProvider for StaticRates {
    async fn latest_rates(&self) -> Result<TroyOunceRates, RateError> {
        Ok(self.rates.clone())
    }

    fn source(&self) -> SpotSource {
        SpotSource::Mock
    }
}

/// Provider selected at startup from the environment.
#[derive(Debug, Clone)]
pub enum RateClient {
    Api(MetalPriceApi),
    Static(StaticRates),
}

impl RateClient {
    /// Live client when an API key is present, static fallback otherwise.
    pub fn from_api_key(api_key: Option<String>) -> Self {
        match api_key.filter(|key| !key.is_empty()) {
            Some(key) => RateClient::Api(MetalPriceApi::new(key)),
            None => {
                log::warn!("METALPRICE_API_KEY not set; serving built-in fallback rates");
                RateClient::Static(StaticRates::default())
            }
        }
    }
}

impl RateProvider for RateClient {
    async fn latest_rates(&self) -> Result<TroyOunceRates, RateError> {
        match self {
            RateClient::Api(client) => client.latest_rates().await,
            RateClient::Static(rates) => rates.latest_rates().await,
        }
    }

    fn source(&self) -> SpotSource {
        match self {
            RateClient::Api(client) => client.source(),
            RateClient::Static(rates) => rates.source(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_feed_keys_to_metals() {
        let payload: LatestRatesResponse = serde_json::from_str(
            r#"{
                "success": true,
                "rates": {
                    "INRXAU": 220000.5,
                    "INRXAG": 2650.25,
                    "INRXPT": 91000.0,
                    "INRXPD": 87000.0,
                    "INR": 1.0
                }
            }"#,
        )
        .unwrap();

        let rates = rates_from_response(payload).unwrap();
        assert_eq!(rates.rate_for(Metal::Gold), Some(220000.5));
        assert_eq!(rates.rate_for(Metal::Silver), Some(2650.25));
        assert_eq!(rates.rate_for(Metal::Platinum), Some(91000.0));
        assert_eq!(rates.rate_for(Metal::Palladium), Some(87000.0));
    }

    #[test]
    fn missing_metal_is_left_out() {
        let payload: LatestRatesResponse = serde_json::from_str(
            r#"{"success": true, "rates": {"INRXAU": 220000.0}}"#,
        )
        .unwrap();

        let rates = rates_from_response(payload).unwrap();
        assert_eq!(rates.rate_for(Metal::Gold), Some(220000.0));
        assert_eq!(rates.rate_for(Metal::Silver), None);
    }

    #[test]
    fn unsuccessful_response_is_an_error() {
        let payload: LatestRatesResponse =
            serde_json::from_str(r#"{"success": false, "rates": {}}"#).unwrap();

        assert!(matches!(
            rates_from_response(payload),
            Err(RateError::Upstream)
        ));
    }

    #[test]
    fn latest_url_lists_all_symbols() {
        let client = MetalPriceApi::new("test-key").with_base_url("http://localhost:1234");
        let url = client.latest_url();
        assert!(url.starts_with("http://localhost:1234/v1/latest?api_key=test-key"));
        assert!(url.ends_with("currencies=XAU,XAG,XPT,XPD"));
    }
}

//! Staleness-driven refresh of the spot price store.

use chrono::{Duration, NaiveDateTime};

use crate::GRAMS_PER_TROY_OUNCE;
use crate::domain::metal::Metal;
use crate::domain::spot_price::NewSpotPrice;
use crate::rates::RateProvider;
use crate::repository::{SpotPriceReader, SpotPriceWriter};
use crate::services::ServiceResult;

/// Decides whether the spot price store is old enough to warrant a re-fetch.
/// The clock is passed in explicitly so the decision is testable.
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    max_age: Duration,
}

impl RefreshPolicy {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn from_days(days: i64) -> Self {
        Self::new(Duration::days(days))
    }

    /// True when the store has no rows or its newest row reached `max_age`.
    pub fn is_stale(&self, latest: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
        match latest {
            None => true,
            Some(updated_at) => now - updated_at >= self.max_age,
        }
    }
}

/// Refresh the spot price store when it is stale, otherwise do nothing.
/// Idempotent and safe to call before every pricing query. Feed failures are
/// logged and tolerated; callers proceed with whatever is already stored.
pub async fn ensure_fresh<R, P>(repo: &R, provider: &P, policy: &RefreshPolicy) -> ServiceResult<()>
where
    R: SpotPriceReader + SpotPriceWriter + ?Sized,
    P: RateProvider,
{
    let latest = repo.latest_spot_update()?;
    let now = chrono::Local::now().naive_utc();

    if !policy.is_stale(latest, now) {
        return Ok(());
    }

    refresh_all(repo, provider).await
}

/// Fetch troy-ounce rates and upsert a purity-adjusted price-per-gram row for
/// every (metal, purity) pair. A metal missing from the feed response is
/// skipped for the cycle without touching its stored rows, and a failed
/// upsert never aborts the remaining pairs.
pub async fn refresh_all<R, P>(repo: &R, provider: &P) -> ServiceResult<()>
where
    R: SpotPriceWriter + ?Sized,
    P: RateProvider,
{
    let rates = match provider.latest_rates().await {
        Ok(rates) => rates,
        Err(err) => {
            log::error!("rate feed unavailable, keeping stored spot prices: {err}");
            return Ok(());
        }
    };

    let source = provider.source();

    for metal in Metal::ALL {
        let Some(ounce_rate) = rates.rate_for(metal) else {
            log::warn!("no {metal} quote in rate feed response; keeping stored prices");
            continue;
        };

        let gram_rate = ounce_rate / GRAMS_PER_TROY_OUNCE;

        for (label, fraction) in metal.purities() {
            let payload = NewSpotPrice::new(metal, *label, gram_rate * fraction, source);
            if let Err(err) = repo.upsert_spot_price(&payload) {
                log::error!("failed to store {metal} {label} spot price: {err}");
            }
        }
    }

    Ok(())
}

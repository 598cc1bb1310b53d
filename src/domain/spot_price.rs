use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::metal::Metal;

/// Where a stored spot price came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotSource {
    /// Fetched from the external metals-rate API.
    #[default]
    Api,
    /// Seeded from built-in fallback rates (no API key configured).
    Mock,
}

impl SpotSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotSource::Api => "api",
            SpotSource::Mock => "mock",
        }
    }
}

impl fmt::Display for SpotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpotSource {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "api" => Ok(SpotSource::Api),
            "mock" => Ok(SpotSource::Mock),
            _ => Err(()),
        }
    }
}

/// Domain representation of one stored spot price. At most one row exists per
/// (metal, purity) pair; `price_per_gram` is already purity-adjusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotPrice {
    /// Unique identifier of the record.
    pub id: i32,
    /// Metal the price applies to.
    pub metal: Metal,
    /// Purity label the price applies to (e.g. "22k", "Sterling").
    pub purity: String,
    /// Purity-adjusted price in currency units per gram.
    pub price_per_gram: f64,
    /// Percent change relative to the previously stored value.
    pub percent_change: f64,
    /// Absolute change relative to the previously stored value.
    pub absolute_change: f64,
    /// Origin of the price.
    pub source: SpotSource,
    /// When the record was last overwritten.
    pub updated_at: NaiveDateTime,
}

/// Payload for upserting one spot price. Change figures against the prior
/// stored row are computed by the repository, not the caller.
#[derive(Debug, Clone)]
pub struct NewSpotPrice {
    pub metal: Metal,
    pub purity: String,
    pub price_per_gram: f64,
    pub source: SpotSource,
    /// Timestamp stamped on the row.
    pub updated_at: NaiveDateTime,
}

impl NewSpotPrice {
    /// Build an upsert payload stamped with the current time.
    pub fn new(
        metal: Metal,
        purity: impl Into<String>,
        price_per_gram: f64,
        source: SpotSource,
    ) -> Self {
        Self {
            metal,
            purity: purity.into(),
            price_per_gram,
            source,
            updated_at: chrono::Local::now().naive_utc(),
        }
    }
}

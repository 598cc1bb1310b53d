use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::spot_price::{
    NewSpotPrice as DomainNewSpotPrice, SpotPrice as DomainSpotPrice,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::spot_prices)]
pub struct SpotPrice {
    pub id: i32,
    pub metal: String,
    pub purity: String,
    pub price_per_gram: f64,
    pub percent_change: f64,
    pub absolute_change: f64,
    pub source: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::spot_prices)]
pub struct NewSpotPrice<'a> {
    pub metal: &'a str,
    pub purity: &'a str,
    pub price_per_gram: f64,
    pub percent_change: f64,
    pub absolute_change: f64,
    pub source: &'a str,
    pub updated_at: NaiveDateTime,
}

impl From<SpotPrice> for DomainSpotPrice {
    fn from(value: SpotPrice) -> Self {
        Self {
            id: value.id,
            // Rows are only written through Metal::as_str / SpotSource::as_str,
            // so a failed parse is unreachable in practice.
            metal: value.metal.parse().unwrap_or_default(),
            purity: value.purity,
            price_per_gram: value.price_per_gram,
            percent_change: value.percent_change,
            absolute_change: value.absolute_change,
            source: value.source.parse().unwrap_or_default(),
            updated_at: value.updated_at,
        }
    }
}

impl<'a> NewSpotPrice<'a> {
    /// Build an insertable row from the domain payload and the change figures
    /// computed against the prior stored value.
    pub fn from_domain(
        value: &'a DomainNewSpotPrice,
        percent_change: f64,
        absolute_change: f64,
    ) -> Self {
        Self {
            metal: value.metal.as_str(),
            purity: value.purity.as_str(),
            price_per_gram: value.price_per_gram,
            percent_change,
            absolute_change,
            source: value.source.as_str(),
            updated_at: value.updated_at,
        }
    }
}

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::metal::Metal;
use crate::domain::spot_price::{
    NewSpotPrice as DomainNewSpotPrice, SpotPrice as DomainSpotPrice,
};
use crate::models::spot_price::{NewSpotPrice as DbNewSpotPrice, SpotPrice as DbSpotPrice};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, SpotPriceReader, SpotPriceWriter};

impl SpotPriceReader for DieselRepository {
    fn get_spot_price(
        &self,
        metal: Metal,
        purity: &str,
    ) -> RepositoryResult<Option<DomainSpotPrice>> {
        use crate::schema::spot_prices;

        let mut conn = self.conn()?;
        let row = spot_prices::table
            .filter(spot_prices::metal.eq(metal.as_str()))
            .filter(spot_prices::purity.eq(purity))
            .first::<DbSpotPrice>(&mut conn)
            .optional()?;

        Ok(row.map(Into::into))
    }

    fn list_spot_prices(&self) -> RepositoryResult<Vec<DomainSpotPrice>> {
        use crate::schema::spot_prices;

        let mut conn = self.conn()?;
        let rows = spot_prices::table
            .order((spot_prices::metal.asc(), spot_prices::id.asc()))
            .load::<DbSpotPrice>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn latest_spot_update(&self) -> RepositoryResult<Option<NaiveDateTime>> {
        use crate::schema::spot_prices;
        use diesel::dsl::max;

        let mut conn = self.conn()?;
        let latest = spot_prices::table
            .select(max(spot_prices::updated_at))
            .get_result::<Option<NaiveDateTime>>(&mut conn)?;

        Ok(latest)
    }
}

impl SpotPriceWriter for DieselRepository {
    fn upsert_spot_price(
        &self,
        new_price: &DomainNewSpotPrice,
    ) -> RepositoryResult<DomainSpotPrice> {
        use crate::schema::spot_prices;

        let mut conn = self.conn()?;

        let prior = spot_prices::table
            .filter(spot_prices::metal.eq(new_price.metal.as_str()))
            .filter(spot_prices::purity.eq(new_price.purity.as_str()))
            .first::<DbSpotPrice>(&mut conn)
            .optional()?;

        let (percent_change, absolute_change) = match &prior {
            Some(row) if row.price_per_gram > 0.0 => {
                let absolute = new_price.price_per_gram - row.price_per_gram;
                (absolute / row.price_per_gram * 100.0, absolute)
            }
            Some(row) => (0.0, new_price.price_per_gram - row.price_per_gram),
            None => (0.0, 0.0),
        };

        let db_new = DbNewSpotPrice::from_domain(new_price, percent_change, absolute_change);

        let stored = diesel::insert_into(spot_prices::table)
            .values(&db_new)
            .on_conflict((spot_prices::metal, spot_prices::purity))
            .do_update()
            .set((
                spot_prices::price_per_gram.eq(db_new.price_per_gram),
                spot_prices::percent_change.eq(db_new.percent_change),
                spot_prices::absolute_change.eq(db_new.absolute_change),
                spot_prices::source.eq(db_new.source),
                spot_prices::updated_at.eq(db_new.updated_at),
            ))
            .get_result::<DbSpotPrice>(&mut conn)?;

        Ok(stored.into())
    }
}

use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, Variant as DomainVariant,
};
use crate::models::product::{
    NewProduct as DbNewProduct, NewProductGemstone, NewProductMetal, NewProductVariant,
    NewVariantMetal, Product as DbProduct, ProductGemstone as DbProductGemstone,
    ProductMetal as DbProductMetal, ProductVariant as DbProductVariant,
    VariantMetal as DbVariantMetal,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, ProductListQuery, ProductReader, ProductWriter};

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let product = products::table
            .filter(products::id.eq(id))
            .filter(products::is_deleted.eq(false))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        if let Some(db_product) = product {
            let mut domain: DomainProduct = db_product.into();
            attach_compositions(&mut conn, std::slice::from_mut(&mut domain))?;
            Ok(Some(domain))
        } else {
            Ok(None)
        }
    }

    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProduct>)> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let mut count_query = products::table
            .filter(products::is_deleted.eq(false))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if !query.include_inactive {
            count_query = count_query.filter(products::is_active.eq(true));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = products::table
            .filter(products::is_deleted.eq(false))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if !query.include_inactive {
            items = items.filter(products::is_active.eq(true));
        }

        let db_products = items
            .order(products::created_at.desc())
            .load::<DbProduct>(&mut conn)?;

        let mut domain_products: Vec<DomainProduct> =
            db_products.into_iter().map(Into::into).collect();
        attach_compositions(&mut conn, &mut domain_products)?;

        Ok((total, domain_products))
    }

    fn list_stale_products(
        &self,
        threshold: NaiveDateTime,
        limit: i64,
    ) -> RepositoryResult<Vec<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let db_products = products::table
            .filter(products::is_active.eq(true))
            .filter(products::is_deleted.eq(false))
            .filter(
                products::latest_price_update
                    .is_null()
                    .or(products::latest_price_update.lt(threshold)),
            )
            .order(products::latest_price_update.asc())
            .limit(limit)
            .load::<DbProduct>(&mut conn)?;

        let mut domain_products: Vec<DomainProduct> =
            db_products.into_iter().map(Into::into).collect();
        attach_compositions(&mut conn, &mut domain_products)?;

        Ok(domain_products)
    }

    fn count_stale_products(&self, threshold: NaiveDateTime) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let total = products::table
            .filter(products::is_active.eq(true))
            .filter(products::is_deleted.eq(false))
            .filter(
                products::latest_price_update
                    .is_null()
                    .or(products::latest_price_update.lt(threshold)),
            )
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total as usize)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        use crate::schema::{product_gemstones, product_metals, product_variants, variant_metals};
        use crate::schema::products;

        let mut conn = self.conn()?;

        let created_id = conn.transaction::<i32, RepositoryError, _>(|conn| {
            let db_new = DbNewProduct {
                name: new_product.name.as_str(),
                sku: new_product.sku.as_deref(),
                description: new_product.description.as_deref(),
                making_charge: new_product.making_charge,
                tax_percent: new_product.tax_percent,
                is_active: new_product.is_active,
                updated_at: new_product.updated_at,
            };

            let created = diesel::insert_into(products::table)
                .values(&db_new)
                .get_result::<DbProduct>(conn)?;

            let metal_rows: Vec<NewProductMetal> = new_product
                .metals
                .iter()
                .enumerate()
                .map(|(position, line)| NewProductMetal {
                    product_id: created.id,
                    metal: line.metal.as_str(),
                    purity: line.purity.as_str(),
                    weight_grams: line.weight_grams,
                    position: position as i32,
                })
                .collect();
            if !metal_rows.is_empty() {
                diesel::insert_into(product_metals::table)
                    .values(&metal_rows)
                    .execute(conn)?;
            }

            let gem_rows: Vec<NewProductGemstone> = new_product
                .gemstones
                .iter()
                .enumerate()
                .map(|(position, line)| NewProductGemstone {
                    product_id: created.id,
                    kind: line.kind.as_str(),
                    carat_weight: line.carat_weight,
                    quantity: line.quantity,
                    price_per_item: line.price_per_item,
                    position: position as i32,
                })
                .collect();
            if !gem_rows.is_empty() {
                diesel::insert_into(product_gemstones::table)
                    .values(&gem_rows)
                    .execute(conn)?;
            }

            for (position, variant) in new_product.variants.iter().enumerate() {
                let created_variant = diesel::insert_into(product_variants::table)
                    .values(&NewProductVariant {
                        product_id: created.id,
                        label: variant.label.as_str(),
                        making_charge: variant.making_charge,
                        position: position as i32,
                    })
                    .get_result::<DbProductVariant>(conn)?;

                let variant_metal_rows: Vec<NewVariantMetal> = variant
                    .metals
                    .iter()
                    .enumerate()
                    .map(|(line_position, line)| NewVariantMetal {
                        variant_id: created_variant.id,
                        metal: line.metal.as_str(),
                        purity: line.purity.as_str(),
                        weight_grams: line.weight_grams,
                        position: line_position as i32,
                    })
                    .collect();
                if !variant_metal_rows.is_empty() {
                    diesel::insert_into(variant_metals::table)
                        .values(&variant_metal_rows)
                        .execute(conn)?;
                }
            }

            Ok(created.id)
        })?;

        let created = products::table
            .filter(products::id.eq(created_id))
            .first::<DbProduct>(&mut conn)?;

        let mut domain: DomainProduct = created.into();
        attach_compositions(&mut conn, std::slice::from_mut(&mut domain))?;

        Ok(domain)
    }

    fn set_product_price(
        &self,
        product_id: i32,
        total_price: f64,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let target = products::table
            .filter(products::id.eq(product_id))
            .filter(products::is_deleted.eq(false));

        let updated = diesel::update(target)
            .set((
                products::total_price.eq(total_price),
                products::latest_price_update.eq(updated_at),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn set_variant_price(
        &self,
        product_id: i32,
        variant_id: i32,
        total_price: f64,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        use crate::schema::{product_variants, products};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let target = product_variants::table
                .filter(product_variants::id.eq(variant_id))
                .filter(product_variants::product_id.eq(product_id));

            let updated = diesel::update(target)
                .set(product_variants::total_price.eq(total_price))
                .execute(conn)?;

            if updated == 0 {
                return Err(RepositoryError::NotFound);
            }

            diesel::update(products::table.filter(products::id.eq(product_id)))
                .set(products::latest_price_update.eq(updated_at))
                .execute(conn)?;

            Ok(())
        })
    }
}

/// Attach metal, gemstone and variant lines to already-loaded products,
/// preserving the stored line order.
fn attach_compositions(
    conn: &mut SqliteConnection,
    products: &mut [DomainProduct],
) -> RepositoryResult<()> {
    use crate::schema::{product_gemstones, product_metals, product_variants, variant_metals};

    if products.is_empty() {
        return Ok(());
    }

    let product_ids: Vec<i32> = products.iter().map(|product| product.id).collect();

    let metal_rows = product_metals::table
        .filter(product_metals::product_id.eq_any(&product_ids))
        .order(product_metals::position.asc())
        .load::<DbProductMetal>(conn)?;
    let mut metals_by_product: HashMap<i32, Vec<_>> = HashMap::new();
    for row in metal_rows {
        metals_by_product
            .entry(row.product_id)
            .or_default()
            .push(row.into());
    }

    let gem_rows = product_gemstones::table
        .filter(product_gemstones::product_id.eq_any(&product_ids))
        .order(product_gemstones::position.asc())
        .load::<DbProductGemstone>(conn)?;
    let mut gems_by_product: HashMap<i32, Vec<_>> = HashMap::new();
    for row in gem_rows {
        gems_by_product
            .entry(row.product_id)
            .or_default()
            .push(row.into());
    }

    let variant_rows = product_variants::table
        .filter(product_variants::product_id.eq_any(&product_ids))
        .order(product_variants::position.asc())
        .load::<DbProductVariant>(conn)?;
    let variant_ids: Vec<i32> = variant_rows.iter().map(|row| row.id).collect();

    let variant_metal_rows = variant_metals::table
        .filter(variant_metals::variant_id.eq_any(&variant_ids))
        .order(variant_metals::position.asc())
        .load::<DbVariantMetal>(conn)?;
    let mut metals_by_variant: HashMap<i32, Vec<_>> = HashMap::new();
    for row in variant_metal_rows {
        metals_by_variant
            .entry(row.variant_id)
            .or_default()
            .push(row.into());
    }

    let mut variants_by_product: HashMap<i32, Vec<DomainVariant>> = HashMap::new();
    for row in variant_rows {
        let product_id = row.product_id;
        let mut variant: DomainVariant = row.into();
        variant.metals = metals_by_variant.remove(&variant.id).unwrap_or_default();
        variants_by_product
            .entry(product_id)
            .or_default()
            .push(variant);
    }

    for product in products {
        product.metals = metals_by_product.remove(&product.id).unwrap_or_default();
        product.gemstones = gems_by_product.remove(&product.id).unwrap_or_default();
        product.variants = variants_by_product.remove(&product.id).unwrap_or_default();
    }

    Ok(())
}

use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::auth::StoreScope;
use crate::domain::product::{
    NewProduct as DomainNewProduct, NewProductVariant as DomainNewProductVariant,
    Product as DomainProduct, ProductListQuery, ProductStatus,
    ProductVariant as DomainProductVariant, UpdateProduct as DomainUpdateProduct,
};
use crate::models::product::{
    NewProduct as DbNewProduct, NewProductVariant as DbNewProductVariant, Product as DbProduct,
    ProductVariant as DbProductVariant, UpdateProduct as DbUpdateProduct,
};
use crate::repository::category::ensure_category_in_store;
use crate::repository::{
    DieselRepository, ProductReader, ProductWriter, RepositoryError, RepositoryResult,
};

impl ProductReader for DieselRepository {
    fn get_product_by_id(
        &self,
        scope: &StoreScope,
        product_id: i32,
    ) -> RepositoryResult<Option<DomainProduct>> {
        let mut conn = self.conn()?;

        let Some(product) = find_product(&mut conn, scope, product_id)? else {
            return Ok(None);
        };

        let mut products = with_variants(&mut conn, vec![product])?;
        Ok(products.pop())
    }

    fn get_products_by_ids(
        &self,
        scope: &StoreScope,
        product_ids: &[i32],
    ) -> RepositoryResult<Vec<DomainProduct>> {
        use crate::schema::products;

        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;

        let mut query = products::table
            .filter(products::id.eq_any(product_ids))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            query = query.filter(products::store_id.eq(store_id));
        }

        let rows = query
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?;

        with_variants(&mut conn, rows)
    }

    fn list_products(
        &self,
        scope: &StoreScope,
        query: &ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProduct>)> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let search_pattern = query.search.as_ref().map(|term| format!("%{}%", term));

        let mut count_query = products::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            count_query = count_query.filter(products::store_id.eq(store_id));
        }

        match query.status {
            Some(status) => count_query = count_query.filter(products::status.eq(status.as_str())),
            None => {
                count_query =
                    count_query.filter(products::status.ne(ProductStatus::Archived.as_str()))
            }
        }

        if let Some(category_id) = query.category_id {
            count_query = count_query.filter(products::category_id.eq(category_id));
        }

        if let Some(ref pattern) = search_pattern {
            count_query = count_query.filter(
                products::name
                    .like(pattern.clone())
                    .or(products::sku.like(pattern.clone()))
                    .or(products::description.like(pattern.clone())),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = products::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            items = items.filter(products::store_id.eq(store_id));
        }

        match query.status {
            Some(status) => items = items.filter(products::status.eq(status.as_str())),
            None => items = items.filter(products::status.ne(ProductStatus::Archived.as_str())),
        }

        if let Some(category_id) = query.category_id {
            items = items.filter(products::category_id.eq(category_id));
        }

        if let Some(ref pattern) = search_pattern {
            items = items.filter(
                products::name
                    .like(pattern.clone())
                    .or(products::sku.like(pattern.clone()))
                    .or(products::description.like(pattern.clone())),
            );
        }

        items = items.order((products::name.asc(), products::id.asc()));

        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items.load::<DbProduct>(&mut conn)?;
        if rows.is_empty() {
            return Ok((total, Vec::new()));
        }

        Ok((total, with_variants(&mut conn, rows)?))
    }

    fn count_products(&self, scope: &StoreScope) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let mut query = products::table
            .filter(products::status.ne(ProductStatus::Archived.as_str()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            query = query.filter(products::store_id.eq(store_id));
        }

        Ok(query.count().get_result::<i64>(&mut conn)? as usize)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;
        let created = insert_product(&mut conn, new_product)?;
        Ok(created.into_domain(Vec::new())?)
    }

    fn create_products(&self, new_products: &[DomainNewProduct]) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            for new_product in new_products {
                insert_product(conn, new_product)?;
            }
            Ok(new_products.len())
        })
    }

    fn update_product(
        &self,
        scope: &StoreScope,
        product_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let updated = conn.transaction::<DbProduct, RepositoryError, _>(|conn| {
            let existing =
                find_product(conn, scope, product_id)?.ok_or(RepositoryError::NotFound)?;

            if let Some(category_id) = updates.category_id {
                ensure_category_in_store(conn, existing.store_id, category_id)?;
            }

            Ok(diesel::update(products::table.find(existing.id))
                .set(&DbUpdateProduct::from(updates))
                .get_result::<DbProduct>(conn)?)
        })?;

        let mut products = with_variants(&mut conn, vec![updated])?;
        products.pop().ok_or(RepositoryError::NotFound)
    }

    fn archive_product(&self, scope: &StoreScope, product_id: i32) -> RepositoryResult<()> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let existing =
            find_product(&mut conn, scope, product_id)?.ok_or(RepositoryError::NotFound)?;

        diesel::update(products::table.find(existing.id))
            .set((
                products::status.eq(ProductStatus::Archived.as_str()),
                products::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    fn add_variant(
        &self,
        scope: &StoreScope,
        new_variant: &DomainNewProductVariant,
    ) -> RepositoryResult<DomainProductVariant> {
        use crate::schema::product_variants;

        let mut conn = self.conn()?;

        let product = find_product(&mut conn, scope, new_variant.product_id)?
            .ok_or(RepositoryError::NotFound)?;

        let insertable = DbNewProductVariant::from_domain(product.store_id, new_variant)?;

        let created = diesel::insert_into(product_variants::table)
            .values(&insertable)
            .get_result::<DbProductVariant>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn delete_variant(
        &self,
        scope: &StoreScope,
        product_id: i32,
        variant_id: i32,
    ) -> RepositoryResult<()> {
        use crate::schema::product_variants;

        let mut conn = self.conn()?;

        let product =
            find_product(&mut conn, scope, product_id)?.ok_or(RepositoryError::NotFound)?;

        let deleted = diesel::delete(
            product_variants::table
                .filter(product_variants::id.eq(variant_id))
                .filter(product_variants::product_id.eq(product.id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn insert_product(
    conn: &mut SqliteConnection,
    new_product: &DomainNewProduct,
) -> RepositoryResult<DbProduct> {
    use crate::schema::products;

    if let Some(category_id) = new_product.category_id {
        ensure_category_in_store(conn, new_product.store_id, category_id)?;
    }

    Ok(diesel::insert_into(products::table)
        .values(&DbNewProduct::from(new_product))
        .get_result::<DbProduct>(conn)?)
}

pub(super) fn find_product(
    conn: &mut SqliteConnection,
    scope: &StoreScope,
    product_id: i32,
) -> RepositoryResult<Option<DbProduct>> {
    use crate::schema::products;

    let mut query = products::table
        .filter(products::id.eq(product_id))
        .into_boxed::<diesel::sqlite::Sqlite>();

    if let Some(store_id) = scope.store_id() {
        query = query.filter(products::store_id.eq(store_id));
    }

    Ok(query.first::<DbProduct>(conn).optional()?)
}

/// Load the variants of `rows` and assemble domain products, keeping row order.
pub(super) fn with_variants(
    conn: &mut SqliteConnection,
    rows: Vec<DbProduct>,
) -> RepositoryResult<Vec<DomainProduct>> {
    use crate::schema::product_variants;

    let product_ids: Vec<i32> = rows.iter().map(|product| product.id).collect();

    let mut variants_by_product: HashMap<i32, Vec<DomainProductVariant>> = HashMap::new();

    if !product_ids.is_empty() {
        let variants = product_variants::table
            .filter(product_variants::product_id.eq_any(&product_ids))
            .order(product_variants::id.asc())
            .load::<DbProductVariant>(conn)?;

        for variant in variants {
            let variant = DomainProductVariant::try_from(variant)?;
            variants_by_product
                .entry(variant.product_id)
                .or_default()
                .push(variant);
        }
    }

    rows.into_iter()
        .map(|product| {
            let variants = variants_by_product.remove(&product.id).unwrap_or_default();
            product.into_domain(variants).map_err(RepositoryError::from)
        })
        .collect()
}

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::auth::StoreScope;
use crate::domain::inventory::{
    InventoryAdjustment as DomainInventoryAdjustment, LowStockItem, MAX_STOCK_QUANTITY,
    StockAdjustment,
};
use crate::domain::order::NewOrderItem;
use crate::domain::product::{Product as DomainProduct, ProductStatus};
use crate::models::inventory::{
    InventoryAdjustment as DbInventoryAdjustment, NewInventoryAdjustment,
};
use crate::models::product::{Product as DbProduct, ProductVariant as DbProductVariant};
use crate::pagination::Pagination;
use crate::repository::product::{find_product, with_variants};
use crate::repository::{
    DieselRepository, InventoryReader, InventoryWriter, RepositoryError, RepositoryResult,
};

impl InventoryReader for DieselRepository {
    fn list_low_stock(&self, scope: &StoreScope) -> RepositoryResult<Vec<LowStockItem>> {
        use crate::schema::{product_variants, products};

        let mut conn = self.conn()?;

        let mut query = products::table
            .filter(products::track_inventory.eq(true))
            .filter(products::status.ne(ProductStatus::Archived.as_str()))
            .filter(products::stock_quantity.le(products::low_stock_threshold))
            .into_boxed::<diesel::sqlite::Sqlite>();

        let mut variant_query = product_variants::table
            .inner_join(products::table)
            .filter(products::track_inventory.eq(true))
            .filter(products::status.ne(ProductStatus::Archived.as_str()))
            .filter(product_variants::stock_quantity.le(products::low_stock_threshold))
            .select((DbProductVariant::as_select(), DbProduct::as_select()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            query = query.filter(products::store_id.eq(store_id));
            variant_query = variant_query.filter(products::store_id.eq(store_id));
        }

        let rows = query.load::<DbProduct>(&mut conn)?;
        let variant_rows = variant_query.load::<(DbProductVariant, DbProduct)>(&mut conn)?;

        let mut items: Vec<LowStockItem> = rows
            .into_iter()
            .map(low_stock_item)
            .chain(variant_rows.into_iter().map(low_stock_variant))
            .collect();
        items.sort_by(|a, b| {
            a.stock_quantity
                .cmp(&b.stock_quantity)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(items)
    }

    fn list_adjustments(
        &self,
        scope: &StoreScope,
        product_id: Option<i32>,
        pagination: Pagination,
    ) -> RepositoryResult<(usize, Vec<DomainInventoryAdjustment>)> {
        use crate::schema::inventory_adjustments;

        let mut conn = self.conn()?;

        let mut count_query = inventory_adjustments::table.into_boxed::<diesel::sqlite::Sqlite>();
        let mut items = inventory_adjustments::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            count_query = count_query.filter(inventory_adjustments::store_id.eq(store_id));
            items = items.filter(inventory_adjustments::store_id.eq(store_id));
        }

        if let Some(product_id) = product_id {
            count_query = count_query.filter(inventory_adjustments::product_id.eq(product_id));
            items = items.filter(inventory_adjustments::product_id.eq(product_id));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let rows = items
            .order(inventory_adjustments::id.desc())
            .offset(pagination.offset())
            .limit(pagination.limit())
            .load::<DbInventoryAdjustment>(&mut conn)?;

        let adjustments = rows
            .into_iter()
            .map(|row| DomainInventoryAdjustment::try_from(row).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, adjustments))
    }
}

impl InventoryWriter for DieselRepository {
    fn adjust_stock(
        &self,
        scope: &StoreScope,
        adjustment: &StockAdjustment,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::{inventory_adjustments, product_variants, products};

        let mut conn = self.conn()?;

        let updated = conn.immediate_transaction::<DbProduct, RepositoryError, _>(|conn| {
            let product = find_product(conn, scope, adjustment.product_id)?
                .ok_or(RepositoryError::NotFound)?;
            let delta = adjustment.delta;
            let now = Utc::now().naive_utc();

            // Stock stays within [0, MAX_STOCK_QUANTITY] after the change.
            let floor = delta.checked_neg().unwrap_or(i32::MAX).max(0);
            let ceiling = MAX_STOCK_QUANTITY.saturating_sub(delta.max(0));

            let affected = match adjustment.variant_id {
                Some(variant_id) => diesel::update(
                    product_variants::table
                        .filter(product_variants::id.eq(variant_id))
                        .filter(product_variants::product_id.eq(product.id))
                        .filter(product_variants::stock_quantity.ge(floor))
                        .filter(product_variants::stock_quantity.le(ceiling)),
                )
                .set((
                    product_variants::stock_quantity.eq(product_variants::stock_quantity + delta),
                    product_variants::updated_at.eq(now),
                ))
                .execute(conn)?,
                None => diesel::update(
                    products::table
                        .filter(products::id.eq(product.id))
                        .filter(products::stock_quantity.ge(floor))
                        .filter(products::stock_quantity.le(ceiling)),
                )
                .set((
                    products::stock_quantity.eq(products::stock_quantity + delta),
                    products::updated_at.eq(now),
                ))
                .execute(conn)?,
            };

            if affected == 0 {
                return match adjustment.variant_id {
                    Some(variant_id) if !variant_exists(conn, product.id, variant_id)? => {
                        Err(RepositoryError::NotFound)
                    }
                    _ if delta > 0 => Err(RepositoryError::Conflict(format!(
                        "stock for product {} cannot exceed {MAX_STOCK_QUANTITY}",
                        product.id
                    ))),
                    _ => Err(RepositoryError::InsufficientStock {
                        product_id: product.id,
                    }),
                };
            }

            diesel::insert_into(inventory_adjustments::table)
                .values(
                    &NewInventoryAdjustment::new(
                        product.store_id,
                        product.id,
                        delta,
                        adjustment.reason,
                    )
                    .variant(adjustment.variant_id),
                )
                .execute(conn)?;

            Ok(products::table.find(product.id).first::<DbProduct>(conn)?)
        })?;

        let mut products = with_variants(&mut conn, vec![updated])?;
        products.pop().ok_or(RepositoryError::NotFound)
    }
}

fn variant_exists(
    conn: &mut SqliteConnection,
    product_id: i32,
    variant_id: i32,
) -> RepositoryResult<bool> {
    use crate::schema::product_variants;

    let found = product_variants::table
        .filter(product_variants::id.eq(variant_id))
        .filter(product_variants::product_id.eq(product_id))
        .select(product_variants::id)
        .first::<i32>(conn)
        .optional()?;

    Ok(found.is_some())
}

/// Stock levels touched by `items` that are now at or below the product threshold.
pub(super) fn low_stock_products(
    conn: &mut SqliteConnection,
    store_id: i32,
    items: &[&NewOrderItem],
) -> RepositoryResult<Vec<LowStockItem>> {
    use crate::schema::{product_variants, products};

    let product_ids: Vec<i32> = items
        .iter()
        .filter(|item| item.variant_id.is_none())
        .map(|item| item.product_id)
        .collect();
    let variant_ids: Vec<i32> = items.iter().filter_map(|item| item.variant_id).collect();

    let mut low = Vec::new();

    if !product_ids.is_empty() {
        let rows = products::table
            .filter(products::store_id.eq(store_id))
            .filter(products::id.eq_any(&product_ids))
            .filter(products::track_inventory.eq(true))
            .filter(products::stock_quantity.le(products::low_stock_threshold))
            .order(products::id.asc())
            .load::<DbProduct>(conn)?;
        low.extend(rows.into_iter().map(low_stock_item));
    }

    if !variant_ids.is_empty() {
        let rows = product_variants::table
            .inner_join(products::table)
            .filter(products::store_id.eq(store_id))
            .filter(product_variants::id.eq_any(&variant_ids))
            .filter(products::track_inventory.eq(true))
            .filter(product_variants::stock_quantity.le(products::low_stock_threshold))
            .order(product_variants::id.asc())
            .select((DbProductVariant::as_select(), DbProduct::as_select()))
            .load::<(DbProductVariant, DbProduct)>(conn)?;
        low.extend(rows.into_iter().map(low_stock_variant));
    }

    Ok(low)
}

fn low_stock_item(product: DbProduct) -> LowStockItem {
    LowStockItem {
        store_id: product.store_id,
        product_id: product.id,
        variant_id: None,
        name: product.name,
        sku: product.sku,
        stock_quantity: product.stock_quantity,
        low_stock_threshold: product.low_stock_threshold,
    }
}

fn low_stock_variant((variant, product): (DbProductVariant, DbProduct)) -> LowStockItem {
    LowStockItem {
        store_id: product.store_id,
        product_id: product.id,
        variant_id: Some(variant.id),
        name: format!("{} / {}", product.name, variant.name),
        sku: variant.sku.or(product.sku),
        stock_quantity: variant.stock_quantity,
        low_stock_threshold: product.low_stock_threshold,
    }
}

use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::auth::StoreScope;
use crate::domain::inventory::AdjustmentReason;
use crate::domain::order::{
    Order as DomainOrder, OrderListQuery, OrderStatusEvent as DomainOrderStatusEvent,
    OrderStatusUpdate,
};
use crate::models::inventory::{
    InventoryAdjustment as DbInventoryAdjustment, NewInventoryAdjustment,
};
use crate::models::order::{
    NewOrderStatusEvent, Order as DbOrder, OrderItem as DbOrderItem, OrderStatusChangeset,
    OrderStatusEvent as DbOrderStatusEvent,
};
use crate::repository::{
    DieselRepository, OrderReader, OrderWriter, RepositoryError, RepositoryResult,
};

impl OrderReader for DieselRepository {
    fn get_order_by_id(
        &self,
        scope: &StoreScope,
        order_id: i32,
    ) -> RepositoryResult<Option<DomainOrder>> {
        let mut conn = self.conn()?;

        let Some(order) = find_order(&mut conn, scope, order_id)? else {
            return Ok(None);
        };

        load_order(&mut conn, order).map(Some)
    }

    fn list_orders(
        &self,
        scope: &StoreScope,
        query: &OrderListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainOrder>)> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;

        let search_pattern = query.search.as_ref().map(|term| format!("%{}%", term));

        let mut count_query = orders::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            count_query = count_query.filter(orders::store_id.eq(store_id));
        }

        if let Some(status) = query.status {
            count_query = count_query.filter(orders::status.eq(status.as_str()));
        }

        if let Some(customer) = query.customer_id {
            count_query = count_query.filter(orders::customer_id.eq(Some(customer)));
        }

        if let Some(from) = query.created_from {
            count_query = count_query.filter(orders::created_at.ge(from));
        }

        if let Some(to) = query.created_to {
            count_query = count_query.filter(orders::created_at.lt(to));
        }

        if let Some(ref pattern) = search_pattern {
            count_query = count_query.filter(
                orders::order_number
                    .like(pattern.clone())
                    .or(orders::shipping_name.like(pattern.clone()))
                    .or(orders::notes.like(pattern.clone())),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = orders::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            items = items.filter(orders::store_id.eq(store_id));
        }

        if let Some(status) = query.status {
            items = items.filter(orders::status.eq(status.as_str()));
        }

        if let Some(customer) = query.customer_id {
            items = items.filter(orders::customer_id.eq(Some(customer)));
        }

        if let Some(from) = query.created_from {
            items = items.filter(orders::created_at.ge(from));
        }

        if let Some(to) = query.created_to {
            items = items.filter(orders::created_at.lt(to));
        }

        if let Some(ref pattern) = search_pattern {
            items = items.filter(
                orders::order_number
                    .like(pattern.clone())
                    .or(orders::shipping_name.like(pattern.clone()))
                    .or(orders::notes.like(pattern.clone())),
            );
        }

        items = items.order((orders::created_at.desc(), orders::id.desc()));

        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let db_orders = items.load::<DbOrder>(&mut conn)?;
        if db_orders.is_empty() {
            return Ok((total, Vec::new()));
        }

        let order_ids: Vec<i32> = db_orders.iter().map(|order| order.id).collect();

        let mut items_by_order: HashMap<i32, Vec<DbOrderItem>> = HashMap::new();

        let rows = order_items::table
            .filter(order_items::order_id.eq_any(&order_ids))
            .order(order_items::id.asc())
            .load::<DbOrderItem>(&mut conn)?;

        for item in rows {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        let orders = db_orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                order.into_domain(items).map_err(RepositoryError::from)
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, orders))
    }

    fn list_order_events(
        &self,
        scope: &StoreScope,
        order_id: i32,
    ) -> RepositoryResult<Vec<DomainOrderStatusEvent>> {
        use crate::schema::order_status_events;

        let mut conn = self.conn()?;

        let order = find_order(&mut conn, scope, order_id)?.ok_or(RepositoryError::NotFound)?;

        let events = order_status_events::table
            .filter(order_status_events::order_id.eq(order.id))
            .order(order_status_events::id.asc())
            .load::<DbOrderStatusEvent>(&mut conn)?;

        events
            .into_iter()
            .map(|event| DomainOrderStatusEvent::try_from(event).map_err(RepositoryError::from))
            .collect()
    }

    fn count_orders_since(
        &self,
        scope: &StoreScope,
        since: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        let mut query = orders::table
            .filter(orders::created_at.ge(since))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            query = query.filter(orders::store_id.eq(store_id));
        }

        Ok(query.count().get_result::<i64>(&mut conn)? as usize)
    }
}

impl OrderWriter for DieselRepository {
    fn update_order_status(
        &self,
        scope: &StoreScope,
        order_id: i32,
        update: &OrderStatusUpdate,
    ) -> RepositoryResult<DomainOrder> {
        use crate::schema::{order_items, order_status_events, orders};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let order = find_order(conn, scope, order_id)?.ok_or(RepositoryError::NotFound)?;

            if order.status != update.from.as_str() {
                return Err(RepositoryError::Conflict(format!(
                    "order status changed to {} in the meantime",
                    order.status
                )));
            }

            let updated = diesel::update(orders::table.find(order.id))
                .set(&OrderStatusChangeset::from(update))
                .get_result::<DbOrder>(conn)?;

            diesel::insert_into(order_status_events::table)
                .values(&NewOrderStatusEvent {
                    order_id: order.id,
                    from_status: Some(update.from.as_str()),
                    to_status: update.to.as_str(),
                    note: update.note.as_deref(),
                    changed_by: update.changed_by,
                })
                .execute(conn)?;

            let items = order_items::table
                .filter(order_items::order_id.eq(order.id))
                .order(order_items::id.asc())
                .load::<DbOrderItem>(conn)?;

            if update.restock {
                restock_items(conn, &updated)?;
            }

            Ok(updated.into_domain(items)?)
        })
    }
}

/// Put back the stock checkout deducted for `order`, as recorded in the ledger.
fn restock_items(conn: &mut SqliteConnection, order: &DbOrder) -> RepositoryResult<()> {
    use crate::schema::{inventory_adjustments, product_variants, products};

    let deductions = inventory_adjustments::table
        .filter(inventory_adjustments::order_id.eq(order.id))
        .filter(inventory_adjustments::reason.eq(AdjustmentReason::OrderPlaced.as_str()))
        .order(inventory_adjustments::id.asc())
        .load::<DbInventoryAdjustment>(conn)?;

    for deduction in deductions {
        let quantity = deduction.delta.saturating_neg();
        if quantity <= 0 {
            continue;
        }

        let affected = match deduction.variant_id {
            Some(variant_id) => diesel::update(
                product_variants::table
                    .filter(product_variants::id.eq(variant_id))
                    .filter(product_variants::product_id.eq(deduction.product_id)),
            )
            .set(product_variants::stock_quantity.eq(product_variants::stock_quantity + quantity))
            .execute(conn)?,
            None => diesel::update(products::table.find(deduction.product_id))
                .set(products::stock_quantity.eq(products::stock_quantity + quantity))
                .execute(conn)?,
        };

        // The variant was removed after checkout.
        if affected == 0 {
            log::warn!(
                "order {}: variant {:?} of product {} is gone, {} units not restocked",
                order.id,
                deduction.variant_id,
                deduction.product_id,
                quantity
            );
            continue;
        }

        diesel::insert_into(inventory_adjustments::table)
            .values(
                &NewInventoryAdjustment::new(
                    order.store_id,
                    deduction.product_id,
                    quantity,
                    AdjustmentReason::OrderCanceled,
                )
                .variant(deduction.variant_id)
                .order(order.id),
            )
            .execute(conn)?;
    }

    Ok(())
}

pub(super) fn find_order(
    conn: &mut SqliteConnection,
    scope: &StoreScope,
    order_id: i32,
) -> RepositoryResult<Option<DbOrder>> {
    use crate::schema::orders;

    let mut query = orders::table
        .filter(orders::id.eq(order_id))
        .into_boxed::<diesel::sqlite::Sqlite>();

    if let Some(store_id) = scope.store_id() {
        query = query.filter(orders::store_id.eq(store_id));
    }

    Ok(query.first::<DbOrder>(conn).optional()?)
}

pub(super) fn load_order(
    conn: &mut SqliteConnection,
    order: DbOrder,
) -> RepositoryResult<DomainOrder> {
    use crate::schema::order_items;

    let items = order_items::table
        .filter(order_items::order_id.eq(order.id))
        .order(order_items::id.asc())
        .load::<DbOrderItem>(conn)?;

    Ok(order.into_domain(items)?)
}

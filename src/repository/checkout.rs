use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::auth::StoreScope;
use crate::domain::inventory::AdjustmentReason;
use crate::domain::order::{NewOrder as DomainNewOrder, NewOrderItem as DomainNewOrderItem, OrderStatus};
use crate::domain::product::ProductStatus;
use crate::models::inventory::NewInventoryAdjustment;
use crate::models::order::{
    NewOrder as DbNewOrder, NewOrderItem as DbNewOrderItem, NewOrderStatusEvent,
    Order as DbOrder,
};
use crate::models::product::Product as DbProduct;
use crate::repository::inventory::low_stock_products;
use crate::repository::order::load_order;
use crate::repository::{
    CheckoutWriter, DieselRepository, PlacedOrder, RepositoryError, RepositoryResult,
};

impl CheckoutWriter for DieselRepository {
    fn place_order(
        &self,
        scope: &StoreScope,
        new_order: &DomainNewOrder,
    ) -> RepositoryResult<PlacedOrder> {
        use crate::schema::{inventory_adjustments, order_items, order_status_events, orders};

        if !scope.allows(new_order.store_id) {
            return Err(RepositoryError::NotFound);
        }

        let mut conn = self.conn()?;

        // BEGIN IMMEDIATE takes the write lock up front, so concurrent
        // checkouts queue on busy_timeout instead of interleaving.
        conn.immediate_transaction::<PlacedOrder, RepositoryError, _>(|conn| {
            if let Some(allowance) = new_order.allowance {
                let placed = orders::table
                    .filter(orders::store_id.eq(new_order.store_id))
                    .filter(orders::created_at.ge(allowance.since))
                    .count()
                    .get_result::<i64>(conn)?;
                if placed as usize >= allowance.max_orders {
                    return Err(RepositoryError::LimitReached(format!(
                        "at most {} orders are allowed this period",
                        allowance.max_orders
                    )));
                }
            }

            let mut tracked = Vec::with_capacity(new_order.items.len());
            for item in &new_order.items {
                if reserve_item(conn, new_order.store_id, item)? {
                    tracked.push(item);
                }
            }

            if let Some(discount_id) = new_order.discount_code_id {
                redeem_discount(conn, new_order.store_id, discount_id)?;
            }

            let last_seq = orders::table
                .filter(orders::store_id.eq(new_order.store_id))
                .select(max(orders::order_seq))
                .first::<Option<i32>>(conn)?;
            let order_seq = last_seq.unwrap_or(0) + 1;

            let order = diesel::insert_into(orders::table)
                .values(&DbNewOrder::from_domain(new_order, order_seq))
                .get_result::<DbOrder>(conn)?;

            for item in &new_order.items {
                diesel::insert_into(order_items::table)
                    .values(&DbNewOrderItem::from_domain(order.id, item))
                    .execute(conn)?;
            }

            for item in &tracked {
                diesel::insert_into(inventory_adjustments::table)
                    .values(
                        &NewInventoryAdjustment::new(
                            new_order.store_id,
                            item.product_id,
                            -item.quantity,
                            AdjustmentReason::OrderPlaced,
                        )
                        .variant(item.variant_id)
                        .order(order.id),
                    )
                    .execute(conn)?;
            }

            diesel::insert_into(order_status_events::table)
                .values(&NewOrderStatusEvent {
                    order_id: order.id,
                    from_status: None,
                    to_status: OrderStatus::Pending.as_str(),
                    note: None,
                    changed_by: new_order.placed_by,
                })
                .execute(conn)?;

            let low_stock = low_stock_products(conn, new_order.store_id, &tracked)?;

            Ok(PlacedOrder {
                order: load_order(conn, order)?,
                low_stock,
            })
        })
    }
}

/// Re-check the quoted price and deduct stock for one line. Returns whether
/// the line is inventory tracked.
fn reserve_item(
    conn: &mut SqliteConnection,
    store_id: i32,
    item: &DomainNewOrderItem,
) -> RepositoryResult<bool> {
    use crate::schema::{product_variants, products};

    let product = products::table
        .filter(products::id.eq(item.product_id))
        .filter(products::store_id.eq(store_id))
        .first::<DbProduct>(conn)
        .optional()?
        .filter(|product| product.status == ProductStatus::Active.as_str())
        .ok_or_else(|| {
            RepositoryError::Conflict(format!("product {} is no longer available", item.product_id))
        })?;

    let current_price = match item.variant_id {
        Some(variant_id) => product_variants::table
            .filter(product_variants::id.eq(variant_id))
            .filter(product_variants::product_id.eq(product.id))
            .select(product_variants::price_cents)
            .first::<Option<i64>>(conn)
            .optional()?
            .ok_or_else(|| {
                RepositoryError::Conflict(format!("variant {variant_id} is no longer available"))
            })?
            .unwrap_or(product.price_cents),
        None => product.price_cents,
    };

    if current_price != item.unit_price_cents {
        return Err(RepositoryError::PriceChanged {
            product_id: product.id,
        });
    }

    if !product.track_inventory {
        return Ok(false);
    }

    let affected = match item.variant_id {
        Some(variant_id) => diesel::update(
            product_variants::table
                .filter(product_variants::id.eq(variant_id))
                .filter(product_variants::stock_quantity.ge(item.quantity)),
        )
        .set(product_variants::stock_quantity.eq(product_variants::stock_quantity - item.quantity))
        .execute(conn)?,
        None => diesel::update(
            products::table
                .filter(products::id.eq(product.id))
                .filter(products::stock_quantity.ge(item.quantity)),
        )
        .set(products::stock_quantity.eq(products::stock_quantity - item.quantity))
        .execute(conn)?,
    };

    if affected == 0 {
        return Err(RepositoryError::InsufficientStock {
            product_id: product.id,
        });
    }

    Ok(true)
}

fn redeem_discount(
    conn: &mut SqliteConnection,
    store_id: i32,
    discount_id: i32,
) -> RepositoryResult<()> {
    use crate::schema::discount_codes;

    let affected = diesel::update(
        discount_codes::table
            .filter(discount_codes::id.eq(discount_id))
            .filter(discount_codes::store_id.eq(store_id))
            .filter(discount_codes::is_active.eq(true))
            .filter(
                discount_codes::max_uses
                    .is_null()
                    .or(discount_codes::usage_count
                        .nullable()
                        .lt(discount_codes::max_uses)),
            ),
    )
    .set(discount_codes::usage_count.eq(discount_codes::usage_count + 1))
    .execute(conn)?;

    if affected == 0 {
        return Err(RepositoryError::Conflict(
            "discount code is no longer available".to_string(),
        ));
    }

    Ok(())
}

//! Order placement.
//!
//! Prices, taxes, shipping and discounts are recomputed from the catalog on
//! every checkout. The client only chooses what to buy.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::domain::auth::{AuthenticatedUser, Role, StoreScope};
use crate::domain::checkout::price_cart;
use crate::domain::customer::Customer;
use crate::domain::order::{NewOrder, Order, OrderAllowance};
use crate::forms::checkout::CheckoutForm;
use crate::notifications::{OrderNotifier, log_failure};
use crate::repository::{
    CheckoutWriter, CustomerReader, DiscountReader, OrderReader, ProductReader, StoreReader,
};
use crate::services::billing::{ensure_order_capacity, month_start};
use crate::services::{ServiceError, ServiceResult, owning_store, scope_for};

/// Customer the order is placed for. Shoppers always order for themselves,
/// staff may attach an existing customer of the store.
fn resolve_customer<R>(
    repo: &R,
    scope: &StoreScope,
    user: &AuthenticatedUser,
    customer_id: Option<i32>,
) -> ServiceResult<Option<Customer>>
where
    R: CustomerReader + ?Sized,
{
    if user.role == Role::Customer {
        return repo
            .get_customer_by_user_id(scope, user.id)?
            .map(Some)
            .ok_or(ServiceError::Forbidden);
    }

    match customer_id {
        Some(customer_id) => repo
            .get_customer_by_id(scope, customer_id)?
            .map(Some)
            .ok_or_else(|| ServiceError::Form(format!("customer {customer_id} does not exist"))),
        None => Ok(None),
    }
}

/// Validate the cart, price it server-side and place the order.
pub fn complete_checkout<R>(
    repo: &R,
    notifier: &dyn OrderNotifier,
    user: &AuthenticatedUser,
    form: CheckoutForm,
    now: NaiveDateTime,
) -> ServiceResult<Order>
where
    R: StoreReader
        + ProductReader
        + DiscountReader
        + CustomerReader
        + OrderReader
        + CheckoutWriter
        + ?Sized,
{
    let scope = scope_for(user)?;
    let store_id = owning_store(&scope)?;

    let request = form.into_request()?;
    let customer = resolve_customer(repo, &scope, user, request.customer_id)?;

    let store = repo
        .get_store(&scope, store_id)?
        .ok_or(ServiceError::NotFound)?;
    let period_start = month_start(now);
    let orders_this_month = repo.count_orders_since(&scope, period_start)?;
    ensure_order_capacity(&store, orders_this_month, now)?;

    let product_ids: Vec<i32> = request
        .lines
        .iter()
        .map(|line| line.product_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let products = repo.get_products_by_ids(&scope, &product_ids)?;

    let discount = match request.discount_code.as_deref() {
        Some(code) => Some(
            repo.get_discount_by_code(&scope, code)?
                .ok_or_else(|| ServiceError::Form(format!("discount code {code} does not exist")))?,
        ),
        None => None,
    };

    let priced = price_cart(&store, &products, &request.lines, discount.as_ref())?;

    let shipping_name = request
        .shipping_name
        .or_else(|| customer.as_ref().map(|customer| customer.name.clone()));

    let new_order = NewOrder {
        store_id,
        customer_id: customer.as_ref().map(|customer| customer.id),
        placed_by: Some(user.id),
        currency: store.currency.clone(),
        items: priced.items,
        subtotal_cents: priced.subtotal_cents,
        discount_cents: priced.discount_cents,
        tax_cents: priced.tax_cents,
        shipping_cents: priced.shipping_cents,
        total_cents: priced.total_cents,
        discount_code_id: priced.discount_code_id,
        discount_code: priced.discount_code,
        shipping_name,
        shipping_address: request.shipping_address,
        notes: request.notes,
        created_at: now,
        allowance: store
            .subscription_plan
            .limits()
            .max_orders_per_month
            .map(|max_orders| OrderAllowance {
                since: period_start,
                max_orders,
            }),
    };

    let placed = repo.place_order(&scope, &new_order)?;
    log::info!(
        "order {} placed in store {} by user {}",
        placed.order.order_number,
        store_id,
        user.id
    );

    log_failure("order placed", notifier.order_placed(&placed.order));
    if !placed.low_stock.is_empty() {
        log::warn!(
            "{} products in store {store_id} reached their low stock threshold",
            placed.low_stock.len()
        );
        log_failure("low stock", notifier.low_stock(&placed.low_stock));
    }

    Ok(placed.order)
}

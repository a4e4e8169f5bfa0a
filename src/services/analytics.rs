//! Dashboard figures computed from the orders of a date range.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::auth::{ADMIN_ROLES, AuthenticatedUser};
use crate::domain::order::{Order, OrderListQuery, OrderStatus};
use crate::forms::analytics::{AnalyticsQuery, DateRange};
use crate::repository::{CustomerReader, InventoryReader, OrderReader};
use crate::services::{ServiceResult, ensure_role, scope_for};

/// Number of products listed in [`DashboardSummary::top_products`].
pub const TOP_PRODUCTS: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DailyRevenue {
    pub day: NaiveDate,
    pub revenue_cents: i64,
    pub orders: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProductRevenue {
    pub product_id: Option<i32>,
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Sum of order totals in revenue statuses.
    pub revenue_cents: i64,
    pub order_count: usize,
    /// Revenue divided by the number of revenue orders, rounded down.
    pub average_order_value_cents: i64,
    pub orders_by_status: BTreeMap<OrderStatus, usize>,
    /// One entry per day of the range, zero-filled.
    pub revenue_by_day: Vec<DailyRevenue>,
    pub top_products: Vec<ProductRevenue>,
    pub new_customers: usize,
    pub low_stock_count: usize,
}

/// Aggregate `orders` over `range`. Orders outside the range are ignored.
pub fn summarize(
    orders: &[Order],
    new_customers: usize,
    low_stock_count: usize,
    range: DateRange,
) -> DashboardSummary {
    let mut orders_by_status = BTreeMap::new();
    let mut by_day: BTreeMap<NaiveDate, (i64, usize)> = BTreeMap::new();
    let mut by_product: HashMap<(Option<i32>, String), (i64, i64)> = HashMap::new();
    let mut revenue_cents = 0;
    let mut revenue_orders = 0;
    let mut order_count = 0;

    for day in range
        .first_day()
        .iter_days()
        .take_while(|day| *day <= range.last_day())
    {
        by_day.insert(day, (0, 0));
    }

    for order in orders
        .iter()
        .filter(|order| order.created_at >= range.from && order.created_at < range.to)
    {
        order_count += 1;
        *orders_by_status.entry(order.status).or_insert(0) += 1;

        if !order.status.is_revenue() {
            continue;
        }

        revenue_cents += order.total_cents;
        revenue_orders += 1;

        let entry = by_day.entry(order.created_at.date()).or_insert((0, 0));
        entry.0 += order.total_cents;
        entry.1 += 1;

        for item in &order.items {
            let entry = by_product
                .entry((item.product_id, item.name.clone()))
                .or_insert((0, 0));
            entry.0 += i64::from(item.quantity);
            entry.1 += item.line_total_cents;
        }
    }

    let mut top_products: Vec<ProductRevenue> = by_product
        .into_iter()
        .map(|((product_id, name), (quantity, revenue_cents))| ProductRevenue {
            product_id,
            name,
            quantity,
            revenue_cents,
        })
        .collect();
    top_products.sort_by(|a, b| {
        b.revenue_cents
            .cmp(&a.revenue_cents)
            .then_with(|| a.name.cmp(&b.name))
    });
    top_products.truncate(TOP_PRODUCTS);

    let average_order_value_cents = if revenue_orders == 0 {
        0
    } else {
        revenue_cents / revenue_orders
    };

    DashboardSummary {
        from: range.first_day(),
        to: range.last_day(),
        revenue_cents,
        order_count,
        average_order_value_cents,
        orders_by_status,
        revenue_by_day: by_day
            .into_iter()
            .map(|(day, (revenue_cents, orders))| DailyRevenue {
                day,
                revenue_cents,
                orders,
            })
            .collect(),
        top_products,
        new_customers,
        low_stock_count,
    }
}

/// Dashboard for the user's store, or for the whole platform for a super admin.
pub fn load_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: AnalyticsQuery,
    today: NaiveDate,
) -> ServiceResult<DashboardSummary>
where
    R: OrderReader + CustomerReader + InventoryReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLES)?;
    let scope = scope_for(user)?;
    let range = params.into_range(today)?;

    let query = OrderListQuery::new().created_between(range.from, range.to);
    let (_, orders) = repo.list_orders(&scope, &query)?;
    let new_customers = repo.count_new_customers(&scope, range.from, range.to)?;
    let low_stock = repo.list_low_stock(&scope)?;

    Ok(summarize(&orders, new_customers, low_stock.len(), range))
}

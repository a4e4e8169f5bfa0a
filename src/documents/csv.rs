use serde::Serialize;

use crate::documents::{DocumentError, format_cents};
use crate::domain::order::Order;
use crate::domain::product::Product;

#[derive(Serialize)]
struct ProductRow<'a> {
    id: i32,
    name: &'a str,
    sku: &'a str,
    status: &'a str,
    price: String,
    price_cents: i64,
    stock: i32,
    track_inventory: bool,
    category_id: Option<i32>,
    variants: usize,
    description: &'a str,
}

#[derive(Serialize)]
struct OrderRow<'a> {
    order_number: &'a str,
    created_at: String,
    status: &'a str,
    payment_status: &'a str,
    fulfillment_status: &'a str,
    customer_id: Option<i32>,
    items: i32,
    subtotal: String,
    discount: String,
    tax: String,
    shipping: String,
    total: String,
    currency: &'a str,
    discount_code: &'a str,
    tracking_number: &'a str,
}

fn write_rows<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<Vec<u8>, DocumentError> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| DocumentError::Io(err.into_error()))
}

/// Products as CSV. The `name`, `sku`, `price`, `stock`, `status` and
/// `description` columns can be fed back to the importer.
pub fn products_csv(products: &[Product]) -> Result<Vec<u8>, DocumentError> {
    write_rows(products.iter().map(|product| ProductRow {
        id: product.id,
        name: &product.name,
        sku: product.sku.as_deref().unwrap_or(""),
        status: product.status.as_str(),
        price: format_cents(product.price_cents),
        price_cents: product.price_cents,
        stock: product.stock_quantity,
        track_inventory: product.track_inventory,
        category_id: product.category_id,
        variants: product.variants.len(),
        description: product.description.as_deref().unwrap_or(""),
    }))
}

/// Orders as CSV, one row per order.
pub fn orders_csv(orders: &[Order]) -> Result<Vec<u8>, DocumentError> {
    write_rows(orders.iter().map(|order| OrderRow {
        order_number: &order.order_number,
        created_at: order.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        status: order.status.as_str(),
        payment_status: order.payment_status.as_str(),
        fulfillment_status: order.fulfillment_status.as_str(),
        customer_id: order.customer_id,
        items: order.items.iter().map(|item| item.quantity).sum(),
        subtotal: format_cents(order.subtotal_cents),
        discount: format_cents(order.discount_cents),
        tax: format_cents(order.tax_cents),
        shipping: format_cents(order.shipping_cents),
        total: format_cents(order.total_cents),
        currency: &order.currency,
        discount_code: order.discount_code.as_deref().unwrap_or(""),
        tracking_number: order.tracking_number.as_deref().unwrap_or(""),
    }))
}

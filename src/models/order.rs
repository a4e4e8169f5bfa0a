use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::UnknownVariant;
use crate::domain::order::{
    NewOrder as DomainNewOrder, NewOrderItem as DomainNewOrderItem, Order as DomainOrder,
    OrderItem as DomainOrderItem, OrderStatus, OrderStatusEvent as DomainOrderStatusEvent,
    OrderStatusUpdate,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub store_id: i32,
    pub customer_id: Option<i32>,
    pub order_seq: i32,
    pub order_number: String,
    pub status: String,
    pub payment_status: String,
    pub fulfillment_status: String,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub currency: String,
    pub discount_code: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_name: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: Option<i32>,
    pub variant_id: Option<i32>,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub line_total_cents: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::order_status_events)]
pub struct OrderStatusEvent {
    pub id: i32,
    pub order_id: i32,
    pub from_status: Option<String>,
    pub to_status: String,
    pub note: Option<String>,
    pub changed_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub store_id: i32,
    pub customer_id: Option<i32>,
    pub order_seq: i32,
    pub order_number: String,
    pub status: &'a str,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub currency: &'a str,
    pub discount_code: Option<&'a str>,
    pub shipping_name: Option<&'a str>,
    pub shipping_address: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem<'a> {
    pub order_id: i32,
    pub product_id: Option<i32>,
    pub variant_id: Option<i32>,
    pub name: &'a str,
    pub sku: Option<&'a str>,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub line_total_cents: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_status_events)]
pub struct NewOrderStatusEvent<'a> {
    pub order_id: i32,
    pub from_status: Option<&'a str>,
    pub to_status: &'a str,
    pub note: Option<&'a str>,
    pub changed_by: Option<i32>,
}

/// Columns touched by a status change. `None` leaves a column untouched.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::orders)]
pub struct OrderStatusChangeset<'a> {
    pub status: &'a str,
    pub payment_status: Option<&'a str>,
    pub fulfillment_status: Option<&'a str>,
    pub tracking_number: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

/// Scrubs shipping details when the customer is erased.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(treat_none_as_null = true)]
pub struct ScrubOrderPersonalData {
    pub shipping_name: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Human-facing order number for the given per-store sequence value.
pub fn order_number(seq: i32) -> String {
    format!("#{}", 1000 + seq)
}

impl Order {
    pub fn into_domain(self, items: Vec<OrderItem>) -> Result<DomainOrder, UnknownVariant> {
        Ok(DomainOrder {
            id: self.id,
            store_id: self.store_id,
            customer_id: self.customer_id,
            order_number: self.order_number,
            status: self.status.parse()?,
            payment_status: self.payment_status.parse()?,
            fulfillment_status: self.fulfillment_status.parse()?,
            subtotal_cents: self.subtotal_cents,
            discount_cents: self.discount_cents,
            tax_cents: self.tax_cents,
            shipping_cents: self.shipping_cents,
            total_cents: self.total_cents,
            currency: self.currency,
            discount_code: self.discount_code,
            tracking_number: self.tracking_number,
            shipping_name: self.shipping_name,
            shipping_address: self.shipping_address,
            notes: self.notes,
            items: items.into_iter().map(DomainOrderItem::from).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<OrderItem> for DomainOrderItem {
    fn from(value: OrderItem) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            variant_id: value.variant_id,
            name: value.name,
            sku: value.sku,
            unit_price_cents: value.unit_price_cents,
            quantity: value.quantity,
            line_total_cents: value.line_total_cents,
        }
    }
}

impl TryFrom<OrderStatusEvent> for DomainOrderStatusEvent {
    type Error = UnknownVariant;

    fn try_from(value: OrderStatusEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            order_id: value.order_id,
            from_status: value
                .from_status
                .map(|status| status.parse::<OrderStatus>())
                .transpose()?,
            to_status: value.to_status.parse()?,
            note: value.note,
            changed_by: value.changed_by,
            created_at: value.created_at,
        })
    }
}

impl<'a> NewOrder<'a> {
    pub fn from_domain(value: &'a DomainNewOrder, order_seq: i32) -> Self {
        Self {
            store_id: value.store_id,
            customer_id: value.customer_id,
            order_seq,
            order_number: order_number(order_seq),
            status: OrderStatus::Pending.as_str(),
            subtotal_cents: value.subtotal_cents,
            discount_cents: value.discount_cents,
            tax_cents: value.tax_cents,
            shipping_cents: value.shipping_cents,
            total_cents: value.total_cents,
            currency: value.currency.as_str(),
            discount_code: value.discount_code.as_deref(),
            shipping_name: value.shipping_name.as_deref(),
            shipping_address: value.shipping_address.as_deref(),
            notes: value.notes.as_deref(),
            created_at: value.created_at,
            updated_at: value.created_at,
        }
    }
}

impl<'a> NewOrderItem<'a> {
    pub fn from_domain(order_id: i32, value: &'a DomainNewOrderItem) -> Self {
        Self {
            order_id,
            product_id: Some(value.product_id),
            variant_id: value.variant_id,
            name: value.name.as_str(),
            sku: value.sku.as_deref(),
            unit_price_cents: value.unit_price_cents,
            quantity: value.quantity,
            line_total_cents: value.line_total_cents,
        }
    }
}

impl<'a> From<&'a OrderStatusUpdate> for OrderStatusChangeset<'a> {
    fn from(value: &'a OrderStatusUpdate) -> Self {
        Self {
            status: value.to.as_str(),
            payment_status: value.payment_status.as_ref().map(|status| status.as_str()),
            fulfillment_status: value
                .fulfillment_status
                .as_ref()
                .map(|status| status.as_str()),
            tracking_number: value.tracking_number.as_deref(),
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_numbers_start_after_one_thousand() {
        assert_eq!(order_number(1), "#1001");
        assert_eq!(order_number(42), "#1042");
    }
}

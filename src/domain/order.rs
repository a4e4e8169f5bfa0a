use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pagination::Pagination;

string_enum! {
    /// Lifecycle states of an order.
    pub enum OrderStatus {
        /// Created by checkout, awaiting payment.
        Pending => "PENDING",
        Paid => "PAID",
        PaymentFailed => "PAYMENT_FAILED",
        Processing => "PROCESSING",
        Shipped => "SHIPPED",
        Delivered => "DELIVERED",
        Canceled => "CANCELED",
        Refunded => "REFUNDED",
    }
}

impl OrderStatus {
    /// Statuses reachable from `self` in a single step.
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;

        match self {
            Pending => &[Paid, PaymentFailed, Canceled],
            PaymentFailed => &[Pending, Canceled],
            Paid => &[Processing, Canceled, Refunded],
            Processing => &[Shipped, Canceled, Refunded],
            Shipped => &[Delivered, Refunded],
            Delivered => &[Refunded],
            Canceled | Refunded => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Destructive targets that need an explicit confirmation.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, OrderStatus::Canceled | OrderStatus::Refunded)
    }

    /// Orders in these states count towards revenue.
    pub fn is_revenue(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid
                | OrderStatus::Processing
                | OrderStatus::Shipped
                | OrderStatus::Delivered
        )
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

string_enum! {
    pub enum PaymentStatus {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
        Refunded => "refunded",
    }
}

string_enum! {
    pub enum FulfillmentStatus {
        Unfulfilled => "unfulfilled",
        Processing => "processing",
        Shipped => "shipped",
        Delivered => "delivered",
    }
}

/// An order placed in a store, with its line items.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: i32,
    pub store_id: i32,
    pub customer_id: Option<i32>,
    /// Human-facing number, unique per store (`#1001`).
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
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
    pub items: Vec<OrderItem>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Line of an order. Name, SKU and price are snapshots taken at checkout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: i32,
    pub product_id: Option<i32>,
    pub variant_id: Option<i32>,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub line_total_cents: i64,
}

/// Line item payload written by checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub variant_id: Option<i32>,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub line_total_cents: i64,
    /// Whether stock must be deducted for this line.
    pub track_inventory: bool,
}

/// Order payload written by checkout; the order number is allocated on insert.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub store_id: i32,
    pub customer_id: Option<i32>,
    pub placed_by: Option<i32>,
    pub currency: String,
    pub items: Vec<NewOrderItem>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub discount_code_id: Option<i32>,
    pub discount_code: Option<String>,
    pub shipping_name: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    /// Monthly order cap re-checked when the order is written.
    pub allowance: Option<OrderAllowance>,
}

/// At most `max_orders` orders may exist in the store since `since`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAllowance {
    pub since: NaiveDateTime,
    pub max_orders: usize,
}

/// Audit record of a single status change.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderStatusEvent {
    pub id: i32,
    pub order_id: i32,
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub note: Option<String>,
    pub changed_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

/// Requested status change, as submitted by an operator.
#[derive(Debug, Clone, Default)]
pub struct StatusChangeRequest {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub note: Option<String>,
    /// Set when the operator confirmed a cancel/refund.
    pub confirmed: bool,
}

/// Reasons a status change is refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("order is {from} and cannot change status any more")]
    Terminal { from: OrderStatus },
    #[error("cannot change order status from {from} to {to}")]
    NotAllowed { from: OrderStatus, to: OrderStatus },
    #[error("a tracking number is required to mark an order as shipped")]
    TrackingNumberRequired,
    #[error("changing an order to {to} must be confirmed")]
    ConfirmationRequired { to: OrderStatus },
}

/// Validated status change ready to be written, including its side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusUpdate {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub payment_status: Option<PaymentStatus>,
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub tracking_number: Option<String>,
    /// Put tracked line items back into stock.
    pub restock: bool,
    pub note: Option<String>,
    pub changed_by: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl OrderStatusUpdate {
    /// Check `request` against the transition table and the preconditions of
    /// the target status.
    pub fn plan(
        order: &Order,
        request: &StatusChangeRequest,
        changed_by: Option<i32>,
    ) -> Result<Self, TransitionError> {
        let from = order.status;
        let to = request.status;

        if from.is_terminal() {
            return Err(TransitionError::Terminal { from });
        }
        if !from.can_transition_to(to) {
            return Err(TransitionError::NotAllowed { from, to });
        }

        let tracking_number = request
            .tracking_number
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        if to == OrderStatus::Shipped
            && tracking_number.is_none()
            && order
                .tracking_number
                .as_deref()
                .is_none_or(|value| value.trim().is_empty())
        {
            return Err(TransitionError::TrackingNumberRequired);
        }

        if to.requires_confirmation() && !request.confirmed {
            return Err(TransitionError::ConfirmationRequired { to });
        }

        let payment_status = match to {
            OrderStatus::Pending => Some(PaymentStatus::Pending),
            OrderStatus::Paid => Some(PaymentStatus::Paid),
            OrderStatus::PaymentFailed => Some(PaymentStatus::Failed),
            OrderStatus::Refunded => Some(PaymentStatus::Refunded),
            _ => None,
        };

        let fulfillment_status = match to {
            OrderStatus::Processing => Some(FulfillmentStatus::Processing),
            OrderStatus::Shipped => Some(FulfillmentStatus::Shipped),
            OrderStatus::Delivered => Some(FulfillmentStatus::Delivered),
            _ => None,
        };

        let note = request
            .note
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(Self {
            from,
            to,
            payment_status,
            fulfillment_status,
            tracking_number,
            restock: to == OrderStatus::Canceled,
            note,
            changed_by,
            updated_at: Utc::now().naive_utc(),
        })
    }
}

/// Query definition used to list orders.
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<i32>,
    /// Matches the order number, shipping name or notes.
    pub search: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<NaiveDateTime>,
    /// Exclusive upper bound on `created_at`.
    pub created_to: Option<NaiveDateTime>,
    pub pagination: Option<Pagination>,
}

impl OrderListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn customer_id(mut self, customer_id: i32) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn created_between(mut self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn order_with_status(status: OrderStatus) -> Order {
        Order {
            id: 1,
            store_id: 1,
            customer_id: None,
            order_number: "#1001".to_string(),
            status,
            payment_status: PaymentStatus::Pending,
            fulfillment_status: FulfillmentStatus::Unfulfilled,
            subtotal_cents: 1000,
            discount_cents: 0,
            tax_cents: 0,
            shipping_cents: 0,
            total_cents: 1000,
            currency: "USD".to_string(),
            discount_code: None,
            tracking_number: None,
            shipping_name: None,
            shipping_address: None,
            notes: None,
            items: Vec::new(),
            created_at: datetime(),
            updated_at: datetime(),
        }
    }

    fn request(status: OrderStatus) -> StatusChangeRequest {
        StatusChangeRequest {
            status,
            confirmed: true,
            ..StatusChangeRequest::default()
        }
    }

    #[test]
    fn transition_table_matches_documented_edges() {
        use OrderStatus::*;

        let expected: &[(OrderStatus, &[OrderStatus])] = &[
            (Pending, &[Paid, PaymentFailed, Canceled]),
            (PaymentFailed, &[Pending, Canceled]),
            (Paid, &[Processing, Canceled, Refunded]),
            (Processing, &[Shipped, Canceled, Refunded]),
            (Shipped, &[Delivered, Refunded]),
            (Delivered, &[Refunded]),
            (Canceled, &[]),
            (Refunded, &[]),
        ];

        for (from, allowed) in expected {
            for to in OrderStatus::ALL {
                assert_eq!(
                    from.can_transition_to(*to),
                    allowed.contains(to),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn transitions_outside_the_table_are_rejected() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let result =
                    OrderStatusUpdate::plan(&order_with_status(*from), &request(*to), None);
                if from.can_transition_to(*to) && *to != OrderStatus::Shipped {
                    assert!(result.is_ok(), "{from} -> {to} should be allowed");
                } else if !from.can_transition_to(*to) {
                    assert!(result.is_err(), "{from} -> {to} should be rejected");
                }
            }
        }
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for from in [OrderStatus::Canceled, OrderStatus::Refunded] {
            assert!(from.is_terminal());
            for to in OrderStatus::ALL {
                let result =
                    OrderStatusUpdate::plan(&order_with_status(from), &request(*to), None);
                assert_eq!(result, Err(TransitionError::Terminal { from }));
            }
        }
    }

    #[test]
    fn shipping_requires_tracking_number() {
        let order = order_with_status(OrderStatus::Processing);

        let mut blank = request(OrderStatus::Shipped);
        blank.tracking_number = Some("   ".to_string());
        assert_eq!(
            OrderStatusUpdate::plan(&order, &blank, None),
            Err(TransitionError::TrackingNumberRequired)
        );

        let mut with_tracking = request(OrderStatus::Shipped);
        with_tracking.tracking_number = Some(" 1Z999 ".to_string());
        let update = OrderStatusUpdate::plan(&order, &with_tracking, Some(3)).expect("allowed");
        assert_eq!(update.tracking_number.as_deref(), Some("1Z999"));
        assert_eq!(update.fulfillment_status, Some(FulfillmentStatus::Shipped));
        assert_eq!(update.changed_by, Some(3));
    }

    #[test]
    fn stored_tracking_number_satisfies_shipping() {
        let mut order = order_with_status(OrderStatus::Processing);
        order.tracking_number = Some("TRACK-1".to_string());

        let update = OrderStatusUpdate::plan(&order, &request(OrderStatus::Shipped), None)
            .expect("allowed");
        assert_eq!(update.tracking_number, None);
    }

    #[test]
    fn cancel_and_refund_need_confirmation() {
        let order = order_with_status(OrderStatus::Paid);
        for to in [OrderStatus::Canceled, OrderStatus::Refunded] {
            let unconfirmed = StatusChangeRequest {
                status: to,
                ..StatusChangeRequest::default()
            };
            assert_eq!(
                OrderStatusUpdate::plan(&order, &unconfirmed, None),
                Err(TransitionError::ConfirmationRequired { to })
            );
        }
    }

    #[test]
    fn side_effects_follow_target_status() {
        let paid = OrderStatusUpdate::plan(
            &order_with_status(OrderStatus::Pending),
            &request(OrderStatus::Paid),
            None,
        )
        .expect("allowed");
        assert_eq!(paid.payment_status, Some(PaymentStatus::Paid));
        assert!(!paid.restock);

        let canceled = OrderStatusUpdate::plan(
            &order_with_status(OrderStatus::Paid),
            &request(OrderStatus::Canceled),
            None,
        )
        .expect("allowed");
        assert!(canceled.restock);

        let refunded = OrderStatusUpdate::plan(
            &order_with_status(OrderStatus::Delivered),
            &request(OrderStatus::Refunded),
            None,
        )
        .expect("allowed");
        assert_eq!(refunded.payment_status, Some(PaymentStatus::Refunded));
        assert!(!refunded.restock);
    }
}

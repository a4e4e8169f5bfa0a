use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::UnknownVariant;
use crate::domain::inventory::{AdjustmentReason, InventoryAdjustment as DomainInventoryAdjustment};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::inventory_adjustments)]
pub struct InventoryAdjustment {
    pub id: i32,
    pub store_id: i32,
    pub product_id: i32,
    pub variant_id: Option<i32>,
    pub order_id: Option<i32>,
    pub delta: i32,
    pub reason: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::inventory_adjustments)]
pub struct NewInventoryAdjustment {
    pub store_id: i32,
    pub product_id: i32,
    pub variant_id: Option<i32>,
    pub order_id: Option<i32>,
    pub delta: i32,
    pub reason: &'static str,
}

impl NewInventoryAdjustment {
    pub fn new(store_id: i32, product_id: i32, delta: i32, reason: AdjustmentReason) -> Self {
        Self {
            store_id,
            product_id,
            variant_id: None,
            order_id: None,
            delta,
            reason: reason.as_str(),
        }
    }

    pub fn variant(mut self, variant_id: Option<i32>) -> Self {
        self.variant_id = variant_id;
        self
    }

    pub fn order(mut self, order_id: i32) -> Self {
        self.order_id = Some(order_id);
        self
    }
}

impl TryFrom<InventoryAdjustment> for DomainInventoryAdjustment {
    type Error = UnknownVariant;

    fn try_from(value: InventoryAdjustment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            store_id: value.store_id,
            product_id: value.product_id,
            variant_id: value.variant_id,
            order_id: value.order_id,
            delta: value.delta,
            reason: value.reason.parse::<AdjustmentReason>()?,
            created_at: value.created_at,
        })
    }
}

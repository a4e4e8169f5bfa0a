use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Highest stock level a product or variant may hold.
pub const MAX_STOCK_QUANTITY: i32 = 1_000_000_000;

string_enum! {
    /// Why a stock level changed.
    pub enum AdjustmentReason {
        Restock => "restock",
        Correction => "correction",
        Damaged => "damaged",
        Returned => "returned",
        OrderPlaced => "order_placed",
        OrderCanceled => "order_canceled",
    }
}

impl AdjustmentReason {
    /// Reasons an operator may pick for a manual adjustment.
    pub fn is_manual(&self) -> bool {
        matches!(
            self,
            Self::Restock | Self::Correction | Self::Damaged | Self::Returned
        )
    }
}

/// Entry in the stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryAdjustment {
    pub id: i32,
    pub store_id: i32,
    pub product_id: i32,
    pub variant_id: Option<i32>,
    pub order_id: Option<i32>,
    /// Signed change applied to the stock level.
    pub delta: i32,
    pub reason: AdjustmentReason,
    pub created_at: NaiveDateTime,
}

/// Manual stock change requested by an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: i32,
    pub variant_id: Option<i32>,
    pub delta: i32,
    pub reason: AdjustmentReason,
}

/// Stock level reported by low-stock listings and alerts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LowStockItem {
    pub store_id: i32,
    pub product_id: i32,
    /// Set when the level belongs to a variant; variants share the product threshold.
    pub variant_id: Option<i32>,
    pub name: String,
    pub sku: Option<String>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
}

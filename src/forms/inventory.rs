use serde::Deserialize;
use validator::Validate;

use crate::domain::inventory::{AdjustmentReason, StockAdjustment};
use crate::forms::{FormError, FormResult};

/// Bounds on the stock change accepted in a single adjustment.
const MIN_ADJUSTMENT: i32 = -100_000;
const MAX_ADJUSTMENT: i32 = 100_000;

/// Manual stock adjustment submitted by staff.
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustStockForm {
    pub product_id: i32,
    #[serde(default)]
    pub variant_id: Option<i32>,
    #[validate(range(min = MIN_ADJUSTMENT, max = MAX_ADJUSTMENT))]
    pub delta: i32,
    pub reason: AdjustmentReason,
}

impl AdjustStockForm {
    pub fn into_adjustment(self) -> FormResult<StockAdjustment> {
        self.validate()?;

        if self.delta == 0 {
            return Err(FormError::InvalidValue {
                field: "delta",
                value: self.delta.to_string(),
            });
        }

        // Order-driven reasons are written by checkout and cancellation only.
        if !self.reason.is_manual() {
            return Err(FormError::InvalidValue {
                field: "reason",
                value: self.reason.to_string(),
            });
        }

        Ok(StockAdjustment {
            product_id: self.product_id,
            variant_id: self.variant_id,
            delta: self.delta,
            reason: self.reason,
        })
    }
}

/// Query parameters accepted by the stock ledger listing.
#[derive(Debug, Default, Deserialize)]
pub struct AdjustmentsQuery {
    pub product_id: Option<i32>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

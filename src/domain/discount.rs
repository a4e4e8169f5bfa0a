use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

string_enum! {
    pub enum DiscountKind {
        /// `value` is a whole percentage between 1 and 100.
        Percentage => "percentage",
        /// `value` is an amount in the smallest currency unit.
        Fixed => "fixed",
    }
}

/// Discount code redeemable at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscountCode {
    pub id: i32,
    pub store_id: i32,
    /// Uppercase code typed by the shopper.
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub min_subtotal_cents: Option<i64>,
    pub max_uses: Option<i32>,
    pub usage_count: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DiscountCode {
    /// Whether the code may be redeemed against `subtotal_cents`.
    pub fn is_redeemable(&self, subtotal_cents: i64) -> bool {
        self.is_active
            && self.max_uses.is_none_or(|max| self.usage_count < max)
            && self
                .min_subtotal_cents
                .is_none_or(|minimum| subtotal_cents >= minimum)
    }

    /// Amount taken off `subtotal_cents`, never more than the subtotal.
    pub fn amount_off(&self, subtotal_cents: i64) -> i64 {
        let subtotal = i128::from(subtotal_cents.max(0));
        let amount = match self.kind {
            DiscountKind::Percentage => subtotal * i128::from(self.value.clamp(0, 100)) / 100,
            DiscountKind::Fixed => i128::from(self.value.max(0)),
        };
        // Bounded by a non-negative i64 subtotal, so the conversion cannot fail.
        i64::try_from(amount.min(subtotal)).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct NewDiscountCode {
    pub store_id: i32,
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub min_subtotal_cents: Option<i64>,
    pub max_uses: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(kind: DiscountKind, value: i64) -> DiscountCode {
        DiscountCode {
            id: 1,
            store_id: 1,
            code: "SAVE".to_string(),
            kind,
            value,
            min_subtotal_cents: None,
            max_uses: None,
            usage_count: 0,
            is_active: true,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn percentage_rounds_down() {
        assert_eq!(code(DiscountKind::Percentage, 15).amount_off(999), 149);
    }

    #[test]
    fn fixed_never_exceeds_subtotal() {
        assert_eq!(code(DiscountKind::Fixed, 5_000).amount_off(1_200), 1_200);
    }

    #[test]
    fn usage_cap_and_minimum_are_enforced() {
        let mut discount = code(DiscountKind::Fixed, 100);
        discount.max_uses = Some(2);
        discount.usage_count = 2;
        assert!(!discount.is_redeemable(10_000));

        discount.usage_count = 1;
        discount.min_subtotal_cents = Some(5_000);
        assert!(!discount.is_redeemable(4_999));
        assert!(discount.is_redeemable(5_000));
    }
}

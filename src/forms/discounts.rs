use serde::Deserialize;
use validator::Validate;

use crate::domain::discount::{DiscountKind, NewDiscountCode};
use crate::forms::{FormError, FormResult, MAX_AMOUNT_CENTS};

/// Payload used to create a discount code.
#[derive(Debug, Deserialize, Validate)]
pub struct DiscountForm {
    #[validate(length(min = 3, max = 32))]
    pub code: String,
    pub kind: DiscountKind,
    #[validate(range(min = 1, max = MAX_AMOUNT_CENTS))]
    pub value: i64,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    #[serde(default)]
    pub min_subtotal_cents: Option<i64>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub max_uses: Option<i32>,
}

impl DiscountForm {
    pub fn into_new_discount(self, store_id: i32) -> FormResult<NewDiscountCode> {
        self.validate()?;

        let code = self.code.trim().to_uppercase();
        if !code
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(FormError::InvalidValue { field: "code", value: code });
        }

        if self.kind == DiscountKind::Percentage && self.value > 100 {
            return Err(FormError::InvalidValue {
                field: "value",
                value: self.value.to_string(),
            });
        }

        Ok(NewDiscountCode {
            store_id,
            code,
            kind: self.kind,
            value: self.value,
            min_subtotal_cents: self.min_subtotal_cents,
            max_uses: self.max_uses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(code: &str, kind: DiscountKind, value: i64) -> DiscountForm {
        DiscountForm {
            code: code.to_string(),
            kind,
            value,
            min_subtotal_cents: None,
            max_uses: None,
        }
    }

    #[test]
    fn code_is_uppercased() {
        let discount = form(" spring-10 ", DiscountKind::Percentage, 10)
            .into_new_discount(3)
            .expect("valid");
        assert_eq!(discount.code, "SPRING-10");
        assert_eq!(discount.store_id, 3);
    }

    #[test]
    fn percentage_above_hundred_is_rejected() {
        assert!(matches!(
            form("HALF", DiscountKind::Percentage, 150).into_new_discount(1),
            Err(FormError::InvalidValue { field: "value", .. })
        ));
    }

    #[test]
    fn spaces_are_not_allowed_in_codes() {
        assert!(matches!(
            form("two words", DiscountKind::Fixed, 500).into_new_discount(1),
            Err(FormError::InvalidValue { field: "code", .. })
        ));
    }
}

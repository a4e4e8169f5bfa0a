use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::checkout::{CartLine, MAX_CART_LINES, MAX_LINE_QUANTITY};
use crate::forms::{
    FormResult, NAME_MAX_LEN, TEXT_MAX_LEN, optional_inline, optional_multiline,
    sanitize_inline_text,
};

const MAX_ITEMS: u64 = MAX_CART_LINES as u64;

/// One requested line. Only identifiers and a quantity are accepted; any
/// price sent alongside is ignored.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CheckoutLineForm {
    pub product_id: i32,
    #[serde(default)]
    pub variant_id: Option<i32>,
    #[validate(range(min = 1, max = MAX_LINE_QUANTITY))]
    pub quantity: i32,
}

/// Checkout request submitted by a customer or by staff on their behalf.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutForm {
    #[validate(length(min = 1, max = MAX_ITEMS), nested)]
    pub items: Vec<CheckoutLineForm>,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub discount_code: Option<String>,
    /// Customer to attach the order to when staff place it.
    #[serde(default)]
    pub customer_id: Option<i32>,
    #[validate(length(max = NAME_MAX_LEN))]
    #[serde(default)]
    pub shipping_name: Option<String>,
    #[validate(length(max = TEXT_MAX_LEN))]
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[validate(length(max = TEXT_MAX_LEN))]
    #[serde(default)]
    pub notes: Option<String>,
}

/// Sanitised checkout request.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub lines: Vec<CartLine>,
    /// Uppercased discount code.
    pub discount_code: Option<String>,
    pub customer_id: Option<i32>,
    pub shipping_name: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
}

impl CheckoutForm {
    pub fn into_request(self) -> FormResult<CheckoutRequest> {
        self.validate()?;

        let lines = self
            .items
            .iter()
            .map(|item| CartLine {
                product_id: item.product_id,
                variant_id: item.variant_id,
                quantity: item.quantity,
            })
            .collect();

        Ok(CheckoutRequest {
            lines,
            discount_code: self
                .discount_code
                .as_deref()
                .map(sanitize_inline_text)
                .filter(|value| !value.is_empty())
                .map(|value| value.to_uppercase()),
            customer_id: self.customer_id,
            shipping_name: optional_inline(self.shipping_name.as_deref()),
            shipping_address: optional_multiline(self.shipping_address.as_deref()),
            notes: optional_multiline(self.notes.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormError;

    #[test]
    fn client_prices_are_ignored() {
        let payload = serde_json::json!({
            "items": [{"product_id": 4, "quantity": 2, "price_cents": 1}],
            "total_cents": 1,
            "discount_code": " save10 "
        });

        let form: CheckoutForm = serde_json::from_value(payload).expect("deserialize");
        let request = form.into_request().expect("valid");

        assert_eq!(
            request.lines,
            vec![CartLine {
                product_id: 4,
                variant_id: None,
                quantity: 2
            }]
        );
        assert_eq!(request.discount_code.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let form = CheckoutForm {
            items: Vec::new(),
            discount_code: None,
            customer_id: None,
            shipping_name: None,
            shipping_address: None,
            notes: None,
        };

        assert!(matches!(form.into_request(), Err(FormError::Validation(_))));
    }

    #[test]
    fn quantity_bounds_are_checked_per_line() {
        let form = CheckoutForm {
            items: vec![CheckoutLineForm {
                product_id: 1,
                variant_id: None,
                quantity: 0,
            }],
            discount_code: None,
            customer_id: None,
            shipping_name: None,
            shipping_address: None,
            notes: None,
        };

        assert!(matches!(form.into_request(), Err(FormError::Validation(_))));
    }
}

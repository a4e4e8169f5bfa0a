//! Server-side cart pricing.
//!
//! Everything monetary in an order is computed here from catalog data; the
//! checkout payload only contributes product ids, variant ids and quantities.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::domain::discount::DiscountCode;
use crate::domain::order::NewOrderItem;
use crate::domain::product::{Product, ProductStatus};
use crate::domain::store::Store;

/// Largest quantity accepted for a single line.
pub const MAX_LINE_QUANTITY: i32 = 999;

/// Largest number of distinct lines accepted in one checkout.
pub const MAX_CART_LINES: usize = 100;

/// A product (and optional variant) the shopper wants to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CartLine {
    pub product_id: i32,
    pub variant_id: Option<i32>,
    pub quantity: i32,
}

/// Result of pricing a cart against authoritative catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedCart {
    #[serde(skip)]
    pub items: Vec<NewOrderItem>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    #[serde(skip)]
    pub discount_code_id: Option<i32>,
    pub discount_code: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("the cart is empty")]
    EmptyCart,
    #[error("the cart has more than {MAX_CART_LINES} lines")]
    TooManyLines,
    #[error("quantity for product {product_id} must be between 1 and {MAX_LINE_QUANTITY}")]
    InvalidQuantity { product_id: i32 },
    #[error("product {product_id} is not available")]
    ProductUnavailable { product_id: i32 },
    #[error("product {product_id} requires a variant to be selected")]
    VariantRequired { product_id: i32 },
    #[error("variant {variant_id} does not belong to product {product_id}")]
    VariantUnavailable { product_id: i32, variant_id: i32 },
    #[error("not enough stock for product {product_id}")]
    InsufficientStock { product_id: i32 },
    #[error("discount code `{code}` cannot be applied to this order")]
    DiscountNotApplicable { code: String },
    #[error("order amount is out of range")]
    Overflow,
}

/// Combine lines that refer to the same product and variant, keeping the
/// order in which they first appear.
pub fn merge_lines(lines: &[CartLine]) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    let mut positions: HashMap<(i32, Option<i32>), usize> = HashMap::new();

    for line in lines {
        let key = (line.product_id, line.variant_id);
        match positions.get(&key) {
            Some(&index) => {
                if let Some(existing) = merged.get_mut(index) {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(*line);
            }
        }
    }

    merged
}

/// Tax on `taxable_cents` at `rate_bps` basis points, rounded half up.
pub fn tax_for(taxable_cents: i64, rate_bps: i32) -> Result<i64, PricingError> {
    let taxable = i128::from(taxable_cents.max(0));
    let rate = i128::from(rate_bps.max(0));
    let tax = (taxable * rate + 5_000) / 10_000;
    i64::try_from(tax).map_err(|_| PricingError::Overflow)
}

/// Shipping charged for a discounted subtotal.
pub fn shipping_for(store: &Store, discounted_subtotal_cents: i64) -> i64 {
    match store.free_shipping_threshold_cents {
        Some(threshold) if discounted_subtotal_cents >= threshold => 0,
        _ => store.shipping_flat_cents.max(0),
    }
}

/// Price `lines` using only `store` settings, `products` as loaded from the
/// database and the optional `discount` resolved from the submitted code.
pub fn price_cart(
    store: &Store,
    products: &[Product],
    lines: &[CartLine],
    discount: Option<&DiscountCode>,
) -> Result<PricedCart, PricingError> {
    let lines = merge_lines(lines);
    if lines.is_empty() {
        return Err(PricingError::EmptyCart);
    }
    if lines.len() > MAX_CART_LINES {
        return Err(PricingError::TooManyLines);
    }

    let catalog: HashMap<i32, &Product> = products
        .iter()
        .filter(|product| product.store_id == store.id)
        .map(|product| (product.id, product))
        .collect();

    let mut items = Vec::with_capacity(lines.len());
    let mut subtotal: i64 = 0;

    for line in &lines {
        if !(1..=MAX_LINE_QUANTITY).contains(&line.quantity) {
            return Err(PricingError::InvalidQuantity {
                product_id: line.product_id,
            });
        }

        let product = catalog
            .get(&line.product_id)
            .filter(|product| product.status == ProductStatus::Active)
            .ok_or(PricingError::ProductUnavailable {
                product_id: line.product_id,
            })?;

        let item = match line.variant_id {
            Some(variant_id) => {
                let variant = product.variant(variant_id).ok_or(
                    PricingError::VariantUnavailable {
                        product_id: product.id,
                        variant_id,
                    },
                )?;
                if product.track_inventory && variant.stock_quantity < line.quantity {
                    return Err(PricingError::InsufficientStock {
                        product_id: product.id,
                    });
                }
                let unit_price = variant.price_cents.unwrap_or(product.price_cents);
                NewOrderItem {
                    product_id: product.id,
                    variant_id: Some(variant.id),
                    name: format!("{} / {}", product.name, variant.name),
                    sku: variant.sku.clone().or_else(|| product.sku.clone()),
                    unit_price_cents: unit_price,
                    quantity: line.quantity,
                    line_total_cents: line_total(unit_price, line.quantity)?,
                    track_inventory: product.track_inventory,
                }
            }
            None => {
                if !product.variants.is_empty() {
                    return Err(PricingError::VariantRequired {
                        product_id: product.id,
                    });
                }
                if product.track_inventory && product.stock_quantity < line.quantity {
                    return Err(PricingError::InsufficientStock {
                        product_id: product.id,
                    });
                }
                NewOrderItem {
                    product_id: product.id,
                    variant_id: None,
                    name: product.name.clone(),
                    sku: product.sku.clone(),
                    unit_price_cents: product.price_cents,
                    quantity: line.quantity,
                    line_total_cents: line_total(product.price_cents, line.quantity)?,
                    track_inventory: product.track_inventory,
                }
            }
        };

        subtotal = subtotal
            .checked_add(item.line_total_cents)
            .ok_or(PricingError::Overflow)?;
        items.push(item);
    }

    let discount_cents = match discount {
        Some(code) if code.store_id == store.id && code.is_redeemable(subtotal) => {
            code.amount_off(subtotal)
        }
        Some(code) => {
            return Err(PricingError::DiscountNotApplicable {
                code: code.code.clone(),
            });
        }
        None => 0,
    };

    let discounted = subtotal - discount_cents;
    let tax_cents = tax_for(discounted, store.tax_rate_bps)?;
    let shipping_cents = shipping_for(store, discounted);
    let total_cents = discounted
        .checked_add(tax_cents)
        .and_then(|value| value.checked_add(shipping_cents))
        .ok_or(PricingError::Overflow)?;

    Ok(PricedCart {
        items,
        subtotal_cents: subtotal,
        discount_cents,
        tax_cents,
        shipping_cents,
        total_cents,
        discount_code_id: discount.map(|code| code.id),
        discount_code: discount.map(|code| code.code.clone()),
    })
}

fn line_total(unit_price_cents: i64, quantity: i32) -> Result<i64, PricingError> {
    unit_price_cents
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)
}

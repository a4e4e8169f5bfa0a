use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

string_enum! {
    /// Publication state of a product.
    pub enum ProductStatus {
        /// Not visible to customers yet.
        Draft => "draft",
        /// Visible and purchasable.
        Active => "active",
        /// Soft-deleted; kept for order history.
        Archived => "archived",
    }
}

/// Sellable item in a store catalog.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: i32,
    pub store_id: i32,
    pub category_id: Option<i32>,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    /// Price in the smallest currency unit.
    pub price_cents: i64,
    /// Optional "was" price shown struck through.
    pub compare_at_price_cents: Option<i64>,
    pub status: ProductStatus,
    /// When false the stock counter is informational and never blocks checkout.
    pub track_inventory: bool,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub variants: Vec<ProductVariant>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    pub fn variant(&self, variant_id: i32) -> Option<&ProductVariant> {
        self.variants.iter().find(|variant| variant.id == variant_id)
    }

    pub fn is_low_stock(&self) -> bool {
        self.track_inventory && self.stock_quantity <= self.low_stock_threshold
    }
}

/// Purchasable variation of a product (size, colour, ...).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProductVariant {
    pub id: i32,
    pub product_id: i32,
    pub store_id: i32,
    pub name: String,
    pub sku: Option<String>,
    /// Overrides the product price when set.
    pub price_cents: Option<i64>,
    pub stock_quantity: i32,
    pub attributes: BTreeMap<String, String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub store_id: i32,
    pub category_id: Option<i32>,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub status: ProductStatus,
    pub track_inventory: bool,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a draft product with tracked, empty inventory.
    pub fn new(store_id: i32, name: impl Into<String>, price_cents: i64) -> Self {
        Self {
            store_id,
            category_id: None,
            name: name.into(),
            sku: None,
            description: None,
            price_cents,
            compare_at_price_cents: None,
            status: ProductStatus::Draft,
            track_inventory: true,
            stock_quantity: 0,
            low_stock_threshold: 5,
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_stock(mut self, stock_quantity: i32) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }

    pub fn with_low_stock_threshold(mut self, threshold: i32) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    pub fn untracked(mut self) -> Self {
        self.track_inventory = false;
        self
    }
}

/// Full replacement of the editable product fields. Stock is changed only
/// through inventory adjustments.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub category_id: Option<i32>,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub status: ProductStatus,
    pub track_inventory: bool,
    pub low_stock_threshold: i32,
    pub updated_at: NaiveDateTime,
}

/// Payload required to add a variant to a product.
#[derive(Debug, Clone)]
pub struct NewProductVariant {
    pub product_id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub price_cents: Option<i64>,
    pub stock_quantity: i32,
    pub attributes: BTreeMap<String, String>,
}

/// Query definition used to list products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Optional name, SKU or description search term.
    pub search: Option<String>,
    pub category_id: Option<i32>,
    /// Restrict to a single status; archived products are hidden otherwise.
    pub status: Option<ProductStatus>,
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn status(mut self, status: ProductStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

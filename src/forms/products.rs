use std::collections::BTreeMap;
use std::io::{Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use chrono::Utc;
use csv::{StringRecord, Trim};
use serde::Deserialize;
use validator::Validate;

use crate::domain::inventory::MAX_STOCK_QUANTITY;
use crate::domain::product::{
    NewProduct, NewProductVariant, ProductListQuery, ProductStatus, UpdateProduct,
};
use crate::forms::{
    FormError, FormResult, MAX_AMOUNT_CENTS, NAME_MAX_LEN, TEXT_MAX_LEN, optional_multiline,
    required_inline,
    sanitize_inline_text, sanitize_multiline_text, sanitize_sku,
};
use crate::pagination::Pagination;

/// Maximum allowed length for a SKU.
const SKU_MAX_LEN: u64 = 64;

/// Low-stock threshold applied when none is given.
const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Payload used to create a product or replace its editable fields.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(max = SKU_MAX_LEN))]
    #[serde(default)]
    pub sku: Option<String>,
    #[validate(length(max = TEXT_MAX_LEN))]
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    pub price_cents: i64,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    #[serde(default)]
    pub compare_at_price_cents: Option<i64>,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default = "default_status")]
    pub status: ProductStatus,
    #[serde(default = "default_true")]
    pub track_inventory: bool,
    /// Initial stock; ignored on update, where stock moves through adjustments.
    #[validate(range(min = 0, max = MAX_STOCK_QUANTITY))]
    #[serde(default)]
    pub stock_quantity: i32,
    #[validate(range(min = 0))]
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
}

fn default_status() -> ProductStatus {
    ProductStatus::Draft
}

fn default_true() -> bool {
    true
}

fn default_low_stock_threshold() -> i32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn sanitize_optional_sku(input: Option<&str>) -> Option<String> {
    input.map(sanitize_sku).filter(|value| !value.is_empty())
}

impl ProductForm {
    /// Validates and sanitizes the payload into a domain `NewProduct`.
    pub fn into_new_product(self, store_id: i32) -> FormResult<NewProduct> {
        self.validate()?;

        let mut product = NewProduct::new(store_id, required_inline(&self.name, "name")?, self.price_cents)
            .with_status(self.status)
            .with_stock(self.stock_quantity)
            .with_low_stock_threshold(self.low_stock_threshold);

        if let Some(sku) = sanitize_optional_sku(self.sku.as_deref()) {
            product = product.with_sku(sku);
        }
        if let Some(description) = optional_multiline(self.description.as_deref()) {
            product = product.with_description(description);
        }
        if let Some(category_id) = self.category_id {
            product = product.with_category_id(category_id);
        }
        if !self.track_inventory {
            product = product.untracked();
        }
        product.compare_at_price_cents = self.compare_at_price_cents;

        Ok(product)
    }

    /// Validates and sanitizes the payload into a domain `UpdateProduct`.
    pub fn into_update_product(self) -> FormResult<UpdateProduct> {
        self.validate()?;

        Ok(UpdateProduct {
            category_id: self.category_id,
            name: required_inline(&self.name, "name")?,
            sku: sanitize_optional_sku(self.sku.as_deref()),
            description: optional_multiline(self.description.as_deref()),
            price_cents: self.price_cents,
            compare_at_price_cents: self.compare_at_price_cents,
            status: self.status,
            track_inventory: self.track_inventory,
            low_stock_threshold: self.low_stock_threshold,
            updated_at: Utc::now().naive_utc(),
        })
    }
}

/// Payload used to add a variant to a product.
#[derive(Debug, Deserialize, Validate)]
pub struct VariantForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(max = SKU_MAX_LEN))]
    #[serde(default)]
    pub sku: Option<String>,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[validate(range(min = 0, max = MAX_STOCK_QUANTITY))]
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl VariantForm {
    pub fn into_new_variant(self, product_id: i32) -> FormResult<NewProductVariant> {
        self.validate()?;

        let mut attributes = BTreeMap::new();
        for (key, value) in &self.attributes {
            let key = sanitize_inline_text(key);
            if key.is_empty() {
                return Err(FormError::EmptyField { field: "attributes" });
            }
            attributes.insert(key, sanitize_inline_text(value));
        }

        Ok(NewProductVariant {
            product_id,
            name: required_inline(&self.name, "name")?,
            sku: sanitize_optional_sku(self.sku.as_deref()),
            price_cents: self.price_cents,
            stock_quantity: self.stock_quantity,
            attributes,
        })
    }
}

/// Query parameters accepted by the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub status: Option<ProductStatus>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl ProductsQuery {
    pub fn into_list_query(self) -> ProductListQuery {
        let mut query =
            ProductListQuery::new().paginate(Pagination::new(self.page, self.per_page));

        if let Some(search) = self
            .search
            .as_deref()
            .map(sanitize_inline_text)
            .filter(|value| !value.is_empty())
        {
            query = query.search(search);
        }
        if let Some(category_id) = self.category_id {
            query = query.category_id(category_id);
        }
        if let Some(status) = self.status {
            query = query.status(status);
        }

        query
    }
}

/// Multipart upload used for bulk product creation.
#[derive(MultipartForm)]
pub struct UploadProductsForm {
    /// Uploaded CSV file containing one product per row.
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

impl UploadProductsForm {
    /// Parse the uploaded CSV file into [`NewProduct`] records.
    pub fn parse(&mut self, store_id: i32) -> FormResult<Vec<NewProduct>> {
        self.csv.file.rewind()?;
        parse_products(self.csv.file.by_ref(), store_id)
    }
}

struct ProductHeaderIndexes {
    name_index: Option<usize>,
    title_index: Option<usize>,
    sku_index: Option<usize>,
    description_index: Option<usize>,
    price_index: Option<usize>,
    price_cents_index: Option<usize>,
    stock_index: Option<usize>,
    status_index: Option<usize>,
}

fn locate_product_headers(headers: &StringRecord) -> ProductHeaderIndexes {
    ProductHeaderIndexes {
        name_index: locate_header(headers, "name"),
        title_index: locate_header(headers, "title"),
        sku_index: locate_header(headers, "sku"),
        description_index: locate_header(headers, "description"),
        price_index: locate_header(headers, "price"),
        price_cents_index: locate_header(headers, "price_cents"),
        stock_index: locate_header(headers, "stock"),
        status_index: locate_header(headers, "status"),
    }
}

fn locate_header(headers: &StringRecord, expected: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(expected))
}

fn non_empty_cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|index| record.get(index))
        .filter(|value| !value.trim().is_empty())
}

/// Parse a decimal amount such as `12`, `12.5` or `12.50` into cents.
pub fn parse_decimal_price(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty()
        || fraction.len() > 2
        || !whole.chars().all(|ch| ch.is_ascii_digit())
        || !fraction.chars().all(|ch| ch.is_ascii_digit())
    {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    whole.checked_mul(100)?.checked_add(fraction)
}

fn parse_products<R: Read>(reader: R, store_id: i32) -> FormResult<Vec<NewProduct>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let indexes = locate_product_headers(&headers);

    if indexes.name_index.is_none() && indexes.title_index.is_none() {
        return Err(FormError::MissingHeader("name"));
    }
    if indexes.price_index.is_none() && indexes.price_cents_index.is_none() {
        return Err(FormError::MissingHeader("price"));
    }

    let mut products = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row_number = index + 2; // header is row 1
        let record = row?;
        let row_error = |message: String| FormError::Row {
            row: row_number,
            message,
        };

        let name = non_empty_cell(&record, indexes.name_index)
            .or_else(|| non_empty_cell(&record, indexes.title_index))
            .map(sanitize_inline_text)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| row_error("missing product name".to_string()))?;

        let price_cents = match (
            non_empty_cell(&record, indexes.price_cents_index),
            non_empty_cell(&record, indexes.price_index),
        ) {
            (Some(cents), _) => cents
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|value| *value >= 0),
            (None, Some(price)) => parse_decimal_price(price),
            (None, None) => return Err(row_error("missing price".to_string())),
        }
        .filter(|value| *value <= MAX_AMOUNT_CENTS)
        .ok_or_else(|| row_error("invalid price".to_string()))?;

        let mut product = NewProduct::new(store_id, name, price_cents);

        if let Some(sku) = non_empty_cell(&record, indexes.sku_index).map(sanitize_sku) {
            product = product.with_sku(sku);
        }

        if let Some(description) = non_empty_cell(&record, indexes.description_index)
            .map(sanitize_multiline_text)
            .filter(|value| !value.is_empty())
        {
            product = product.with_description(description);
        }

        if let Some(stock) = non_empty_cell(&record, indexes.stock_index) {
            let stock = stock
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|value| (0..=MAX_STOCK_QUANTITY).contains(value))
                .ok_or_else(|| row_error(format!("invalid stock `{stock}`")))?;
            product = product.with_stock(stock);
        }

        if let Some(status) = non_empty_cell(&record, indexes.status_index) {
            let status = status
                .trim()
                .to_lowercase()
                .parse::<ProductStatus>()
                .map_err(|err| row_error(err.to_string()))?;
            product = product.with_status(status);
        }

        products.push(product);
    }

    if products.is_empty() {
        return Err(FormError::EmptyUpload);
    }

    Ok(products)
}

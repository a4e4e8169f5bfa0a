use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::UnknownVariant;
use crate::domain::product::{
    NewProduct as DomainNewProduct, NewProductVariant as DomainNewProductVariant,
    Product as DomainProduct, ProductVariant as DomainProductVariant,
    UpdateProduct as DomainUpdateProduct,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub store_id: i32,
    pub category_id: Option<i32>,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub status: String,
    pub track_inventory: bool,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_variants)]
#[diesel(belongs_to(Product, foreign_key = product_id))]
pub struct ProductVariant {
    pub id: i32,
    pub product_id: i32,
    pub store_id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub price_cents: Option<i64>,
    pub stock_quantity: i32,
    pub attributes: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub store_id: i32,
    pub category_id: Option<i32>,
    pub name: &'a str,
    pub sku: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub status: &'a str,
    pub track_inventory: bool,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateProduct<'a> {
    pub category_id: Option<i32>,
    pub name: &'a str,
    pub sku: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub status: &'a str,
    pub track_inventory: bool,
    pub low_stock_threshold: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_variants)]
pub struct NewProductVariant<'a> {
    pub product_id: i32,
    pub store_id: i32,
    pub name: &'a str,
    pub sku: Option<&'a str>,
    pub price_cents: Option<i64>,
    pub stock_quantity: i32,
    pub attributes: String,
}

impl Product {
    pub fn into_domain(
        self,
        variants: Vec<DomainProductVariant>,
    ) -> Result<DomainProduct, UnknownVariant> {
        Ok(DomainProduct {
            id: self.id,
            store_id: self.store_id,
            category_id: self.category_id,
            name: self.name,
            sku: self.sku,
            description: self.description,
            price_cents: self.price_cents,
            compare_at_price_cents: self.compare_at_price_cents,
            status: self.status.parse()?,
            track_inventory: self.track_inventory,
            stock_quantity: self.stock_quantity,
            low_stock_threshold: self.low_stock_threshold,
            variants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<ProductVariant> for DomainProductVariant {
    type Error = serde_json::Error;

    fn try_from(value: ProductVariant) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            product_id: value.product_id,
            store_id: value.store_id,
            name: value.name,
            sku: value.sku,
            price_cents: value.price_cents,
            stock_quantity: value.stock_quantity,
            attributes: serde_json::from_str(&value.attributes)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewProduct> for NewProduct<'a> {
    fn from(value: &'a DomainNewProduct) -> Self {
        Self {
            store_id: value.store_id,
            category_id: value.category_id,
            name: value.name.as_str(),
            sku: value.sku.as_deref(),
            description: value.description.as_deref(),
            price_cents: value.price_cents,
            compare_at_price_cents: value.compare_at_price_cents,
            status: value.status.as_str(),
            track_inventory: value.track_inventory,
            stock_quantity: value.stock_quantity,
            low_stock_threshold: value.low_stock_threshold,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateProduct> for UpdateProduct<'a> {
    fn from(value: &'a DomainUpdateProduct) -> Self {
        Self {
            category_id: value.category_id,
            name: value.name.as_str(),
            sku: value.sku.as_deref(),
            description: value.description.as_deref(),
            price_cents: value.price_cents,
            compare_at_price_cents: value.compare_at_price_cents,
            status: value.status.as_str(),
            track_inventory: value.track_inventory,
            low_stock_threshold: value.low_stock_threshold,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> NewProductVariant<'a> {
    pub fn from_domain(
        store_id: i32,
        value: &'a DomainNewProductVariant,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            product_id: value.product_id,
            store_id,
            name: value.name.as_str(),
            sku: value.sku.as_deref(),
            price_cents: value.price_cents,
            stock_quantity: value.stock_quantity,
            attributes: serde_json::to_string(&value.attributes)?,
        })
    }
}

use chrono::NaiveDateTime;
use diesel::r2d2::PoolError;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

use crate::db::{DbConnection, DbPool};
use crate::domain::UnknownVariant;
use crate::domain::auth::StoreScope;
use crate::domain::category::{Category, CategoryListQuery, NewCategory, UpdateCategory};
use crate::domain::customer::{Customer, CustomerListQuery, NewCustomer};
use crate::domain::discount::{DiscountCode, NewDiscountCode};
use crate::domain::inventory::{InventoryAdjustment, LowStockItem, StockAdjustment};
use crate::domain::order::{NewOrder, Order, OrderListQuery, OrderStatusEvent, OrderStatusUpdate};
use crate::domain::product::{
    NewProduct, NewProductVariant, Product, ProductListQuery, ProductVariant, UpdateProduct,
};
use crate::domain::store::{NewStore, Store, UpdateStoreSettings, UpdateSubscription};
use crate::domain::user::{NewUser, User, UserCredentials};
use crate::pagination::Pagination;

pub mod category;
pub mod checkout;
pub mod customer;
pub mod discount;
pub mod inventory;
pub mod order;
pub mod product;
pub mod store;
pub mod user;

#[cfg(test)]
pub mod mock;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not enough stock for product {product_id}")]
    InsufficientStock { product_id: i32 },
    #[error("price of product {product_id} changed during checkout")]
    PriceChanged { product_id: i32 },
    #[error("limit reached: {0}")]
    LimitReached(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("database error: {0}")]
    Database(diesel::result::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<diesel::result::Error> for RepositoryError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::NotFound => RepositoryError::NotFound,
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepositoryError::Conflict(info.message().to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}

impl From<UnknownVariant> for RepositoryError {
    fn from(value: UnknownVariant) -> Self {
        RepositoryError::InvalidData(value.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(value: serde_json::Error) -> Self {
        RepositoryError::InvalidData(value.to_string())
    }
}

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Outcome of a committed checkout.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    /// Tracked products whose stock fell to or below their threshold.
    pub low_stock: Vec<LowStockItem>,
}

pub trait StoreReader {
    fn get_store(&self, scope: &StoreScope, store_id: i32) -> RepositoryResult<Option<Store>>;
    /// Unscoped lookup used by public registration.
    fn get_store_by_slug(&self, slug: &str) -> RepositoryResult<Option<Store>>;
    fn list_stores(&self, pagination: Pagination) -> RepositoryResult<(usize, Vec<Store>)>;
}

pub trait StoreWriter {
    /// Create a store and its first administrator in one transaction.
    fn create_store_with_admin(
        &self,
        new_store: &NewStore,
        admin: &NewUser,
    ) -> RepositoryResult<(Store, User)>;
    fn update_store_settings(
        &self,
        scope: &StoreScope,
        store_id: i32,
        updates: &UpdateStoreSettings,
    ) -> RepositoryResult<Store>;
    fn update_subscription(
        &self,
        scope: &StoreScope,
        store_id: i32,
        updates: &UpdateSubscription,
    ) -> RepositoryResult<Store>;
}

pub trait UserReader {
    fn get_credentials_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>>;
    fn list_users(&self, scope: &StoreScope) -> RepositoryResult<Vec<User>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    /// Create a customer login together with its customer record.
    fn register_customer(
        &self,
        new_user: &NewUser,
        new_customer: &NewCustomer,
    ) -> RepositoryResult<(User, Customer)>;
}

/// Read-only operations over category records.
pub trait CategoryReader {
    fn list_categories(
        &self,
        scope: &StoreScope,
        query: &CategoryListQuery,
    ) -> RepositoryResult<Vec<Category>>;
    fn get_category_by_id(
        &self,
        scope: &StoreScope,
        category_id: i32,
    ) -> RepositoryResult<Option<Category>>;
}

/// Write operations over category records.
pub trait CategoryWriter {
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn update_category(
        &self,
        scope: &StoreScope,
        category_id: i32,
        updates: &UpdateCategory,
    ) -> RepositoryResult<Category>;
    fn delete_category(&self, scope: &StoreScope, category_id: i32) -> RepositoryResult<()>;
}

pub trait ProductReader {
    fn get_product_by_id(
        &self,
        scope: &StoreScope,
        product_id: i32,
    ) -> RepositoryResult<Option<Product>>;
    fn get_products_by_ids(
        &self,
        scope: &StoreScope,
        product_ids: &[i32],
    ) -> RepositoryResult<Vec<Product>>;
    fn list_products(
        &self,
        scope: &StoreScope,
        query: &ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Number of products that count against the plan limit (not archived).
    fn count_products(&self, scope: &StoreScope) -> RepositoryResult<usize>;
}

pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    /// Insert every product or none of them.
    fn create_products(&self, new_products: &[NewProduct]) -> RepositoryResult<usize>;
    fn update_product(
        &self,
        scope: &StoreScope,
        product_id: i32,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Product>;
    fn archive_product(&self, scope: &StoreScope, product_id: i32) -> RepositoryResult<()>;
    fn add_variant(
        &self,
        scope: &StoreScope,
        new_variant: &NewProductVariant,
    ) -> RepositoryResult<ProductVariant>;
    fn delete_variant(
        &self,
        scope: &StoreScope,
        product_id: i32,
        variant_id: i32,
    ) -> RepositoryResult<()>;
}

pub trait CustomerReader {
    fn get_customer_by_id(
        &self,
        scope: &StoreScope,
        customer_id: i32,
    ) -> RepositoryResult<Option<Customer>>;
    fn get_customer_by_user_id(
        &self,
        scope: &StoreScope,
        user_id: i32,
    ) -> RepositoryResult<Option<Customer>>;
    fn list_customers(
        &self,
        scope: &StoreScope,
        query: &CustomerListQuery,
    ) -> RepositoryResult<(usize, Vec<Customer>)>;
    fn count_new_customers(
        &self,
        scope: &StoreScope,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<usize>;
}

pub trait CustomerWriter {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
    /// Overwrite the customer's personal data and scrub it from their orders.
    fn anonymize_customer(
        &self,
        scope: &StoreScope,
        customer_id: i32,
    ) -> RepositoryResult<Customer>;
}

pub trait OrderReader {
    fn get_order_by_id(&self, scope: &StoreScope, order_id: i32)
    -> RepositoryResult<Option<Order>>;
    fn list_orders(
        &self,
        scope: &StoreScope,
        query: &OrderListQuery,
    ) -> RepositoryResult<(usize, Vec<Order>)>;
    fn list_order_events(
        &self,
        scope: &StoreScope,
        order_id: i32,
    ) -> RepositoryResult<Vec<OrderStatusEvent>>;
    fn count_orders_since(&self, scope: &StoreScope, since: NaiveDateTime)
    -> RepositoryResult<usize>;
}

pub trait OrderWriter {
    /// Apply a planned status change with its side effects. Fails with
    /// `Conflict` when the stored status no longer matches `update.from`.
    fn update_order_status(
        &self,
        scope: &StoreScope,
        order_id: i32,
        update: &OrderStatusUpdate,
    ) -> RepositoryResult<Order>;
}

pub trait CheckoutWriter {
    /// Persist a priced order, deducting stock atomically.
    fn place_order(&self, scope: &StoreScope, new_order: &NewOrder)
    -> RepositoryResult<PlacedOrder>;
}

pub trait DiscountReader {
    fn list_discount_codes(&self, scope: &StoreScope) -> RepositoryResult<Vec<DiscountCode>>;
    fn get_discount_by_code(
        &self,
        scope: &StoreScope,
        code: &str,
    ) -> RepositoryResult<Option<DiscountCode>>;
}

pub trait DiscountWriter {
    fn create_discount_code(&self, new_code: &NewDiscountCode) -> RepositoryResult<DiscountCode>;
    fn deactivate_discount_code(
        &self,
        scope: &StoreScope,
        discount_id: i32,
    ) -> RepositoryResult<DiscountCode>;
}

pub trait InventoryReader {
    fn list_low_stock(&self, scope: &StoreScope) -> RepositoryResult<Vec<LowStockItem>>;
    fn list_adjustments(
        &self,
        scope: &StoreScope,
        product_id: Option<i32>,
        pagination: Pagination,
    ) -> RepositoryResult<(usize, Vec<InventoryAdjustment>)>;
}

pub trait InventoryWriter {
    /// Apply a manual stock change and record it in the ledger.
    fn adjust_stock(
        &self,
        scope: &StoreScope,
        adjustment: &StockAdjustment,
    ) -> RepositoryResult<Product>;
}

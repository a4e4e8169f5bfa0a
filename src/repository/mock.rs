use chrono::NaiveDateTime;
use mockall::mock;

use super::{
    CategoryReader, CategoryWriter, CheckoutWriter, CustomerReader, CustomerWriter,
    DiscountReader, DiscountWriter, InventoryReader, InventoryWriter, OrderReader, OrderWriter,
    PlacedOrder, ProductReader, ProductWriter, RepositoryResult, StoreReader, StoreWriter,
    UserReader, UserWriter,
};
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

mock! {
    pub StoreReader {}

    impl StoreReader for StoreReader {
        fn get_store(&self, scope: &StoreScope, store_id: i32) -> RepositoryResult<Option<Store>>;
        fn get_store_by_slug(&self, slug: &str) -> RepositoryResult<Option<Store>>;
        fn list_stores(&self, pagination: Pagination) -> RepositoryResult<(usize, Vec<Store>)>;
    }
}

mock! {
    pub StoreWriter {}

    impl StoreWriter for StoreWriter {
        fn create_store_with_admin(&self, new_store: &NewStore, admin: &NewUser) -> RepositoryResult<(Store, User)>;
        fn update_store_settings(&self, scope: &StoreScope, store_id: i32, updates: &UpdateStoreSettings) -> RepositoryResult<Store>;
        fn update_subscription(&self, scope: &StoreScope, store_id: i32, updates: &UpdateSubscription) -> RepositoryResult<Store>;
    }
}

mock! {
    pub UserReader {}

    impl UserReader for UserReader {
        fn get_credentials_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>>;
        fn list_users(&self, scope: &StoreScope) -> RepositoryResult<Vec<User>>;
    }
}

mock! {
    pub UserWriter {}

    impl UserWriter for UserWriter {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn register_customer(&self, new_user: &NewUser, new_customer: &NewCustomer) -> RepositoryResult<(User, Customer)>;
    }
}

mock! {
    pub CategoryReader {}

    impl CategoryReader for CategoryReader {
        fn list_categories(&self, scope: &StoreScope, query: &CategoryListQuery) -> RepositoryResult<Vec<Category>>;
        fn get_category_by_id(&self, scope: &StoreScope, category_id: i32) -> RepositoryResult<Option<Category>>;
    }
}

mock! {
    pub CategoryWriter {}

    impl CategoryWriter for CategoryWriter {
        fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn update_category(&self, scope: &StoreScope, category_id: i32, updates: &UpdateCategory) -> RepositoryResult<Category>;
        fn delete_category(&self, scope: &StoreScope, category_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn get_product_by_id(&self, scope: &StoreScope, product_id: i32) -> RepositoryResult<Option<Product>>;
        fn get_products_by_ids(&self, scope: &StoreScope, product_ids: &[i32]) -> RepositoryResult<Vec<Product>>;
        fn list_products(&self, scope: &StoreScope, query: &ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
        fn count_products(&self, scope: &StoreScope) -> RepositoryResult<usize>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn create_products(&self, new_products: &[NewProduct]) -> RepositoryResult<usize>;
        fn update_product(&self, scope: &StoreScope, product_id: i32, updates: &UpdateProduct) -> RepositoryResult<Product>;
        fn archive_product(&self, scope: &StoreScope, product_id: i32) -> RepositoryResult<()>;
        fn add_variant(&self, scope: &StoreScope, new_variant: &NewProductVariant) -> RepositoryResult<ProductVariant>;
        fn delete_variant(&self, scope: &StoreScope, product_id: i32, variant_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub CustomerReader {}

    impl CustomerReader for CustomerReader {
        fn get_customer_by_id(&self, scope: &StoreScope, customer_id: i32) -> RepositoryResult<Option<Customer>>;
        fn get_customer_by_user_id(&self, scope: &StoreScope, user_id: i32) -> RepositoryResult<Option<Customer>>;
        fn list_customers(&self, scope: &StoreScope, query: &CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
        fn count_new_customers(&self, scope: &StoreScope, from: NaiveDateTime, to: NaiveDateTime) -> RepositoryResult<usize>;
    }
}

mock! {
    pub CustomerWriter {}

    impl CustomerWriter for CustomerWriter {
        fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
        fn anonymize_customer(&self, scope: &StoreScope, customer_id: i32) -> RepositoryResult<Customer>;
    }
}

mock! {
    pub OrderReader {}

    impl OrderReader for OrderReader {
        fn get_order_by_id(&self, scope: &StoreScope, order_id: i32) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self, scope: &StoreScope, query: &OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
        fn list_order_events(&self, scope: &StoreScope, order_id: i32) -> RepositoryResult<Vec<OrderStatusEvent>>;
        fn count_orders_since(&self, scope: &StoreScope, since: NaiveDateTime) -> RepositoryResult<usize>;
    }
}

mock! {
    pub OrderWriter {}

    impl OrderWriter for OrderWriter {
        fn update_order_status(&self, scope: &StoreScope, order_id: i32, update: &OrderStatusUpdate) -> RepositoryResult<Order>;
    }
}

mock! {
    pub CheckoutWriter {}

    impl CheckoutWriter for CheckoutWriter {
        fn place_order(&self, scope: &StoreScope, new_order: &NewOrder) -> RepositoryResult<PlacedOrder>;
    }
}

mock! {
    pub DiscountReader {}

    impl DiscountReader for DiscountReader {
        fn list_discount_codes(&self, scope: &StoreScope) -> RepositoryResult<Vec<DiscountCode>>;
        fn get_discount_by_code(&self, scope: &StoreScope, code: &str) -> RepositoryResult<Option<DiscountCode>>;
    }
}

mock! {
    pub DiscountWriter {}

    impl DiscountWriter for DiscountWriter {
        fn create_discount_code(&self, new_code: &NewDiscountCode) -> RepositoryResult<DiscountCode>;
        fn deactivate_discount_code(&self, scope: &StoreScope, discount_id: i32) -> RepositoryResult<DiscountCode>;
    }
}

mock! {
    pub InventoryReader {}

    impl InventoryReader for InventoryReader {
        fn list_low_stock(&self, scope: &StoreScope) -> RepositoryResult<Vec<LowStockItem>>;
        fn list_adjustments(&self, scope: &StoreScope, product_id: Option<i32>, pagination: Pagination) -> RepositoryResult<(usize, Vec<InventoryAdjustment>)>;
    }
}

mock! {
    pub InventoryWriter {}

    impl InventoryWriter for InventoryWriter {
        fn adjust_stock(&self, scope: &StoreScope, adjustment: &StockAdjustment) -> RepositoryResult<Product>;
    }
}

/// Repository double that implements every trait by delegating to the
/// per-trait mocks, so services with several bounds can be tested.
#[derive(Default)]
pub struct MockRepo {
    pub store_reader: MockStoreReader,
    pub store_writer: MockStoreWriter,
    pub user_reader: MockUserReader,
    pub user_writer: MockUserWriter,
    pub category_reader: MockCategoryReader,
    pub category_writer: MockCategoryWriter,
    pub product_reader: MockProductReader,
    pub product_writer: MockProductWriter,
    pub customer_reader: MockCustomerReader,
    pub customer_writer: MockCustomerWriter,
    pub order_reader: MockOrderReader,
    pub order_writer: MockOrderWriter,
    pub checkout_writer: MockCheckoutWriter,
    pub discount_reader: MockDiscountReader,
    pub discount_writer: MockDiscountWriter,
    pub inventory_reader: MockInventoryReader,
    pub inventory_writer: MockInventoryWriter,
}

impl MockRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreReader for MockRepo {
    fn get_store(&self, scope: &StoreScope, store_id: i32) -> RepositoryResult<Option<Store>> {
        self.store_reader.get_store(scope, store_id)
    }

    fn get_store_by_slug(&self, slug: &str) -> RepositoryResult<Option<Store>> {
        self.store_reader.get_store_by_slug(slug)
    }

    fn list_stores(&self, pagination: Pagination) -> RepositoryResult<(usize, Vec<Store>)> {
        self.store_reader.list_stores(pagination)
    }
}

impl StoreWriter for MockRepo {
    fn create_store_with_admin(
        &self,
        new_store: &NewStore,
        admin: &NewUser,
    ) -> RepositoryResult<(Store, User)> {
        self.store_writer.create_store_with_admin(new_store, admin)
    }

    fn update_store_settings(
        &self,
        scope: &StoreScope,
        store_id: i32,
        updates: &UpdateStoreSettings,
    ) -> RepositoryResult<Store> {
        self.store_writer
            .update_store_settings(scope, store_id, updates)
    }

    fn update_subscription(
        &self,
        scope: &StoreScope,
        store_id: i32,
        updates: &UpdateSubscription,
    ) -> RepositoryResult<Store> {
        self.store_writer
            .update_subscription(scope, store_id, updates)
    }
}

impl UserReader for MockRepo {
    fn get_credentials_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>> {
        self.user_reader.get_credentials_by_email(email)
    }

    fn list_users(&self, scope: &StoreScope) -> RepositoryResult<Vec<User>> {
        self.user_reader.list_users(scope)
    }
}

impl UserWriter for MockRepo {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        self.user_writer.create_user(new_user)
    }

    fn register_customer(
        &self,
        new_user: &NewUser,
        new_customer: &NewCustomer,
    ) -> RepositoryResult<(User, Customer)> {
        self.user_writer.register_customer(new_user, new_customer)
    }
}

impl CategoryReader for MockRepo {
    fn list_categories(
        &self,
        scope: &StoreScope,
        query: &CategoryListQuery,
    ) -> RepositoryResult<Vec<Category>> {
        self.category_reader.list_categories(scope, query)
    }

    fn get_category_by_id(
        &self,
        scope: &StoreScope,
        category_id: i32,
    ) -> RepositoryResult<Option<Category>> {
        self.category_reader.get_category_by_id(scope, category_id)
    }
}

impl CategoryWriter for MockRepo {
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category> {
        self.category_writer.create_category(new_category)
    }

    fn update_category(
        &self,
        scope: &StoreScope,
        category_id: i32,
        updates: &UpdateCategory,
    ) -> RepositoryResult<Category> {
        self.category_writer
            .update_category(scope, category_id, updates)
    }

    fn delete_category(&self, scope: &StoreScope, category_id: i32) -> RepositoryResult<()> {
        self.category_writer.delete_category(scope, category_id)
    }
}

impl ProductReader for MockRepo {
    fn get_product_by_id(
        &self,
        scope: &StoreScope,
        product_id: i32,
    ) -> RepositoryResult<Option<Product>> {
        self.product_reader.get_product_by_id(scope, product_id)
    }

    fn get_products_by_ids(
        &self,
        scope: &StoreScope,
        product_ids: &[i32],
    ) -> RepositoryResult<Vec<Product>> {
        self.product_reader.get_products_by_ids(scope, product_ids)
    }

    fn list_products(
        &self,
        scope: &StoreScope,
        query: &ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<Product>)> {
        self.product_reader.list_products(scope, query)
    }

    fn count_products(&self, scope: &StoreScope) -> RepositoryResult<usize> {
        self.product_reader.count_products(scope)
    }
}

impl ProductWriter for MockRepo {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product> {
        self.product_writer.create_product(new_product)
    }

    fn create_products(&self, new_products: &[NewProduct]) -> RepositoryResult<usize> {
        self.product_writer.create_products(new_products)
    }

    fn update_product(
        &self,
        scope: &StoreScope,
        product_id: i32,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Product> {
        self.product_writer
            .update_product(scope, product_id, updates)
    }

    fn archive_product(&self, scope: &StoreScope, product_id: i32) -> RepositoryResult<()> {
        self.product_writer.archive_product(scope, product_id)
    }

    fn add_variant(
        &self,
        scope: &StoreScope,
        new_variant: &NewProductVariant,
    ) -> RepositoryResult<ProductVariant> {
        self.product_writer.add_variant(scope, new_variant)
    }

    fn delete_variant(
        &self,
        scope: &StoreScope,
        product_id: i32,
        variant_id: i32,
    ) -> RepositoryResult<()> {
        self.product_writer
            .delete_variant(scope, product_id, variant_id)
    }
}

impl CustomerReader for MockRepo {
    fn get_customer_by_id(
        &self,
        scope: &StoreScope,
        customer_id: i32,
    ) -> RepositoryResult<Option<Customer>> {
        self.customer_reader.get_customer_by_id(scope, customer_id)
    }

    fn get_customer_by_user_id(
        &self,
        scope: &StoreScope,
        user_id: i32,
    ) -> RepositoryResult<Option<Customer>> {
        self.customer_reader.get_customer_by_user_id(scope, user_id)
    }

    fn list_customers(
        &self,
        scope: &StoreScope,
        query: &CustomerListQuery,
    ) -> RepositoryResult<(usize, Vec<Customer>)> {
        self.customer_reader.list_customers(scope, query)
    }

    fn count_new_customers(
        &self,
        scope: &StoreScope,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        self.customer_reader.count_new_customers(scope, from, to)
    }
}

impl CustomerWriter for MockRepo {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer> {
        self.customer_writer.create_customer(new_customer)
    }

    fn anonymize_customer(
        &self,
        scope: &StoreScope,
        customer_id: i32,
    ) -> RepositoryResult<Customer> {
        self.customer_writer.anonymize_customer(scope, customer_id)
    }
}

impl OrderReader for MockRepo {
    fn get_order_by_id(
        &self,
        scope: &StoreScope,
        order_id: i32,
    ) -> RepositoryResult<Option<Order>> {
        self.order_reader.get_order_by_id(scope, order_id)
    }

    fn list_orders(
        &self,
        scope: &StoreScope,
        query: &OrderListQuery,
    ) -> RepositoryResult<(usize, Vec<Order>)> {
        self.order_reader.list_orders(scope, query)
    }

    fn list_order_events(
        &self,
        scope: &StoreScope,
        order_id: i32,
    ) -> RepositoryResult<Vec<OrderStatusEvent>> {
        self.order_reader.list_order_events(scope, order_id)
    }

    fn count_orders_since(
        &self,
        scope: &StoreScope,
        since: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        self.order_reader.count_orders_since(scope, since)
    }
}

impl OrderWriter for MockRepo {
    fn update_order_status(
        &self,
        scope: &StoreScope,
        order_id: i32,
        update: &OrderStatusUpdate,
    ) -> RepositoryResult<Order> {
        self.order_writer
            .update_order_status(scope, order_id, update)
    }
}

impl CheckoutWriter for MockRepo {
    fn place_order(
        &self,
        scope: &StoreScope,
        new_order: &NewOrder,
    ) -> RepositoryResult<PlacedOrder> {
        self.checkout_writer.place_order(scope, new_order)
    }
}

impl DiscountReader for MockRepo {
    fn list_discount_codes(&self, scope: &StoreScope) -> RepositoryResult<Vec<DiscountCode>> {
        self.discount_reader.list_discount_codes(scope)
    }

    fn get_discount_by_code(
        &self,
        scope: &StoreScope,
        code: &str,
    ) -> RepositoryResult<Option<DiscountCode>> {
        self.discount_reader.get_discount_by_code(scope, code)
    }
}

impl DiscountWriter for MockRepo {
    fn create_discount_code(&self, new_code: &NewDiscountCode) -> RepositoryResult<DiscountCode> {
        self.discount_writer.create_discount_code(new_code)
    }

    fn deactivate_discount_code(
        &self,
        scope: &StoreScope,
        discount_id: i32,
    ) -> RepositoryResult<DiscountCode> {
        self.discount_writer
            .deactivate_discount_code(scope, discount_id)
    }
}

impl InventoryReader for MockRepo {
    fn list_low_stock(&self, scope: &StoreScope) -> RepositoryResult<Vec<LowStockItem>> {
        self.inventory_reader.list_low_stock(scope)
    }

    fn list_adjustments(
        &self,
        scope: &StoreScope,
        product_id: Option<i32>,
        pagination: Pagination,
    ) -> RepositoryResult<(usize, Vec<InventoryAdjustment>)> {
        self.inventory_reader
            .list_adjustments(scope, product_id, pagination)
    }
}

impl InventoryWriter for MockRepo {
    fn adjust_stock(
        &self,
        scope: &StoreScope,
        adjustment: &StockAdjustment,
    ) -> RepositoryResult<Product> {
        self.inventory_writer.adjust_stock(scope, adjustment)
    }
}

//! Helpers for integration tests.
#![allow(dead_code)]

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use storehub::db::{DbPool, establish_connection_pool};
use storehub::domain::auth::{AuthenticatedUser, Role, StoreScope};
use storehub::domain::product::{NewProduct, Product, ProductStatus};
use storehub::domain::store::{NewStore, Store};
use storehub::domain::user::NewUser;
use storehub::forms::auth::RegisterForm;
use storehub::repository::{DieselRepository, ProductWriter, StoreWriter};
use storehub::services::auth::{hash_password, register_customer};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub const PASSWORD: &str = "correct-horse";

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

pub fn scope(user: &AuthenticatedUser) -> StoreScope {
    StoreScope::for_user(user).expect("store scope")
}

/// Create a store with its admin; the admin logs in as `admin@{slug}.test`.
pub fn seed_store(repo: &DieselRepository, slug: &str) -> (Store, AuthenticatedUser) {
    let admin = NewUser::new(
        None,
        format!("{slug} admin"),
        format!("admin@{slug}.test"),
        hash_password(PASSWORD).expect("hash"),
        Role::StoreAdmin,
    );
    let (store, user) = repo
        .create_store_with_admin(&NewStore::new(slug, slug, "USD"), &admin)
        .expect("create store");
    (store, AuthenticatedUser::from(&user))
}

pub fn seed_customer(repo: &DieselRepository, slug: &str, email: &str) -> AuthenticatedUser {
    let form = RegisterForm {
        store_slug: slug.to_string(),
        name: "Jane Doe".to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        phone: None,
    };
    let (user, _) = register_customer(repo, form).expect("register customer");
    user
}

pub fn seed_product(repo: &DieselRepository, store_id: i32, price_cents: i64, stock: i32) -> Product {
    let mut product = NewProduct::new(store_id, "Espresso beans", price_cents);
    product.status = ProductStatus::Active;
    product.stock_quantity = stock;
    product.low_stock_threshold = 1;
    repo.create_product(&product).expect("create product")
}

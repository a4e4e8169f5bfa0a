pub mod category;
pub mod customer;
pub mod discount;
pub mod inventory;
pub mod order;
pub mod product;
pub mod store;
pub mod user;

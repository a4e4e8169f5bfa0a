pub mod config;
pub mod db;
pub mod documents;
pub mod domain;
pub mod forms;
pub mod models;
pub mod notifications;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

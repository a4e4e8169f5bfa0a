//! HTTP handlers and the JSON envelopes they respond with.
//!
//! Successful responses are `{"data": ..., "meta": ...}`, failures are
//! `{"error": {"code", "message", "details"}}`.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::auth::AuthenticatedUser;
use crate::pagination::Paginated;
use crate::services::ServiceError;

pub mod analytics;
pub mod auth;
pub mod billing;
pub mod categories;
pub mod checkout;
pub mod customers;
pub mod discounts;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod stores;
pub mod users;

/// Error returned by every handler, rendered as the error envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::BadRequest(_) => "VALIDATION_ERROR",
            ApiError::Service(err) => match err {
                ServiceError::Forbidden => "FORBIDDEN",
                ServiceError::NotFound => "NOT_FOUND",
                ServiceError::Form(_) | ServiceError::Validation(_) => "VALIDATION_ERROR",
                ServiceError::InvalidTransition(_) => "INVALID_TRANSITION",
                ServiceError::TrackingNumberRequired => "TRACKING_NUMBER_REQUIRED",
                ServiceError::ConfirmationRequired(_) => "CONFIRMATION_REQUIRED",
                ServiceError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
                ServiceError::PriceChanged { .. } => "PRICE_CHANGED",
                ServiceError::PlanLimit(_) => "PLAN_LIMIT_REACHED",
                ServiceError::Conflict(_) => "CONFLICT",
                ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
                ServiceError::Internal(_) | ServiceError::Repository(_) => "INTERNAL_ERROR",
            },
        }
    }

    fn details(&self) -> Value {
        match self {
            ApiError::Service(ServiceError::Validation(errors)) => {
                serde_json::to_value(errors).unwrap_or(Value::Null)
            }
            ApiError::Service(
                ServiceError::InsufficientStock { product_id }
                | ServiceError::PriceChanged { product_id },
            ) => json!({ "product_id": product_id }),
            _ => Value::Null,
        }
    }

    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::Forbidden | ServiceError::PlanLimit(_) => StatusCode::FORBIDDEN,
                ServiceError::NotFound => StatusCode::NOT_FOUND,
                ServiceError::Form(_)
                | ServiceError::Validation(_)
                | ServiceError::InvalidTransition(_)
                | ServiceError::TrackingNumberRequired
                | ServiceError::ConfirmationRequired(_) => StatusCode::BAD_REQUEST,
                ServiceError::InsufficientStock { .. }
                | ServiceError::PriceChanged { .. }
                | ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                ServiceError::Internal(_) | ServiceError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_internal() {
            log::error!("Request failed: {self}");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": {
                "code": self.code(),
                "message": message,
                "details": self.details(),
            }
        }))
    }
}

pub type ApiResult = Result<HttpResponse, ApiError>;

/// `200 OK` with `data` in the success envelope.
pub fn ok<T: Serialize>(data: T) -> ApiResult {
    Ok(HttpResponse::Ok().json(json!({ "data": data, "meta": {} })))
}

/// `201 Created` with `data` in the success envelope.
pub fn created<T: Serialize>(data: T) -> ApiResult {
    Ok(HttpResponse::Created().json(json!({ "data": data, "meta": {} })))
}

/// One page of items, the pager numbers go into `meta`.
pub fn paginated<T: Serialize>(page: Paginated<T>) -> ApiResult {
    Ok(HttpResponse::Ok().json(json!({
        "data": page.items,
        "meta": {
            "page": page.page,
            "per_page": page.per_page,
            "total": page.total,
            "total_pages": page.total_pages,
        }
    })))
}

/// Raw file download.
pub fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> ApiResult {
    Ok(HttpResponse::Ok()
        .content_type(content_type.to_string())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename.to_string())],
        })
        .body(body))
}

fn user_from_request(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let identity = req.get_identity().map_err(|_| ApiError::Unauthorized)?;
    let id = identity.id().map_err(|_| ApiError::Unauthorized)?;

    serde_json::from_str(&id).map_err(|err| {
        log::warn!("Discarding unreadable session identity: {err}");
        ApiError::Unauthorized
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(user_from_request(req))
    }
}

/// Extractor configs that render malformed bodies, queries and paths in the
/// error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

/// Registers every API route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health).service(
        web::scope("/api")
            .service(auth::login)
            .service(auth::logout)
            .service(auth::register)
            .service(auth::me)
            .service(stores::show_stores)
            .service(stores::add_store)
            .service(stores::show_settings)
            .service(stores::edit_settings)
            .service(users::show_users)
            .service(users::add_user)
            .service(products::export_products)
            .service(products::import_products)
            .service(products::show_products)
            .service(products::add_product)
            .service(products::show_product)
            .service(products::edit_product)
            .service(products::delete_product)
            .service(products::add_variant)
            .service(products::delete_variant)
            .service(categories::show_categories)
            .service(categories::add_category)
            .service(categories::edit_category)
            .service(categories::delete_category)
            .service(inventory::show_low_stock)
            .service(inventory::show_adjustments)
            .service(inventory::adjust)
            .service(customers::show_customers)
            .service(customers::show_customer)
            .service(customers::export_customer)
            .service(customers::erase_customer)
            .service(customers::export_account)
            .service(orders::export_orders)
            .service(orders::show_orders)
            .service(orders::show_order)
            .service(orders::show_invoice)
            .service(orders::show_history)
            .service(orders::change_status)
            .service(checkout::complete)
            .service(analytics::dashboard)
            .service(billing::show_subscription)
            .service(billing::change_subscription)
            .service(billing::cancel)
            .service(discounts::show_discounts)
            .service(discounts::add_discount)
            .service(discounts::delete_discount),
    );
}

use thiserror::Error;
use validator::ValidationErrors;

use crate::documents::DocumentError;
use crate::domain::auth::{AuthenticatedUser, Role, StoreScope};
use crate::domain::checkout::PricingError;
use crate::domain::order::TransitionError;
use crate::forms::FormError;
use crate::repository::RepositoryError;

pub mod analytics;
pub mod auth;
pub mod billing;
pub mod categories;
pub mod checkout;
pub mod customers;
pub mod discounts;
pub mod gdpr;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod stores;
pub mod users;

/// Errors returned by the service layer. Each variant maps to one API error code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("you do not have access to this resource")]
    Forbidden,
    #[error("resource not found")]
    NotFound,
    #[error("{0}")]
    Form(String),
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("a tracking number is required to mark an order as shipped")]
    TrackingNumberRequired,
    #[error("{0}")]
    ConfirmationRequired(String),
    #[error("not enough stock for product {product_id}")]
    InsufficientStock { product_id: i32 },
    #[error("the price of product {product_id} changed, review the cart and retry")]
    PriceChanged { product_id: i32 },
    #[error("{0}")]
    PlanLimit(String),
    #[error("{0}")]
    Conflict(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(String),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::InsufficientStock { product_id } => {
                ServiceError::InsufficientStock { product_id }
            }
            RepositoryError::PriceChanged { product_id } => ServiceError::PriceChanged { product_id },
            RepositoryError::LimitReached(message) => ServiceError::PlanLimit(message),
            other => ServiceError::Repository(other),
        }
    }
}

impl From<TransitionError> for ServiceError {
    fn from(value: TransitionError) -> Self {
        match value {
            TransitionError::TrackingNumberRequired => ServiceError::TrackingNumberRequired,
            TransitionError::ConfirmationRequired { .. } => {
                ServiceError::ConfirmationRequired(value.to_string())
            }
            TransitionError::Terminal { .. } | TransitionError::NotAllowed { .. } => {
                ServiceError::InvalidTransition(value.to_string())
            }
        }
    }
}

impl From<PricingError> for ServiceError {
    fn from(value: PricingError) -> Self {
        match value {
            PricingError::InsufficientStock { product_id } => {
                ServiceError::InsufficientStock { product_id }
            }
            other => ServiceError::Form(other.to_string()),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(value: FormError) -> Self {
        match value {
            FormError::Validation(errors) => ServiceError::Validation(errors),
            other => ServiceError::Form(other.to_string()),
        }
    }
}

impl From<DocumentError> for ServiceError {
    fn from(value: DocumentError) -> Self {
        ServiceError::Internal(value.to_string())
    }
}

/// Reject `user` unless their role is one of `roles`.
pub fn ensure_role(user: &AuthenticatedUser, roles: &[Role]) -> ServiceResult<()> {
    if user.role.is_any(roles) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

/// Tenant scope of `user`; store-bound roles without a store get nothing.
pub fn scope_for(user: &AuthenticatedUser) -> ServiceResult<StoreScope> {
    StoreScope::for_user(user).ok_or(ServiceError::Forbidden)
}

/// Store owning new records created in `scope`. The platform scope cannot
/// create tenant rows.
pub fn owning_store(scope: &StoreScope) -> ServiceResult<i32> {
    scope.store_id().ok_or(ServiceError::Forbidden)
}

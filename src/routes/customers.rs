use actix_web::{delete, get, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::customers::CustomersQuery;
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, ok, paginated};
use crate::services::{customers as customer_service, gdpr};

#[get("/customers")]
pub async fn show_customers(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<CustomersQuery>,
) -> ApiResult {
    paginated(customer_service::list_customers(
        repo.get_ref(),
        &user,
        params.into_inner(),
    )?)
}

#[get("/customers/{customer_id}")]
pub async fn show_customer(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(customer_service::get_customer(
        repo.get_ref(),
        &user,
        path.into_inner(),
    )?)
}

#[get("/customers/{customer_id}/export")]
pub async fn export_customer(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(gdpr::export_customer(repo.get_ref(), &user, path.into_inner())?)
}

/// Erase a customer's personal data. Their orders are kept.
#[delete("/customers/{customer_id}")]
pub async fn erase_customer(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let customer = gdpr::erase_customer(repo.get_ref(), &user, path.into_inner())?;
    log::info!("customer {} erased by user {}", customer.id, user.id);
    ok(customer)
}

#[get("/account/export")]
pub async fn export_account(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(gdpr::export_own_data(repo.get_ref(), &user)?)
}

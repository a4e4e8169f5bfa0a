use actix_web::{get, post, web};
use chrono::Utc;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::billing::ChangePlanForm;
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, ok};
use crate::services::billing as billing_service;

#[get("/billing/subscription")]
pub async fn show_subscription(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(billing_service::load_subscription(
        repo.get_ref(),
        &user,
        Utc::now().naive_utc(),
    )?)
}

#[post("/billing/subscription")]
pub async fn change_subscription(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<ChangePlanForm>,
) -> ApiResult {
    ok(billing_service::change_plan(
        repo.get_ref(),
        &user,
        form.into_inner(),
        Utc::now().naive_utc(),
    )?)
}

#[post("/billing/subscription/cancel")]
pub async fn cancel(user: AuthenticatedUser, repo: web::Data<DieselRepository>) -> ApiResult {
    ok(billing_service::cancel_subscription(
        repo.get_ref(),
        &user,
        Utc::now().naive_utc(),
    )?)
}

use actix_web::{post, web};
use chrono::Utc;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::checkout::CheckoutForm;
use crate::notifications::OrderNotifier;
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, created};
use crate::services::checkout::complete_checkout;

#[post("/checkout/complete")]
pub async fn complete(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn OrderNotifier>,
    form: web::Json<CheckoutForm>,
) -> ApiResult {
    created(complete_checkout(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        form.into_inner(),
        Utc::now().naive_utc(),
    )?)
}

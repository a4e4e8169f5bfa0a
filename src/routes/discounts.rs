use actix_web::{delete, get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::discounts::DiscountForm;
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, created, ok};
use crate::services::discounts::{create_discount, deactivate_discount, list_discounts};

#[get("/discounts")]
pub async fn show_discounts(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(list_discounts(repo.get_ref(), &user)?)
}

#[post("/discounts")]
pub async fn add_discount(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<DiscountForm>,
) -> ApiResult {
    created(create_discount(repo.get_ref(), &user, form.into_inner())?)
}

/// Deactivate a code. Orders that used it keep the code text.
#[delete("/discounts/{discount_id}")]
pub async fn delete_discount(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(deactivate_discount(
        repo.get_ref(),
        &user,
        path.into_inner(),
    )?)
}

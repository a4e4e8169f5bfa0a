use actix_web::{get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::inventory::{AdjustStockForm, AdjustmentsQuery};
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, ok, paginated};
use crate::services::inventory as inventory_service;

#[get("/inventory/low-stock")]
pub async fn show_low_stock(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(inventory_service::list_low_stock(repo.get_ref(), &user)?)
}

#[get("/inventory/adjustments")]
pub async fn show_adjustments(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<AdjustmentsQuery>,
) -> ApiResult {
    paginated(inventory_service::list_adjustments(
        repo.get_ref(),
        &user,
        params.into_inner(),
    )?)
}

#[post("/inventory/adjust")]
pub async fn adjust(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AdjustStockForm>,
) -> ApiResult {
    ok(inventory_service::adjust_stock(
        repo.get_ref(),
        &user,
        form.into_inner(),
    )?)
}

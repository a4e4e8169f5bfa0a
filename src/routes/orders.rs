use actix_web::{get, patch, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::orders::{OrdersQuery, StatusChangeForm};
use crate::notifications::OrderNotifier;
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, attachment, ok, paginated};
use crate::services::orders as order_service;

#[get("/orders")]
pub async fn show_orders(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<OrdersQuery>,
) -> ApiResult {
    paginated(order_service::list_orders(
        repo.get_ref(),
        &user,
        params.into_inner(),
    )?)
}

#[get("/orders/export")]
pub async fn export_orders(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<OrdersQuery>,
) -> ApiResult {
    let csv = order_service::export_orders(repo.get_ref(), &user, params.into_inner())?;
    attachment("text/csv; charset=utf-8", "orders.csv", csv)
}

#[get("/orders/{order_id}")]
pub async fn show_order(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(order_service::get_order(
        repo.get_ref(),
        &user,
        path.into_inner(),
    )?)
}

#[get("/orders/{order_id}/invoice")]
pub async fn show_invoice(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let (order, pdf) = order_service::order_invoice(repo.get_ref(), &user, path.into_inner())?;
    let filename = format!("invoice-{}.pdf", order.order_number.trim_start_matches('#'));
    attachment("application/pdf", &filename, pdf)
}

#[get("/orders/{order_id}/history")]
pub async fn show_history(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(order_service::order_history(
        repo.get_ref(),
        &user,
        path.into_inner(),
    )?)
}

#[patch("/orders/{order_id}/status")]
pub async fn change_status(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    notifier: web::Data<dyn OrderNotifier>,
    form: web::Json<StatusChangeForm>,
) -> ApiResult {
    ok(order_service::update_order_status(
        repo.get_ref(),
        notifier.get_ref(),
        &user,
        path.into_inner(),
        form.into_inner(),
    )?)
}

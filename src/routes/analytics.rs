use actix_web::{get, web};
use chrono::Utc;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::analytics::AnalyticsQuery;
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, ok};
use crate::services::analytics::load_dashboard;

#[get("/analytics/dashboard")]
pub async fn dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<AnalyticsQuery>,
) -> ApiResult {
    let today = Utc::now().date_naive();
    ok(load_dashboard(
        repo.get_ref(),
        &user,
        params.into_inner(),
        today,
    )?)
}

use actix_web::{get, post, put, web};
use serde_json::json;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::stores::{CreateStoreForm, StoreSettingsForm, StoresQuery};
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, created, ok, paginated};
use crate::services::stores as store_service;

#[get("/stores")]
pub async fn show_stores(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<StoresQuery>,
) -> ApiResult {
    paginated(store_service::list_stores(
        repo.get_ref(),
        &user,
        params.pagination(),
    )?)
}

#[post("/stores")]
pub async fn add_store(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<CreateStoreForm>,
) -> ApiResult {
    let (store, admin) = store_service::create_store(repo.get_ref(), &user, form.into_inner())?;
    created(json!({ "store": store, "admin": admin }))
}

#[get("/store/settings")]
pub async fn show_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(store_service::load_settings(repo.get_ref(), &user)?)
}

#[put("/store/settings")]
pub async fn edit_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<StoreSettingsForm>,
) -> ApiResult {
    ok(store_service::update_settings(
        repo.get_ref(),
        &user,
        form.into_inner(),
    )?)
}

use actix_web::{delete, get, post, put, web};
use serde_json::json;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::categories::{AddCategoryForm, CategoriesQuery, EditCategoryForm};
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, created, ok};
use crate::services::categories::{
    create_category, load_category_tree, modify_category, remove_category,
};

#[get("/categories")]
pub async fn show_categories(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<CategoriesQuery>,
) -> ApiResult {
    ok(load_category_tree(repo.get_ref(), &user, params.into_inner())?)
}

#[post("/categories")]
pub async fn add_category(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddCategoryForm>,
) -> ApiResult {
    created(create_category(repo.get_ref(), &user, form.into_inner())?)
}

#[put("/categories/{category_id}")]
pub async fn edit_category(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditCategoryForm>,
) -> ApiResult {
    ok(modify_category(
        repo.get_ref(),
        &user,
        path.into_inner(),
        form.into_inner(),
    )?)
}

#[delete("/categories/{category_id}")]
pub async fn delete_category(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let category_id = path.into_inner();
    remove_category(repo.get_ref(), &user, category_id)?;
    ok(json!({ "id": category_id, "deleted": true }))
}

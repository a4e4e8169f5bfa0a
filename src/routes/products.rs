use actix_multipart::form::MultipartForm;
use actix_web::{delete, get, post, put, web};
use serde_json::json;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::products::{ProductForm, ProductsQuery, UploadProductsForm, VariantForm};
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, attachment, created, ok, paginated};
use crate::services::products as product_service;

#[get("/products")]
pub async fn show_products(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<ProductsQuery>,
) -> ApiResult {
    paginated(product_service::list_products(
        repo.get_ref(),
        &user,
        params.into_inner(),
    )?)
}

#[post("/products")]
pub async fn add_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<ProductForm>,
) -> ApiResult {
    created(product_service::create_product(
        repo.get_ref(),
        &user,
        form.into_inner(),
    )?)
}

#[post("/products/import")]
pub async fn import_products(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(mut form): MultipartForm<UploadProductsForm>,
) -> ApiResult {
    let imported = product_service::import_products(repo.get_ref(), &user, &mut form)?;
    created(json!({ "imported": imported }))
}

#[get("/products/export")]
pub async fn export_products(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let csv = product_service::export_products(repo.get_ref(), &user)?;
    attachment("text/csv; charset=utf-8", "products.csv", csv)
}

#[get("/products/{product_id}")]
pub async fn show_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    ok(product_service::get_product(
        repo.get_ref(),
        &user,
        path.into_inner(),
    )?)
}

#[put("/products/{product_id}")]
pub async fn edit_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<ProductForm>,
) -> ApiResult {
    ok(product_service::update_product(
        repo.get_ref(),
        &user,
        path.into_inner(),
        form.into_inner(),
    )?)
}

#[delete("/products/{product_id}")]
pub async fn delete_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let product_id = path.into_inner();
    product_service::archive_product(repo.get_ref(), &user, product_id)?;
    ok(json!({ "id": product_id, "archived": true }))
}

#[post("/products/{product_id}/variants")]
pub async fn add_variant(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<VariantForm>,
) -> ApiResult {
    created(product_service::add_variant(
        repo.get_ref(),
        &user,
        path.into_inner(),
        form.into_inner(),
    )?)
}

#[delete("/products/{product_id}/variants/{variant_id}")]
pub async fn delete_variant(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> ApiResult {
    let (product_id, variant_id) = path.into_inner();
    product_service::remove_variant(repo.get_ref(), &user, product_id, variant_id)?;
    ok(json!({ "id": variant_id, "deleted": true }))
}

use actix_web::{get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::users::CreateUserForm;
use crate::repository::DieselRepository;
use crate::routes::{ApiResult, created, ok};
use crate::services::users as user_service;

#[get("/users")]
pub async fn show_users(user: AuthenticatedUser, repo: web::Data<DieselRepository>) -> ApiResult {
    ok(user_service::list_users(repo.get_ref(), &user)?)
}

#[post("/users")]
pub async fn add_user(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<CreateUserForm>,
) -> ApiResult {
    created(user_service::create_user(
        repo.get_ref(),
        &user,
        form.into_inner(),
    )?)
}

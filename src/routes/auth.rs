use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::auth::{LoginForm, RegisterForm};
use crate::repository::DieselRepository;
use crate::routes::{ApiError, ApiResult, created, ok};
use crate::services::ServiceError;
use crate::services::auth as auth_service;

/// Attach `user` to the session cookie.
fn remember(req: &HttpRequest, user: &AuthenticatedUser) -> Result<(), ApiError> {
    let id = serde_json::to_string(user)
        .map_err(|err| ServiceError::Internal(err.to_string()))?;
    Identity::login(&req.extensions(), id)
        .map_err(|err| ServiceError::Internal(err.to_string()))?;
    Ok(())
}

#[post("/auth/login")]
pub async fn login(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    form: web::Json<LoginForm>,
) -> ApiResult {
    let user = auth_service::login(repo.get_ref(), form.into_inner())?;
    remember(&req, &user)?;
    log::info!("user {} logged in", user.id);
    ok(user)
}

#[post("/auth/logout")]
pub async fn logout(identity: Option<Identity>) -> ApiResult {
    if let Some(identity) = identity {
        identity.logout();
    }
    ok(serde_json::Value::Null)
}

#[post("/auth/register")]
pub async fn register(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    form: web::Json<RegisterForm>,
) -> ApiResult {
    let (user, customer) = auth_service::register_customer(repo.get_ref(), form.into_inner())?;
    remember(&req, &user)?;
    created(serde_json::json!({ "user": user, "customer": customer }))
}

#[get("/auth/me")]
pub async fn me(user: AuthenticatedUser) -> ApiResult {
    ok(user)
}

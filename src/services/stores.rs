use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::store::Store;
use crate::domain::user::{NewUser, User};
use crate::forms::stores::{CreateStoreForm, StoreSettingsForm};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{StoreReader, StoreWriter};
use crate::services::auth::hash_password;
use crate::services::{ServiceError, ServiceResult, ensure_role, owning_store, scope_for};

/// Lists every store on the platform.
pub fn list_stores<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pagination: Pagination,
) -> ServiceResult<Paginated<Store>>
where
    R: StoreReader + ?Sized,
{
    ensure_role(user, &[Role::SuperAdmin])?;

    let (total, stores) = repo.list_stores(pagination)?;
    Ok(Paginated::new(stores, pagination, total))
}

/// Creates a store on a free trial together with its first administrator.
pub fn create_store<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateStoreForm,
) -> ServiceResult<(Store, User)>
where
    R: StoreWriter + ?Sized,
{
    ensure_role(user, &[Role::SuperAdmin])?;

    let signup = form.into_signup()?;
    let password_hash = hash_password(&signup.admin_password)?;
    let admin = NewUser::new(
        None,
        signup.admin_name,
        signup.admin_email,
        password_hash,
        Role::StoreAdmin,
    );

    let (store, admin) = repo
        .create_store_with_admin(&signup.store, &admin)
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::Conflict(_) => ServiceError::Conflict(
                "a store with this slug or an account with this email already exists".to_string(),
            ),
            other => other,
        })?;

    log::info!("created store {} ({}) with admin {}", store.id, store.slug, admin.id);

    Ok((store, admin))
}

/// Loads the settings of the administrator's own store.
pub fn load_settings<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Store>
where
    R: StoreReader + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;
    let store_id = owning_store(&scope)?;

    repo.get_store(&scope, store_id)?
        .ok_or(ServiceError::NotFound)
}

/// Replaces the editable settings of the administrator's own store.
pub fn update_settings<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: StoreSettingsForm,
) -> ServiceResult<Store>
where
    R: StoreWriter + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;
    let store_id = owning_store(&scope)?;

    let updates = form.into_update()?;
    Ok(repo.update_store_settings(&scope, store_id, &updates)?)
}

use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::user::{NewUser, User};
use crate::forms::users::CreateUserForm;
use crate::repository::{UserReader, UserWriter};
use crate::services::auth::hash_password;
use crate::services::{ServiceError, ServiceResult, ensure_role, owning_store, scope_for};

/// Lists the accounts of the administrator's store.
pub fn list_users<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<User>>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;

    Ok(repo.list_users(&scope)?)
}

/// Creates a staff or admin account in the administrator's store.
pub fn create_user<R>(repo: &R, user: &AuthenticatedUser, form: CreateUserForm) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;
    let store_id = owning_store(&scope)?;

    let account = form.into_staff_account()?;
    let password_hash = hash_password(&account.password)?;
    let new_user = NewUser::new(
        Some(store_id),
        account.name,
        account.email,
        password_hash,
        account.role,
    );

    repo.create_user(&new_user).map_err(|err| match ServiceError::from(err) {
        ServiceError::Conflict(_) => {
            ServiceError::Conflict("an account with this email already exists".to_string())
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepo;
    use crate::services::test_support::{fixed_datetime, store_admin, user_with_role};

    #[test]
    fn staff_accounts_belong_to_admin_store() {
        let mut repo = MockRepo::new();
        repo.user_writer
            .expect_create_user()
            .times(1)
            .withf(|new_user| new_user.store_id == Some(9) && new_user.role == Role::Staff)
            .returning(|new_user| {
                Ok(User {
                    id: 40,
                    store_id: new_user.store_id,
                    name: new_user.name.clone(),
                    email: new_user.email.clone(),
                    role: new_user.role,
                    is_active: true,
                    created_at: fixed_datetime(),
                })
            });

        let form = CreateUserForm {
            name: "Packer".to_string(),
            email: "packer@example.com".to_string(),
            password: "long enough".to_string(),
            role: Role::Staff,
        };

        let created = create_user(&repo, &store_admin(), form).expect("created");
        assert_eq!(created.id, 40);
    }

    #[test]
    fn customers_cannot_list_users() {
        let repo = MockRepo::new();
        let result = list_users(&repo, &user_with_role(Role::Customer, Some(9)));

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }
}

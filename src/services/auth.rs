use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use validator::Validate;

use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::user::NewUser;
use crate::forms::auth::{LoginForm, RegisterForm};
use crate::repository::{StoreReader, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::Internal(format!("failed to hash password: {err}")))
}

/// Verify a password against a stored PHC string.
fn verify_password(password: &str, hash: &str) -> ServiceResult<()> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| ServiceError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ServiceError::InvalidCredentials)
}

/// Check the submitted credentials and return the identity to store in the
/// session. Unknown emails, wrong passwords and deactivated accounts all fail
/// the same way.
pub fn login<R>(repo: &R, form: LoginForm) -> ServiceResult<AuthenticatedUser>
where
    R: UserReader + ?Sized,
{
    form.validate()
        .map_err(|_| ServiceError::InvalidCredentials)?;

    let credentials = repo
        .get_credentials_by_email(&form.email.trim().to_lowercase())?
        .ok_or(ServiceError::InvalidCredentials)?;

    if !credentials.user.is_active {
        return Err(ServiceError::InvalidCredentials);
    }

    verify_password(&form.password, &credentials.password_hash)?;

    Ok(AuthenticatedUser::from(&credentials.user))
}

/// Register a customer account with the store named by the form's slug.
pub fn register_customer<R>(
    repo: &R,
    form: RegisterForm,
) -> ServiceResult<(AuthenticatedUser, Customer)>
where
    R: StoreReader + UserWriter + ?Sized,
{
    let registration = form.into_registration().map_err(ServiceError::from)?;

    let store = repo
        .get_store_by_slug(&registration.store_slug)?
        .ok_or(ServiceError::NotFound)?;

    let password_hash = hash_password(&registration.password)?;
    let new_user = NewUser::new(
        Some(store.id),
        registration.name.clone(),
        registration.email.clone(),
        password_hash,
        Role::Customer,
    );

    let mut new_customer = NewCustomer::new(store.id, registration.name, registration.email);
    if let Some(phone) = registration.phone {
        new_customer = new_customer.with_phone(phone);
    }

    let (user, customer) = repo
        .register_customer(&new_user, &new_customer)
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict("an account with this email already exists".to_string())
            }
            other => other,
        })?;

    log::info!("registered customer {} in store {}", customer.id, store.id);

    Ok((AuthenticatedUser::from(&user), customer))
}

#[cfg(test)]
mod tests {
    use super::*;
        use crate::domain::user::{User, UserCredentials};
    use crate::repository::RepositoryError;
    use crate::repository::mock::MockRepo;
    use crate::services::test_support::{fixed_datetime, sample_store};

    fn user(is_active: bool) -> User {
        User {
            id: 3,
            store_id: Some(9),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role: Role::StoreAdmin,
            is_active,
            created_at: fixed_datetime(),
        }
    }

    fn login_form(password: &str) -> LoginForm {
        LoginForm {
            email: "Jane@Example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn login_accepts_correct_password() {
        let hash = hash_password("correct horse").expect("hash");
        let mut repo = MockRepo::new();
        repo.user_reader
            .expect_get_credentials_by_email()
            .withf(|email| email == "jane@example.com")
            .returning(move |_| {
                Ok(Some(UserCredentials {
                    user: user(true),
                    password_hash: hash.clone(),
                }))
            });

        let identity = login(&repo, login_form("correct horse")).expect("logged in");

        assert_eq!(identity.id, 3);
        assert_eq!(identity.role, Role::StoreAdmin);
        assert_eq!(identity.store_id, Some(9));
    }

    #[test]
    fn login_rejects_wrong_password() {
        let hash = hash_password("correct horse").expect("hash");
        let mut repo = MockRepo::new();
        repo.user_reader
            .expect_get_credentials_by_email()
            .returning(move |_| {
                Ok(Some(UserCredentials {
                    user: user(true),
                    password_hash: hash.clone(),
                }))
            });

        let result = login(&repo, login_form("battery staple"));

        assert!(matches!(result, Err(ServiceError::InvalidCredentials)));
    }

    #[test]
    fn login_rejects_deactivated_account() {
        let mut repo = MockRepo::new();
        repo.user_reader
            .expect_get_credentials_by_email()
            .returning(|_| {
                Ok(Some(UserCredentials {
                    user: user(false),
                    password_hash: String::new(),
                }))
            });

        let result = login(&repo, login_form("anything"));

        assert!(matches!(result, Err(ServiceError::InvalidCredentials)));
    }

    #[test]
    fn login_rejects_unknown_email() {
        let mut repo = MockRepo::new();
        repo.user_reader
            .expect_get_credentials_by_email()
            .returning(|_| Ok(None));

        let result = login(&repo, login_form("anything"));

        assert!(matches!(result, Err(ServiceError::InvalidCredentials)));
    }

    fn register_form() -> RegisterForm {
        RegisterForm {
            store_slug: "corner-shop".to_string(),
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "correct horse".to_string(),
            phone: None,
        }
    }

    #[test]
    fn register_creates_customer_in_store() {
        let mut repo = MockRepo::new();
        repo.store_reader
            .expect_get_store_by_slug()
            .withf(|slug| slug == "corner-shop")
            .returning(|_| Ok(Some(sample_store(9))));
        repo.user_writer
            .expect_register_customer()
            .times(1)
            .withf(|new_user, new_customer| {
                new_user.role == Role::Customer
                    && new_user.store_id == Some(9)
                    && new_user.password_hash.starts_with("$argon2")
                    && new_customer.store_id == 9
            })
            .returning(|new_user, new_customer| {
                let user = User {
                    id: 20,
                    store_id: new_user.store_id,
                    name: new_user.name.clone(),
                    email: new_user.email.clone(),
                    role: new_user.role,
                    is_active: true,
                    created_at: fixed_datetime(),
                };
                let customer = Customer {
                    id: 30,
                    store_id: new_customer.store_id,
                    user_id: Some(20),
                    name: new_customer.name.clone(),
                    email: new_customer.email.clone(),
                    phone: None,
                    is_anonymized: false,
                    created_at: fixed_datetime(),
                    updated_at: fixed_datetime(),
                };
                Ok((user, customer))
            });

        let (identity, customer) = register_customer(&repo, register_form()).expect("registered");

        assert_eq!(identity.role, Role::Customer);
        assert_eq!(customer.user_id, Some(identity.id));
    }

    #[test]
    fn register_with_unknown_store_is_not_found() {
        let mut repo = MockRepo::new();
        repo.store_reader
            .expect_get_store_by_slug()
            .returning(|_| Ok(None));

        let result = register_customer(&repo, register_form());

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn duplicate_registration_is_a_conflict() {
        let mut repo = MockRepo::new();
        repo.store_reader
            .expect_get_store_by_slug()
            .returning(|_| Ok(Some(sample_store(9))));
        repo.user_writer
            .expect_register_customer()
            .returning(|_, _| Err(RepositoryError::Conflict("users.email".to_string())));

        let result = register_customer(&repo, register_form());

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }
}

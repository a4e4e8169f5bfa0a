use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::discount::DiscountCode;
use crate::forms::discounts::DiscountForm;
use crate::repository::{DiscountReader, DiscountWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role, owning_store, scope_for};

pub fn list_discounts<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<DiscountCode>>
where
    R: DiscountReader + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;

    Ok(repo.list_discount_codes(&scope)?)
}

/// Creates a discount code; codes are unique per store.
pub fn create_discount<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: DiscountForm,
) -> ServiceResult<DiscountCode>
where
    R: DiscountWriter + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;
    let store_id = owning_store(&scope)?;

    let new_code = form.into_new_discount(store_id)?;
    repo.create_discount_code(&new_code)
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict(format!("discount code {} already exists", new_code.code))
            }
            other => other,
        })
}

/// Stops a code from being redeemed; past orders keep their snapshot.
pub fn deactivate_discount<R>(
    repo: &R,
    user: &AuthenticatedUser,
    discount_id: i32,
) -> ServiceResult<DiscountCode>
where
    R: DiscountWriter + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;

    Ok(repo.deactivate_discount_code(&scope, discount_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discount::DiscountKind;
    use crate::repository::RepositoryError;
    use crate::repository::mock::MockRepo;
    use crate::services::test_support::{store_admin, user_with_role};

    fn form() -> DiscountForm {
        DiscountForm {
            code: "spring".to_string(),
            kind: DiscountKind::Percentage,
            value: 10,
            min_subtotal_cents: None,
            max_uses: None,
        }
    }

    #[test]
    fn duplicate_code_is_a_conflict() {
        let mut repo = MockRepo::new();
        repo.discount_writer
            .expect_create_discount_code()
            .withf(|new_code| new_code.code == "SPRING" && new_code.store_id == 9)
            .returning(|_| Err(RepositoryError::Conflict("unique".to_string())));

        let result = create_discount(&repo, &store_admin(), form());

        assert!(matches!(result, Err(ServiceError::Conflict(message)) if message.contains("SPRING")));
    }

    #[test]
    fn staff_cannot_manage_discounts() {
        let repo = MockRepo::new();
        let staff = user_with_role(Role::Staff, Some(9));

        assert!(matches!(
            create_discount(&repo, &staff, form()),
            Err(ServiceError::Forbidden)
        ));
    }
}

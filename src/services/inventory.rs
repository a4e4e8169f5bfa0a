use crate::domain::auth::{AuthenticatedUser, STAFF_ROLES};
use crate::domain::inventory::{InventoryAdjustment, LowStockItem};
use crate::domain::product::Product;
use crate::forms::inventory::{AdjustStockForm, AdjustmentsQuery};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{InventoryReader, InventoryWriter};
use crate::services::{ServiceResult, ensure_role, scope_for};

/// Tracked products at or below their low-stock threshold.
pub fn list_low_stock<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<LowStockItem>>
where
    R: InventoryReader + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    Ok(repo.list_low_stock(&scope)?)
}

/// Stock ledger, newest first, optionally for a single product.
pub fn list_adjustments<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: AdjustmentsQuery,
) -> ServiceResult<Paginated<InventoryAdjustment>>
where
    R: InventoryReader + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    let pagination = Pagination::new(params.page, params.per_page);
    let (total, adjustments) = repo.list_adjustments(&scope, params.product_id, pagination)?;

    Ok(Paginated::new(adjustments, pagination, total))
}

/// Applies a manual stock change. Stock never drops below zero.
pub fn adjust_stock<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AdjustStockForm,
) -> ServiceResult<Product>
where
    R: InventoryWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    let adjustment = form.into_adjustment()?;
    let product = repo.adjust_stock(&scope, &adjustment)?;

    log::info!(
        "user {} adjusted stock of product {} by {} ({})",
        user.id,
        product.id,
        adjustment.delta,
        adjustment.reason
    );

    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::inventory::AdjustmentReason;
    use crate::repository::RepositoryError;
    use crate::repository::mock::MockRepo;
    use crate::services::ServiceError;
    use crate::services::test_support::{sample_product, store_admin, user_with_role};

    fn form(delta: i32) -> AdjustStockForm {
        AdjustStockForm {
            product_id: 1,
            variant_id: None,
            delta,
            reason: AdjustmentReason::Correction,
        }
    }

    #[test]
    fn adjustment_below_zero_is_a_stock_error() {
        let mut repo = MockRepo::new();
        repo.inventory_writer
            .expect_adjust_stock()
            .returning(|_, adjustment| {
                Err(RepositoryError::InsufficientStock {
                    product_id: adjustment.product_id,
                })
            });

        let result = adjust_stock(&repo, &store_admin(), form(-50));

        assert!(matches!(
            result,
            Err(ServiceError::InsufficientStock { product_id: 1 })
        ));
    }

    #[test]
    fn adjustment_is_scoped_to_store() {
        let mut repo = MockRepo::new();
        repo.inventory_writer
            .expect_adjust_stock()
            .times(1)
            .withf(|scope, adjustment| scope.store_id() == Some(9) && adjustment.delta == 4)
            .returning(|_, _| Ok(sample_product(1, 9, 500)));

        assert!(adjust_stock(&repo, &store_admin(), form(4)).is_ok());
    }

    #[test]
    fn customers_cannot_see_inventory() {
        let repo = MockRepo::new();
        let customer = user_with_role(Role::Customer, Some(9));

        assert!(matches!(
            list_low_stock(&repo, &customer),
            Err(ServiceError::Forbidden)
        ));
    }
}

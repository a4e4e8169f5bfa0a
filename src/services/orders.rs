use crate::documents::csv::orders_csv;
use crate::documents::invoice::render_invoice;
use crate::domain::auth::{AuthenticatedUser, Role, STAFF_ROLES, StoreScope};
use crate::domain::order::{Order, OrderStatusEvent, OrderStatusUpdate};
use crate::forms::orders::{OrdersQuery, StatusChangeForm};
use crate::notifications::{OrderNotifier, log_failure};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{CustomerReader, OrderReader, OrderWriter, StoreReader};
use crate::services::{ServiceError, ServiceResult, ensure_role, scope_for};

/// Customer record id of a CUSTOMER user, `None` for other roles.
fn own_customer_id<R>(
    repo: &R,
    scope: &StoreScope,
    user: &AuthenticatedUser,
) -> ServiceResult<Option<i32>>
where
    R: CustomerReader + ?Sized,
{
    if user.role != Role::Customer {
        return Ok(None);
    }

    repo.get_customer_by_user_id(scope, user.id)?
        .map(|customer| Some(customer.id))
        .ok_or(ServiceError::NotFound)
}

/// Lists orders. Staff see the whole store, customers only their own orders.
pub fn list_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: OrdersQuery,
) -> ServiceResult<Paginated<Order>>
where
    R: OrderReader + CustomerReader + ?Sized,
{
    let scope = scope_for(user)?;

    let mut query = params.into_list_query()?;
    let pagination = query
        .pagination
        .unwrap_or_else(|| Pagination::new(None, None));

    if user.role == Role::Customer {
        match repo.get_customer_by_user_id(&scope, user.id)? {
            Some(customer) => query.customer_id = Some(customer.id),
            None => return Ok(Paginated::new(Vec::new(), pagination, 0)),
        }
    }

    let (total, orders) = repo.list_orders(&scope, &query)?;
    Ok(Paginated::new(orders, pagination, total))
}

/// Loads an order; another customer's order is reported as missing.
pub fn get_order<R>(repo: &R, user: &AuthenticatedUser, order_id: i32) -> ServiceResult<Order>
where
    R: OrderReader + CustomerReader + ?Sized,
{
    let scope = scope_for(user)?;

    let order = repo
        .get_order_by_id(&scope, order_id)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(customer_id) = own_customer_id(repo, &scope, user)? {
        if order.customer_id != Some(customer_id) {
            return Err(ServiceError::NotFound);
        }
    }

    Ok(order)
}

/// Status changes recorded for an order, oldest first.
pub fn order_history<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
) -> ServiceResult<Vec<OrderStatusEvent>>
where
    R: OrderReader + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    Ok(repo.list_order_events(&scope, order_id)?)
}

/// Moves an order to a new status following the transition table.
pub fn update_order_status<R>(
    repo: &R,
    notifier: &dyn OrderNotifier,
    user: &AuthenticatedUser,
    order_id: i32,
    form: StatusChangeForm,
) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    let request = form.into_request()?;
    let order = repo
        .get_order_by_id(&scope, order_id)?
        .ok_or(ServiceError::NotFound)?;

    let update = OrderStatusUpdate::plan(&order, &request, Some(user.id))?;
    let updated = repo.update_order_status(&scope, order_id, &update)?;

    log::info!(
        "order {} moved from {} to {} by user {}",
        updated.order_number,
        update.from,
        update.to,
        user.id
    );
    log_failure("status change", notifier.status_changed(&updated, update.from));

    Ok(updated)
}

/// Orders matching the filters as CSV, without pagination.
pub fn export_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: OrdersQuery,
) -> ServiceResult<Vec<u8>>
where
    R: OrderReader + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    let mut query = params.into_list_query()?;
    query.pagination = None;

    let (_, orders) = repo.list_orders(&scope, &query)?;
    Ok(orders_csv(&orders)?)
}

/// PDF invoice for an order visible to the user.
pub fn order_invoice<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
) -> ServiceResult<(Order, Vec<u8>)>
where
    R: OrderReader + CustomerReader + StoreReader + ?Sized,
{
    let order = get_order(repo, user, order_id)?;
    let scope = scope_for(user)?;

    let store = repo
        .get_store(&scope, order.store_id)?
        .ok_or(ServiceError::NotFound)?;

    let pdf = render_invoice(&store, &order);
    Ok((order, pdf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::notifications::NotifyError;
    use crate::notifications::mock::MockNotifier;
    use crate::repository::RepositoryError;
    use crate::repository::mock::MockRepo;
    use crate::services::test_support::{
        sample_customer, sample_order, sample_store, store_admin, user_with_role,
    };

    fn status_form(status: OrderStatus) -> StatusChangeForm {
        StatusChangeForm {
            status,
            tracking_number: None,
            note: None,
            confirm: false,
        }
    }

    fn repo_with_order(status: OrderStatus) -> MockRepo {
        let mut repo = MockRepo::new();
        repo.order_reader
            .expect_get_order_by_id()
            .returning(move |_, id| Ok(Some(sample_order(id, 9, status))));
        repo
    }

    #[test]
    fn valid_transition_is_written_and_notified() {
        let mut repo = repo_with_order(OrderStatus::Pending);
        repo.order_writer
            .expect_update_order_status()
            .times(1)
            .withf(|scope, order_id, update| {
                scope.store_id() == Some(9)
                    && *order_id == 1
                    && update.from == OrderStatus::Pending
                    && update.to == OrderStatus::Paid
                    && update.changed_by == Some(11)
            })
            .returning(|_, id, _| Ok(sample_order(id, 9, OrderStatus::Paid)));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_status_changed()
            .times(1)
            .withf(|order, from| order.status == OrderStatus::Paid && *from == OrderStatus::Pending)
            .returning(|_, _| Ok(()));

        let updated = update_order_status(
            &repo,
            &notifier,
            &store_admin(),
            1,
            status_form(OrderStatus::Paid),
        )
        .expect("updated");

        assert_eq!(updated.status, OrderStatus::Paid);
    }

    #[test]
    fn transition_outside_table_is_rejected() {
        let mut repo = repo_with_order(OrderStatus::Pending);
        repo.order_writer.expect_update_order_status().never();
        let notifier = MockNotifier::new();

        let result = update_order_status(
            &repo,
            &notifier,
            &store_admin(),
            1,
            status_form(OrderStatus::Delivered),
        );

        assert!(matches!(result, Err(ServiceError::InvalidTransition(_))));
    }

    #[test]
    fn shipping_without_tracking_number_is_rejected() {
        let repo = repo_with_order(OrderStatus::Processing);
        let notifier = MockNotifier::new();

        let result = update_order_status(
            &repo,
            &notifier,
            &store_admin(),
            1,
            status_form(OrderStatus::Shipped),
        );

        assert!(matches!(result, Err(ServiceError::TrackingNumberRequired)));
    }

    #[test]
    fn cancel_needs_confirmation() {
        let repo = repo_with_order(OrderStatus::Paid);
        let notifier = MockNotifier::new();

        let result = update_order_status(
            &repo,
            &notifier,
            &store_admin(),
            1,
            status_form(OrderStatus::Canceled),
        );

        assert!(matches!(result, Err(ServiceError::ConfirmationRequired(_))));
    }

    #[test]
    fn notifier_failure_does_not_undo_change() {
        let mut repo = repo_with_order(OrderStatus::Paid);
        repo.order_writer
            .expect_update_order_status()
            .returning(|_, id, _| Ok(sample_order(id, 9, OrderStatus::Processing)));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_status_changed()
            .returning(|_, _| Err(NotifyError::Delivery("smtp down".to_string())));

        let result = update_order_status(
            &repo,
            &notifier,
            &store_admin(),
            1,
            status_form(OrderStatus::Processing),
        );

        assert!(result.is_ok());
    }

    #[test]
    fn concurrent_change_surfaces_as_conflict() {
        let mut repo = repo_with_order(OrderStatus::Pending);
        repo.order_writer
            .expect_update_order_status()
            .returning(|_, _, _| Err(RepositoryError::Conflict("status changed".to_string())));
        let notifier = MockNotifier::new();

        let result = update_order_status(
            &repo,
            &notifier,
            &store_admin(),
            1,
            status_form(OrderStatus::Paid),
        );

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn other_tenants_order_is_not_found() {
        let mut repo = MockRepo::new();
        repo.order_reader
            .expect_get_order_by_id()
            .withf(|scope, _| scope.store_id() == Some(9))
            .returning(|_, _| Ok(None));

        assert!(matches!(
            get_order(&repo, &store_admin(), 77),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn customers_only_open_their_own_orders() {
        let mut repo = repo_with_order(OrderStatus::Paid);
        repo.customer_reader
            .expect_get_customer_by_user_id()
            .returning(|_, _| Ok(Some(sample_customer(5, 9))));

        let customer = user_with_role(Role::Customer, Some(9));

        assert!(matches!(
            get_order(&repo, &customer, 1),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn customer_listing_is_restricted_to_own_orders() {
        let mut repo = MockRepo::new();
        repo.customer_reader
            .expect_get_customer_by_user_id()
            .returning(|_, _| Ok(Some(sample_customer(5, 9))));
        repo.order_reader
            .expect_list_orders()
            .withf(|_, query| query.customer_id == Some(5))
            .returning(|_, _| Ok((0, Vec::new())));

        let params = OrdersQuery {
            customer_id: Some(6),
            ..OrdersQuery::default()
        };
        let customer = user_with_role(Role::Customer, Some(9));

        assert!(list_orders(&repo, &customer, params).is_ok());
    }

    #[test]
    fn invoice_is_rendered_as_pdf() {
        let mut repo = repo_with_order(OrderStatus::Paid);
        repo.store_reader
            .expect_get_store()
            .returning(|_, id| Ok(Some(sample_store(id))));

        let (order, pdf) = order_invoice(&repo, &store_admin(), 1).expect("invoice");

        assert_eq!(order.order_number, "#1001");
        assert!(pdf.starts_with(b"%PDF-1.4"));
    }
}

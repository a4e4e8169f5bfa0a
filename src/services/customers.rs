use crate::domain::auth::{AuthenticatedUser, STAFF_ROLES};
use crate::domain::customer::Customer;
use crate::forms::customers::CustomersQuery;
use crate::pagination::{Paginated, Pagination};
use crate::repository::CustomerReader;
use crate::services::{ServiceError, ServiceResult, ensure_role, scope_for};

pub fn list_customers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: CustomersQuery,
) -> ServiceResult<Paginated<Customer>>
where
    R: CustomerReader + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    let query = params.into_list_query();
    let pagination = query.pagination.unwrap_or_else(|| Pagination::new(None, None));
    let (total, customers) = repo.list_customers(&scope, &query)?;

    Ok(Paginated::new(customers, pagination, total))
}

pub fn get_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
) -> ServiceResult<Customer>
where
    R: CustomerReader + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    repo.get_customer_by_id(&scope, customer_id)?
        .ok_or(ServiceError::NotFound)
}

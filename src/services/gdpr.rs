//! Personal data export and erasure for customers.

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::domain::auth::{AuthenticatedUser, Role, StoreScope};
use crate::domain::customer::Customer;
use crate::domain::order::{Order, OrderListQuery};
use crate::repository::{CustomerReader, CustomerWriter, OrderReader};
use crate::services::{ServiceError, ServiceResult, ensure_role, scope_for};

/// Everything stored about a customer, as one document.
#[derive(Debug, Clone, Serialize)]
pub struct PersonalDataExport {
    pub exported_at: NaiveDateTime,
    pub customer: Customer,
    pub orders: Vec<Order>,
}

fn build_export<R>(repo: &R, scope: &StoreScope, customer: Customer) -> ServiceResult<PersonalDataExport>
where
    R: OrderReader + ?Sized,
{
    let (_, orders) = repo.list_orders(scope, &OrderListQuery::new().customer_id(customer.id))?;

    Ok(PersonalDataExport {
        exported_at: Utc::now().naive_utc(),
        customer,
        orders,
    })
}

/// Export a customer of the admin's store.
pub fn export_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
) -> ServiceResult<PersonalDataExport>
where
    R: CustomerReader + OrderReader + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;

    let customer = repo
        .get_customer_by_id(&scope, customer_id)?
        .ok_or(ServiceError::NotFound)?;

    log::info!("user {} exported personal data of customer {customer_id}", user.id);
    build_export(repo, &scope, customer)
}

/// Export the data of the logged-in customer.
pub fn export_own_data<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<PersonalDataExport>
where
    R: CustomerReader + OrderReader + ?Sized,
{
    ensure_role(user, &[Role::Customer])?;
    let scope = scope_for(user)?;

    let customer = repo
        .get_customer_by_user_id(&scope, user.id)?
        .ok_or(ServiceError::NotFound)?;

    build_export(repo, &scope, customer)
}

/// Anonymise a customer and scrub personal data from their orders. The
/// orders themselves are kept.
pub fn erase_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
) -> ServiceResult<Customer>
where
    R: CustomerWriter + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;

    let customer = repo.anonymize_customer(&scope, customer_id)?;
    log::info!("user {} erased personal data of customer {customer_id}", user.id);

    Ok(customer)
}

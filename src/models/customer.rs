use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::customer::{Customer as DomainCustomer, NewCustomer as DomainNewCustomer};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::customers)]
pub struct Customer {
    pub id: i32,
    pub store_id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_anonymized: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
pub struct NewCustomer<'a> {
    pub store_id: i32,
    pub user_id: Option<i32>,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
}

/// Overwrites personal data on erasure.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(treat_none_as_null = true)]
pub struct AnonymizeCustomer<'a> {
    pub user_id: Option<i32>,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub is_anonymized: bool,
    pub updated_at: NaiveDateTime,
}

impl From<Customer> for DomainCustomer {
    fn from(value: Customer) -> Self {
        Self {
            id: value.id,
            store_id: value.store_id,
            user_id: value.user_id,
            name: value.name,
            email: value.email,
            phone: value.phone,
            is_anonymized: value.is_anonymized,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewCustomer> for NewCustomer<'a> {
    fn from(value: &'a DomainNewCustomer) -> Self {
        Self {
            store_id: value.store_id,
            user_id: value.user_id,
            name: value.name.as_str(),
            email: value.email.as_str(),
            phone: value.phone.as_deref(),
        }
    }
}

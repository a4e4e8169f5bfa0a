use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// Name written over a customer's personal data on erasure.
pub const ANONYMIZED_NAME: &str = "Deleted customer";

/// Domain representation of a customer that belongs to a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: i32,
    pub store_id: i32,
    /// Login account linked to the customer, if they registered.
    pub user_id: Option<i32>,
    pub name: String,
    /// Primary email address stored in lowercase for comparisons.
    pub email: String,
    pub phone: Option<String>,
    pub is_anonymized: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new customer for a store.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub store_id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl NewCustomer {
    /// Build a new customer payload while normalising the email to lowercase.
    #[must_use]
    pub fn new(store_id: i32, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            store_id,
            user_id: None,
            name: name.into(),
            email: email.into().to_lowercase(),
            phone: None,
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: i32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Query definition used to list customers.
#[derive(Debug, Clone, Default)]
pub struct CustomerListQuery {
    /// Substring matched against name and email.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CustomerListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

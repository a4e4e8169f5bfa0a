use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::auth::Role;

/// Account able to log in. The password hash never leaves the repository layer
/// except through [`UserCredentials`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub store_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// A user together with the stored password hash, used only for login.
#[derive(Clone, Debug)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub store_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    #[must_use]
    pub fn new(
        store_id: Option<i32>,
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            store_id,
            name: name.into(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            role,
        }
    }
}

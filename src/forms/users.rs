use serde::Deserialize;
use validator::Validate;

use crate::domain::auth::Role;
use crate::forms::auth::PASSWORD_MIN_LEN;
use crate::forms::{FormError, FormResult, NAME_MAX_LEN, required_inline};

/// Staff account created by a store admin.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = PASSWORD_MIN_LEN, max = 256))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Staff
}

/// Sanitised staff account data; the password is still in clear text.
#[derive(Debug)]
pub struct StaffAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl CreateUserForm {
    pub fn into_staff_account(self) -> FormResult<StaffAccount> {
        self.validate()?;

        if !matches!(self.role, Role::StoreAdmin | Role::Staff) {
            return Err(FormError::InvalidValue {
                field: "role",
                value: self.role.to_string(),
            });
        }

        Ok(StaffAccount {
            name: required_inline(&self.name, "name")?,
            email: self.email.trim().to_lowercase(),
            password: self.password,
            role: self.role,
        })
    }
}

use serde::Deserialize;
use validator::Validate;

use crate::forms::{FormResult, NAME_MAX_LEN, optional_inline, required_inline};

/// Minimum length for a new password.
pub const PASSWORD_MIN_LEN: u64 = 8;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Self-service registration of a customer account for a store.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    /// Slug of the store the shopper registers with.
    #[validate(length(min = 1, max = 64))]
    pub store_slug: String,
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = PASSWORD_MIN_LEN, max = 256))]
    pub password: String,
    #[validate(length(max = 32))]
    #[serde(default)]
    pub phone: Option<String>,
}

/// Sanitised registration data.
#[derive(Debug)]
pub struct Registration {
    pub store_slug: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

impl RegisterForm {
    pub fn into_registration(self) -> FormResult<Registration> {
        self.validate()?;

        Ok(Registration {
            store_slug: self.store_slug.trim().to_lowercase(),
            name: required_inline(&self.name, "name")?,
            email: self.email.trim().to_lowercase(),
            password: self.password,
            phone: optional_inline(self.phone.as_deref()),
        })
    }
}

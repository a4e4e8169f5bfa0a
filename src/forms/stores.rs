use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::domain::store::{NewStore, UpdateStoreSettings};
use crate::forms::auth::PASSWORD_MIN_LEN;
use crate::forms::{
    FormError, FormResult, MAX_AMOUNT_CENTS, NAME_MAX_LEN, required_inline, sanitize_currency,
};
use crate::pagination::Pagination;

/// Largest accepted tax rate (100%).
const MAX_TAX_RATE_BPS: i32 = 10_000;

/// Store creation by a platform operator, including the first store admin.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoreForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(min = 2, max = 64))]
    pub slug: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub admin_name: String,
    #[validate(email)]
    pub admin_email: String,
    #[validate(length(min = PASSWORD_MIN_LEN, max = 256))]
    pub admin_password: String,
}

/// Sanitised store creation data.
#[derive(Debug)]
pub struct StoreSignup {
    pub store: NewStore,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Slugs are lowercase ASCII words joined by single hyphens.
fn is_valid_slug(slug: &str) -> bool {
    slug.split('-').all(|word| {
        !word.is_empty()
            && word
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
    })
}

impl CreateStoreForm {
    pub fn into_signup(self) -> FormResult<StoreSignup> {
        self.validate()?;

        let slug = self.slug.trim().to_string();
        if !is_valid_slug(&slug) {
            return Err(FormError::InvalidValue {
                field: "slug",
                value: slug,
            });
        }

        let name = required_inline(&self.name, "name")?;
        let currency = sanitize_currency(&self.currency)?;

        Ok(StoreSignup {
            store: NewStore::new(name, slug, currency),
            admin_name: required_inline(&self.admin_name, "admin_name")?,
            admin_email: self.admin_email.trim().to_lowercase(),
            admin_password: self.admin_password,
        })
    }
}

/// Store-wide settings editable by a store admin.
#[derive(Debug, Deserialize, Validate)]
pub struct StoreSettingsForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    pub currency: String,
    #[validate(range(min = 0, max = MAX_TAX_RATE_BPS))]
    pub tax_rate_bps: i32,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    pub shipping_flat_cents: i64,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    #[serde(default)]
    pub free_shipping_threshold_cents: Option<i64>,
}

impl StoreSettingsForm {
    pub fn into_update(self) -> FormResult<UpdateStoreSettings> {
        self.validate()?;

        Ok(UpdateStoreSettings {
            name: required_inline(&self.name, "name")?,
            currency: sanitize_currency(&self.currency)?,
            tax_rate_bps: self.tax_rate_bps,
            shipping_flat_cents: self.shipping_flat_cents,
            free_shipping_threshold_cents: self.free_shipping_threshold_cents,
            updated_at: Utc::now().naive_utc(),
        })
    }
}

/// Query parameters accepted by the store listing.
#[derive(Debug, Default, Deserialize)]
pub struct StoresQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl StoresQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

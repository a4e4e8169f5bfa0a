use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::UnknownVariant;
use crate::domain::store::{
    NewStore as DomainNewStore, Store as DomainStore, UpdateStoreSettings, UpdateSubscription,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::stores)]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub currency: String,
    pub tax_rate_bps: i32,
    pub shipping_flat_cents: i64,
    pub free_shipping_threshold_cents: Option<i64>,
    pub subscription_plan: String,
    pub subscription_status: String,
    pub trial_ends_at: Option<NaiveDateTime>,
    pub current_period_ends_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::stores)]
pub struct NewStore<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub currency: &'a str,
    pub tax_rate_bps: i32,
    pub shipping_flat_cents: i64,
    pub free_shipping_threshold_cents: Option<i64>,
    pub trial_ends_at: Option<NaiveDateTime>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::stores)]
#[diesel(treat_none_as_null = true)]
pub struct StoreSettingsChangeset<'a> {
    pub name: &'a str,
    pub currency: &'a str,
    pub tax_rate_bps: i32,
    pub shipping_flat_cents: i64,
    pub free_shipping_threshold_cents: Option<i64>,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::stores)]
#[diesel(treat_none_as_null = true)]
pub struct SubscriptionChangeset<'a> {
    pub subscription_plan: &'a str,
    pub subscription_status: &'a str,
    pub current_period_ends_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Store> for DomainStore {
    type Error = UnknownVariant;

    fn try_from(value: Store) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            name: value.name,
            slug: value.slug,
            currency: value.currency,
            tax_rate_bps: value.tax_rate_bps,
            shipping_flat_cents: value.shipping_flat_cents,
            free_shipping_threshold_cents: value.free_shipping_threshold_cents,
            subscription_plan: value.subscription_plan.parse()?,
            subscription_status: value.subscription_status.parse()?,
            trial_ends_at: value.trial_ends_at,
            current_period_ends_at: value.current_period_ends_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewStore> for NewStore<'a> {
    fn from(value: &'a DomainNewStore) -> Self {
        Self {
            name: value.name.as_str(),
            slug: value.slug.as_str(),
            currency: value.currency.as_str(),
            tax_rate_bps: value.tax_rate_bps,
            shipping_flat_cents: value.shipping_flat_cents,
            free_shipping_threshold_cents: value.free_shipping_threshold_cents,
            trial_ends_at: Some(value.trial_ends_at),
        }
    }
}

impl<'a> From<&'a UpdateStoreSettings> for StoreSettingsChangeset<'a> {
    fn from(value: &'a UpdateStoreSettings) -> Self {
        Self {
            name: value.name.as_str(),
            currency: value.currency.as_str(),
            tax_rate_bps: value.tax_rate_bps,
            shipping_flat_cents: value.shipping_flat_cents,
            free_shipping_threshold_cents: value.free_shipping_threshold_cents,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a UpdateSubscription> for SubscriptionChangeset<'a> {
    fn from(value: &'a UpdateSubscription) -> Self {
        Self {
            subscription_plan: value.plan.as_str(),
            subscription_status: value.status.as_str(),
            current_period_ends_at: value.current_period_ends_at,
            updated_at: value.updated_at,
        }
    }
}

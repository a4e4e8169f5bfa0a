use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of a paid billing period.
pub const BILLING_PERIOD_DAYS: i64 = 30;

/// Length of the trial granted to new stores.
pub const TRIAL_DAYS: i64 = 14;

string_enum! {
    /// Subscription tier a store pays for.
    pub enum SubscriptionPlan {
        Free => "free",
        Basic => "basic",
        Pro => "pro",
        Enterprise => "enterprise",
    }
}

string_enum! {
    /// Billing state of a store subscription.
    pub enum SubscriptionStatus {
        Trialing => "trialing",
        Active => "active",
        PastDue => "past_due",
        Canceled => "canceled",
    }
}

/// Usage caps attached to a plan; `None` means unlimited.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PlanLimits {
    pub max_products: Option<usize>,
    pub max_orders_per_month: Option<usize>,
}

impl SubscriptionPlan {
    pub fn limits(&self) -> PlanLimits {
        match self {
            Self::Free => PlanLimits {
                max_products: Some(25),
                max_orders_per_month: Some(100),
            },
            Self::Basic => PlanLimits {
                max_products: Some(500),
                max_orders_per_month: Some(1_000),
            },
            Self::Pro => PlanLimits {
                max_products: Some(5_000),
                max_orders_per_month: None,
            },
            Self::Enterprise => PlanLimits {
                max_products: None,
                max_orders_per_month: None,
            },
        }
    }
}

/// A tenant of the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub slug: String,
    /// ISO 4217 code used for every price in the store.
    pub currency: String,
    /// Sales tax rate in basis points (825 = 8.25%).
    pub tax_rate_bps: i32,
    pub shipping_flat_cents: i64,
    pub free_shipping_threshold_cents: Option<i64>,
    pub subscription_plan: SubscriptionPlan,
    pub subscription_status: SubscriptionStatus,
    pub trial_ends_at: Option<NaiveDateTime>,
    pub current_period_ends_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Store {
    /// Whether the subscription currently lets the store accept new orders.
    pub fn subscription_is_usable(&self, now: NaiveDateTime) -> bool {
        match self.subscription_status {
            SubscriptionStatus::Active => true,
            SubscriptionStatus::Trialing => self.trial_ends_at.is_none_or(|ends| ends > now),
            SubscriptionStatus::PastDue => false,
            SubscriptionStatus::Canceled => self.current_period_ends_at.is_some_and(|ends| ends > now),
        }
    }
}

/// Payload required to create a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub slug: String,
    pub currency: String,
    pub tax_rate_bps: i32,
    pub shipping_flat_cents: i64,
    pub free_shipping_threshold_cents: Option<i64>,
    pub trial_ends_at: NaiveDateTime,
}

impl NewStore {
    /// Build a store on the free plan with a fresh trial.
    pub fn new(name: impl Into<String>, slug: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            currency: currency.into(),
            tax_rate_bps: 0,
            shipping_flat_cents: 0,
            free_shipping_threshold_cents: None,
            trial_ends_at: Utc::now().naive_utc() + Duration::days(TRIAL_DAYS),
        }
    }
}

/// Store-level settings editable by a store admin.
#[derive(Debug, Clone)]
pub struct UpdateStoreSettings {
    pub name: String,
    pub currency: String,
    pub tax_rate_bps: i32,
    pub shipping_flat_cents: i64,
    pub free_shipping_threshold_cents: Option<i64>,
    pub updated_at: NaiveDateTime,
}

/// Subscription fields written when a plan changes or is canceled.
#[derive(Debug, Clone)]
pub struct UpdateSubscription {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub current_period_ends_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl UpdateSubscription {
    /// Activate `plan` for a new billing period starting now.
    pub fn activate(plan: SubscriptionPlan) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            plan,
            status: SubscriptionStatus::Active,
            current_period_ends_at: Some(now + Duration::days(BILLING_PERIOD_DAYS)),
            updated_at: now,
        }
    }

    /// Cancel the subscription while keeping the paid-up period.
    pub fn cancel(store: &Store) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            plan: store.subscription_plan,
            status: SubscriptionStatus::Canceled,
            current_period_ends_at: store.current_period_ends_at.or(store.trial_ends_at),
            updated_at: now,
        }
    }
}

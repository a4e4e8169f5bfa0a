//! Subscription management and plan limit enforcement.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::domain::auth::{AuthenticatedUser, Role, StoreScope};
use crate::domain::store::{
    PlanLimits, Store, SubscriptionPlan, SubscriptionStatus, UpdateSubscription,
};
use crate::forms::billing::ChangePlanForm;
use crate::repository::{OrderReader, ProductReader, StoreReader, StoreWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role, owning_store, scope_for};

/// Current usage measured against the plan limits.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Usage {
    pub products: usize,
    pub orders_this_month: usize,
}

/// Subscription details returned to a store admin.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub store_id: i32,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub trial_ends_at: Option<NaiveDateTime>,
    pub current_period_ends_at: Option<NaiveDateTime>,
    /// Whether the store can currently take orders.
    pub is_usable: bool,
    pub limits: PlanLimits,
    pub usage: Usage,
}

/// First instant of the calendar month containing `now`.
pub fn month_start(now: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .map(|day| day.and_time(NaiveTime::MIN))
        .unwrap_or(now)
}

/// Reject adding `adding` products when the plan would be exceeded.
pub fn ensure_product_capacity(store: &Store, current: usize, adding: usize) -> ServiceResult<()> {
    match store.subscription_plan.limits().max_products {
        Some(max) if current.saturating_add(adding) > max => Err(ServiceError::PlanLimit(format!(
            "the {} plan allows at most {max} products",
            store.subscription_plan
        ))),
        _ => Ok(()),
    }
}

/// Reject a new order when the subscription is not usable or the monthly
/// order allowance is spent.
pub fn ensure_order_capacity(
    store: &Store,
    orders_this_month: usize,
    now: NaiveDateTime,
) -> ServiceResult<()> {
    if !store.subscription_is_usable(now) {
        return Err(ServiceError::PlanLimit(
            "the store subscription is not active".to_string(),
        ));
    }

    match store.subscription_plan.limits().max_orders_per_month {
        Some(max) if orders_this_month >= max => Err(ServiceError::PlanLimit(format!(
            "the {} plan allows at most {max} orders per month",
            store.subscription_plan
        ))),
        _ => Ok(()),
    }
}

fn own_store<R>(repo: &R, scope: &StoreScope) -> ServiceResult<Store>
where
    R: StoreReader + ?Sized,
{
    let store_id = owning_store(scope)?;
    repo.get_store(scope, store_id)?
        .ok_or(ServiceError::NotFound)
}

fn build_view<R>(
    repo: &R,
    scope: &StoreScope,
    store: Store,
    now: NaiveDateTime,
) -> ServiceResult<SubscriptionView>
where
    R: ProductReader + OrderReader + ?Sized,
{
    let usage = Usage {
        products: repo.count_products(scope)?,
        orders_this_month: repo.count_orders_since(scope, month_start(now))?,
    };

    Ok(SubscriptionView {
        store_id: store.id,
        plan: store.subscription_plan,
        status: store.subscription_status,
        trial_ends_at: store.trial_ends_at,
        current_period_ends_at: store.current_period_ends_at,
        is_usable: store.subscription_is_usable(now),
        limits: store.subscription_plan.limits(),
        usage,
    })
}

/// Loads the administrator's subscription together with current usage.
pub fn load_subscription<R>(
    repo: &R,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
) -> ServiceResult<SubscriptionView>
where
    R: StoreReader + ProductReader + OrderReader + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;
    let store = own_store(repo, &scope)?;

    build_view(repo, &scope, store, now)
}

/// Moves the store to another plan and starts a new billing period.
pub fn change_plan<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ChangePlanForm,
    now: NaiveDateTime,
) -> ServiceResult<SubscriptionView>
where
    R: StoreReader + StoreWriter + ProductReader + OrderReader + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;
    let store = own_store(repo, &scope)?;

    if let Some(max) = form.plan.limits().max_products {
        let products = repo.count_products(&scope)?;
        if products > max {
            return Err(ServiceError::Conflict(format!(
                "the store has {products} products but the {} plan allows {max}",
                form.plan
            )));
        }
    }

    let updated = repo.update_subscription(&scope, store.id, &UpdateSubscription::activate(form.plan))?;
    log::info!(
        "store {} changed plan from {} to {}",
        store.id,
        store.subscription_plan,
        updated.subscription_plan
    );

    build_view(repo, &scope, updated, now)
}

/// Cancels the subscription; the store keeps working until the paid period ends.
pub fn cancel_subscription<R>(
    repo: &R,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
) -> ServiceResult<SubscriptionView>
where
    R: StoreReader + StoreWriter + ProductReader + OrderReader + ?Sized,
{
    ensure_role(user, &[Role::StoreAdmin])?;
    let scope = scope_for(user)?;
    let store = own_store(repo, &scope)?;

    if store.subscription_status == SubscriptionStatus::Canceled {
        return Err(ServiceError::Conflict(
            "the subscription is already canceled".to_string(),
        ));
    }

    let updated = repo.update_subscription(&scope, store.id, &UpdateSubscription::cancel(&store))?;
    log::info!("store {} canceled its subscription", store.id);

    build_view(repo, &scope, updated, now)
}

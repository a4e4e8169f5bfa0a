use serde::Deserialize;

use crate::domain::store::SubscriptionPlan;

/// Plan change requested by a store admin.
#[derive(Debug, Deserialize)]
pub struct ChangePlanForm {
    pub plan: SubscriptionPlan,
}

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Grace period applied when a subscription record carries no explicit value.
pub const DEFAULT_GRACE_DAYS: i32 = 3;

/// Subscription status of a shop.
///
/// `NotFound` is never written by the provider flow; it stands in for a shop
/// (or a legacy shop record) that has no subscription data at all.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(Default)]
pub enum SubscriptionStatus {
    /// Provisioned, first payment not confirmed yet
    #[default]
    Pending,
    Active,
    Overdue,
    Suspended,
    #[strum(to_string = "cancelled", serialize = "canceled")]
    Cancelled,
    NotFound,
}

impl SubscriptionStatus {
    /// Statuses that block protected features regardless of dates.
    pub fn is_always_blocking(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Suspended | SubscriptionStatus::Cancelled
        )
    }

    /// Valid transitions from this state for admin actions. Re-applying the
    /// current state is always allowed.
    pub fn valid_transitions(&self) -> &'static [SubscriptionStatus] {
        match self {
            SubscriptionStatus::Pending => &[
                SubscriptionStatus::Active,
                SubscriptionStatus::Overdue,
                SubscriptionStatus::Suspended,
                SubscriptionStatus::Cancelled,
            ],
            SubscriptionStatus::Active => &[
                SubscriptionStatus::Overdue,
                SubscriptionStatus::Suspended,
                SubscriptionStatus::Cancelled,
            ],
            SubscriptionStatus::Overdue => &[
                SubscriptionStatus::Active,
                SubscriptionStatus::Suspended,
                SubscriptionStatus::Cancelled,
            ],
            SubscriptionStatus::Suspended => &[
                SubscriptionStatus::Active,
                SubscriptionStatus::Overdue,
                SubscriptionStatus::Cancelled,
            ],
            SubscriptionStatus::Cancelled => &[],
            SubscriptionStatus::NotFound => &[],
        }
    }

    pub fn can_transition_to(&self, new_status: SubscriptionStatus) -> bool {
        *self == new_status || self.valid_transitions().contains(&new_status)
    }
}

/// Subscription data embedded in a shop record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub status: SubscriptionStatus,
    pub due_date: Option<NaiveDate>,
    pub paid_until: Option<NaiveDate>,
    pub grace_days: Option<i32>,
    pub external_customer_id: Option<String>,
    pub external_subscription_id: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Subscription {
    /// A freshly provisioned subscription awaiting its first payment.
    pub fn pending(
        external_customer_id: Option<String>,
        external_subscription_id: Option<String>,
        grace_days: i32,
    ) -> Self {
        Self {
            status: SubscriptionStatus::Pending,
            due_date: None,
            paid_until: None,
            grace_days: Some(grace_days),
            external_customer_id,
            external_subscription_id,
            updated_at: None,
        }
    }

    /// Grace days in effect. Unset means [`DEFAULT_GRACE_DAYS`]; negative values clamp to zero.
    pub fn effective_grace_days(&self) -> i64 {
        i64::from(self.grace_days.unwrap_or(DEFAULT_GRACE_DAYS).max(0))
    }

    /// Applies an update in place, mirroring what the persistence layer writes.
    pub fn apply(&mut self, update: &SubscriptionUpdate, updated_at: NaiveDateTime) {
        self.status = update.status;
        if let Some(paid_until) = update.paid_until {
            self.paid_until = Some(paid_until);
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = Some(updated_at);
    }
}

/// Fields to persist after a payment event. `None` dates are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    pub status: SubscriptionStatus,
    pub paid_until: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl SubscriptionUpdate {
    pub fn status_only(status: SubscriptionStatus) -> Self {
        Self {
            status,
            paid_until: None,
            due_date: None,
        }
    }
}

/// Result of evaluating whether protected features are reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingStatus {
    pub effective_status: SubscriptionStatus,
    pub is_blocked: bool,
}

impl BlockingStatus {
    pub fn open(effective_status: SubscriptionStatus) -> Self {
        Self {
            effective_status,
            is_blocked: false,
        }
    }

    pub fn blocked(effective_status: SubscriptionStatus) -> Self {
        Self {
            effective_status,
            is_blocked: true,
        }
    }
}

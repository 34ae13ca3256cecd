//! Subscription state machine driven by payment-provider events, and the
//! time-based blocking check used to gate protected features.
//!
//! Everything here is pure: callers load the shop, pass the current record
//! and a shop-local `now`, then persist whatever comes back.

use chrono::{Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        payment_event::{PaymentEvent, PaymentEventKind},
        subscription::{BlockingStatus, Subscription, SubscriptionStatus, SubscriptionUpdate},
    },
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Grace deadlines are taken at noon so a date never lands on the wrong
/// side of midnight.
const GRACE_END_TIME: NaiveTime = match NaiveTime::from_hms_opt(12, 0, 0) {
    Some(t) => t,
    None => panic!("invalid grace end time"),
};

/// What a payment event does to a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentEventOutcome {
    /// Persist these fields.
    Apply(SubscriptionUpdate),
    /// Overdue notice arrived before the grace period ran out. Nothing is written.
    WithinGrace { days_overdue: i64, grace_days: i64 },
    /// Event kind the lifecycle does not react to.
    Ignored { kind: String },
}

/// Computes the subscription change for an inbound payment event.
pub fn apply_payment_event(
    event: &PaymentEvent,
    current: &Subscription,
    now: NaiveDateTime,
) -> AppResult<PaymentEventOutcome> {
    match &event.kind {
        PaymentEventKind::PaymentConfirmed | PaymentEventKind::PaymentReceived => {
            let due_date = parse_due_date(event.due_date.as_deref())?;
            let next = next_due_date(due_date)?;
            Ok(PaymentEventOutcome::Apply(SubscriptionUpdate {
                status: SubscriptionStatus::Active,
                paid_until: Some(next),
                due_date: Some(next),
            }))
        }
        PaymentEventKind::PaymentOverdue => {
            let due_date = parse_due_date(event.due_date.as_deref())?;
            let days_overdue = days_overdue(due_date, now);
            let grace_days = current.effective_grace_days();

            if days_overdue >= grace_days {
                Ok(PaymentEventOutcome::Apply(SubscriptionUpdate::status_only(
                    SubscriptionStatus::Overdue,
                )))
            } else {
                Ok(PaymentEventOutcome::WithinGrace {
                    days_overdue,
                    grace_days,
                })
            }
        }
        PaymentEventKind::PaymentDeleted | PaymentEventKind::PaymentRefunded => Ok(
            PaymentEventOutcome::Apply(SubscriptionUpdate::status_only(
                SubscriptionStatus::Suspended,
            )),
        ),
        PaymentEventKind::Other(kind) => Ok(PaymentEventOutcome::Ignored { kind: kind.clone() }),
    }
}

/// Parses a provider `dueDate` (`YYYY-MM-DD`).
pub fn parse_due_date(raw: Option<&str>) -> AppResult<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidDate("payment has no due date".into()))?;

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AppError::InvalidDate(format!("{raw}: {e}")))
}

/// Same day next month, clamped to the last day when the month is shorter
/// (2026-01-31 becomes 2026-02-28).
pub fn next_due_date(due_date: NaiveDate) -> AppResult<NaiveDate> {
    due_date
        .checked_add_months(Months::new(1))
        .ok_or_else(|| AppError::InvalidDate(format!("{due_date} is out of range")))
}

/// Whole days elapsed since the start of `due_date`, rounded down.
pub fn days_overdue(due_date: NaiveDate, now: NaiveDateTime) -> i64 {
    let start = due_date.and_time(NaiveTime::MIN);
    (now - start).num_seconds().div_euclid(SECONDS_PER_DAY)
}

fn grace_expired(due_date: NaiveDate, grace_days: i64, now: NaiveDateTime) -> bool {
    let grace_days = u64::try_from(grace_days).unwrap_or(0);
    match due_date.checked_add_days(Days::new(grace_days)) {
        Some(grace_end) => now > grace_end.and_time(GRACE_END_TIME),
        None => false,
    }
}

/// Decides whether protected features are reachable right now.
///
/// `None` means the shop has no subscription data and is let through.
pub fn derive_blocking_status(
    subscription: Option<&Subscription>,
    now: NaiveDateTime,
) -> BlockingStatus {
    let Some(sub) = subscription else {
        return BlockingStatus::open(SubscriptionStatus::NotFound);
    };

    let lapsed = |sub: &Subscription| {
        sub.due_date
            .map(|due| grace_expired(due, sub.effective_grace_days(), now))
    };

    match sub.status {
        status if status.is_always_blocking() => BlockingStatus::blocked(status),
        SubscriptionStatus::Active => BlockingStatus::open(SubscriptionStatus::Active),
        SubscriptionStatus::Overdue => match lapsed(sub) {
            Some(false) => BlockingStatus::open(SubscriptionStatus::Overdue),
            // Missing due date: the overdue status was already the result of a lapsed grace
            Some(true) | None => BlockingStatus::blocked(SubscriptionStatus::Overdue),
        },
        SubscriptionStatus::Pending => match lapsed(sub) {
            Some(true) => BlockingStatus::blocked(SubscriptionStatus::Overdue),
            _ => BlockingStatus::open(SubscriptionStatus::Pending),
        },
        // NotFound
        other => BlockingStatus::open(other),
    }
}

/// What to do when the subscription record cannot be read at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservationErrorPolicy {
    /// Keep the shop usable; an outage on our side must not lock tenants out.
    #[default]
    TreatAsActive,
    TreatAsBlocked,
}

impl ObservationErrorPolicy {
    pub fn from_fail_open(fail_open: bool) -> Self {
        if fail_open {
            ObservationErrorPolicy::TreatAsActive
        } else {
            ObservationErrorPolicy::TreatAsBlocked
        }
    }
}

/// [`derive_blocking_status`] over a lookup that may have failed.
pub fn resolve_blocking_status(
    observation: AppResult<Option<Subscription>>,
    now: NaiveDateTime,
    policy: ObservationErrorPolicy,
) -> BlockingStatus {
    match observation {
        Ok(subscription) => derive_blocking_status(subscription.as_ref(), now),
        Err(err) => {
            tracing::error!(error = %err, policy = ?policy, "Subscription lookup failed");
            match policy {
                ObservationErrorPolicy::TreatAsActive => {
                    BlockingStatus::open(SubscriptionStatus::Active)
                }
                ObservationErrorPolicy::TreatAsBlocked => {
                    BlockingStatus::blocked(SubscriptionStatus::NotFound)
                }
            }
        }
    }
}

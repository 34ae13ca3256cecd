use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

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
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(Default)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    #[serde(alias = "in-progress")]
    #[strum(to_string = "in_progress", serialize = "in-progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Whether a service can still be marked as done.
    pub fn is_completable(&self) -> bool {
        !matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub shop_id: String,
    pub customer_id: Uuid,
    pub barber_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    /// Service price captured at booking time.
    pub price_cents: i64,
    /// Completed by consuming a free-cut credit instead of being billed.
    pub redeemed: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Appointment {
    /// Realized revenue: completed and billed.
    pub fn revenue(&self) -> i64 {
        if self.status != AppointmentStatus::Completed || self.redeemed {
            return 0;
        }
        self.price_cents
    }

    /// Expected revenue: anything not cancelled and not a free cut.
    pub fn projected_revenue(&self) -> i64 {
        if self.status == AppointmentStatus::Cancelled || self.redeemed {
            return 0;
        }
        self.price_cents
    }
}

/// Dashboard totals over a set of appointments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub appointment_count: i64,
    pub completed_count: i64,
    pub redeemed_count: i64,
    pub cancelled_count: i64,
    pub revenue_cents: i64,
    pub projected_revenue_cents: i64,
}

impl RevenueSummary {
    pub fn from_appointments<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        appointments
            .into_iter()
            .fold(RevenueSummary::default(), |mut summary, appointment| {
                summary.appointment_count += 1;
                match appointment.status {
                    AppointmentStatus::Completed => summary.completed_count += 1,
                    AppointmentStatus::Cancelled => summary.cancelled_count += 1,
                    _ => {}
                }
                if appointment.redeemed {
                    summary.redeemed_count += 1;
                }
                summary.revenue_cents += appointment.revenue();
                summary.projected_revenue_cents += appointment.projected_revenue();
                summary
            })
    }
}

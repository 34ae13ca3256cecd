use chrono::NaiveDateTime;
use serde::Serialize;

use super::subscription::Subscription;

/// A tenant barbershop. `id` is the public slug used in booking URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    pub owner_document: Option<String>,
    pub active: bool,
    /// Absent on legacy records created before billing existed.
    pub subscription: Option<Subscription>,
    /// Optimistic concurrency counter, bumped on every write.
    pub version: i32,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

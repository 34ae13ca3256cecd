use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

/// Paid cuts needed to earn one free cut.
pub const CUTS_PER_REWARD: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub shop_id: String,
    pub name: String,
    pub phone: String,
    /// Paid cuts since the last reward, in `0..CUTS_PER_REWARD` at rest.
    pub loyalty_cuts: i32,
    pub free_cuts_available: i32,
    pub total_cuts_completed: i32,
    pub total_spent_cents: i64,
    pub visits: i32,
    pub last_visit: Option<NaiveDate>,
    pub version: i32,
    pub created_at: Option<NaiveDateTime>,
}

impl Customer {
    pub fn has_free_cut(&self) -> bool {
        self.free_cuts_available > 0
    }

    pub fn loyalty_progress(&self) -> LoyaltyProgress {
        LoyaltyProgress {
            cuts: self.loyalty_cuts,
            cuts_per_reward: CUTS_PER_REWARD,
            cuts_until_reward: (CUTS_PER_REWARD - self.loyalty_cuts).max(0),
            free_cuts_available: self.free_cuts_available,
            next_visit_earns_reward: self.loyalty_cuts == CUTS_PER_REWARD - 1,
        }
    }
}

/// Loyalty card view shown to the shop admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyProgress {
    pub cuts: i32,
    pub cuts_per_reward: i32,
    pub cuts_until_reward: i32,
    pub free_cuts_available: i32,
    pub next_visit_earns_reward: bool,
}

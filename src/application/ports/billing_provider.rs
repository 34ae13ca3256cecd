use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app_error::AppResult;

// ============================================================================
// Port Types
// ============================================================================

/// Customer identifier in the payment provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscription identifier in the payment provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// CPF/CNPJ
    pub document: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub customer_id: CustomerId,
    pub value_cents: i64,
    pub description: String,
    pub next_due_date: NaiveDate,
}

// ============================================================================
// Port
// ============================================================================

/// Recurring-billing operations the shop management flow needs from the
/// payment provider.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn create_customer(&self, info: &CustomerInfo) -> AppResult<CustomerId>;

    /// Only the `Some` fields are sent.
    async fn update_customer(&self, customer_id: &CustomerId, info: &CustomerInfo)
    -> AppResult<()>;

    async fn delete_customer(&self, customer_id: &CustomerId) -> AppResult<()>;

    async fn create_subscription(&self, input: &NewSubscription) -> AppResult<SubscriptionId>;

    async fn cancel_subscription(&self, subscription_id: &SubscriptionId) -> AppResult<()>;
}

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Payment-provider event kinds the subscription lifecycle reacts to.
///
/// Anything the provider sends that is not listed here is kept verbatim in
/// `Other` so it can be logged and acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentEventKind {
    PaymentConfirmed,
    PaymentReceived,
    PaymentOverdue,
    PaymentDeleted,
    PaymentRefunded,
    #[strum(default)]
    Other(String),
}

/// Payment details carried by a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub id: Option<String>,
    pub customer: String,
    /// ISO calendar date as sent by the provider, validated by the lifecycle core.
    pub due_date: Option<String>,
}

/// Raw webhook body: `{ "event": "...", "payment": { ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentWebhookPayload {
    pub event: String,
    pub payment: Option<PaymentDetails>,
}

/// A payment event ready for the lifecycle core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub kind: PaymentEventKind,
    pub customer_id: String,
    pub payment_id: Option<String>,
    pub due_date: Option<String>,
}

impl PaymentEvent {
    pub fn from_payload(event: &str, payment: PaymentDetails) -> Self {
        Self {
            kind: event
                .parse()
                .unwrap_or_else(|_| PaymentEventKind::Other(event.to_string())),
            customer_id: payment.customer,
            payment_id: payment.id,
            due_date: payment.due_date,
        }
    }
}

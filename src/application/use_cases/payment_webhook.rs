use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::{
        shop::ShopRepo,
        subscription_lifecycle::{PaymentEventOutcome, apply_payment_event},
    },
    domain::entities::{
        payment_event::{PaymentEvent, PaymentWebhookPayload},
        subscription::{Subscription, SubscriptionStatus},
    },
};

/// Read-compute-write attempts before a version conflict is surfaced.
pub const MAX_UPDATE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    #[serde(rename_all = "camelCase")]
    Applied {
        shop_id: String,
        status: SubscriptionStatus,
    },
    #[serde(rename_all = "camelCase")]
    WithinGrace {
        shop_id: String,
        days_overdue: i64,
        grace_days: i64,
    },
    Ignored {
        kind: String,
    },
    /// Payload carried no payment object.
    NoPayment,
}

#[derive(Clone)]
pub struct PaymentWebhookUseCases {
    shop_repo: Arc<dyn ShopRepo>,
}

impl PaymentWebhookUseCases {
    pub fn new(shop_repo: Arc<dyn ShopRepo>) -> Self {
        Self { shop_repo }
    }

    /// Applies one provider notification to the owning shop.
    ///
    /// `now` is shop-local and drives the grace computation; `updated_at`
    /// is stamped on whatever gets persisted. An unknown provider customer
    /// comes back as `AppError::UnknownCustomer`.
    #[instrument(skip(self, payload), fields(event_type = %payload.event))]
    pub async fn process(
        &self,
        payload: PaymentWebhookPayload,
        now: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> AppResult<WebhookOutcome> {
        let Some(payment) = payload.payment else {
            tracing::info!("Webhook without payment, skipping");
            return Ok(WebhookOutcome::NoPayment);
        };
        let event = PaymentEvent::from_payload(&payload.event, payment);

        let mut attempt = 1;
        loop {
            match self.apply_once(&event, now, updated_at).await {
                Err(AppError::Conflict) if attempt < MAX_UPDATE_ATTEMPTS => {
                    tracing::warn!(attempt, customer_id = %event.customer_id, "Shop changed concurrently, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn apply_once(
        &self,
        event: &PaymentEvent,
        now: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> AppResult<WebhookOutcome> {
        let shop = self
            .shop_repo
            .find_by_external_customer_id(&event.customer_id)
            .await?
            .ok_or_else(|| AppError::UnknownCustomer(event.customer_id.clone()))?;

        let current = shop.subscription.clone().unwrap_or_else(|| Subscription {
            grace_days: None,
            ..Subscription::pending(Some(event.customer_id.clone()), None, 0)
        });

        match apply_payment_event(event, &current, now)? {
            PaymentEventOutcome::Apply(update) => {
                self.shop_repo
                    .update_subscription(&shop.id, &update, shop.version, updated_at)
                    .await?;
                tracing::info!(
                    shop_id = %shop.id,
                    from = %current.status,
                    to = %update.status,
                    payment_id = ?event.payment_id,
                    "Subscription updated"
                );
                Ok(WebhookOutcome::Applied {
                    shop_id: shop.id,
                    status: update.status,
                })
            }
            PaymentEventOutcome::WithinGrace {
                days_overdue,
                grace_days,
            } => {
                tracing::info!(shop_id = %shop.id, days_overdue, grace_days, "Payment overdue within grace period");
                Ok(WebhookOutcome::WithinGrace {
                    shop_id: shop.id,
                    days_overdue,
                    grace_days,
                })
            }
            PaymentEventOutcome::Ignored { kind } => {
                tracing::info!(shop_id = %shop.id, event_type = %kind, "Unhandled payment event");
                Ok(WebhookOutcome::Ignored { kind })
            }
        }
    }
}

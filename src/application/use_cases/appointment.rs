use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::loyalty::{CompletionMode, CompletionOutcome, complete_appointment},
    domain::entities::{
        appointment::{Appointment, RevenueSummary},
        customer::{Customer, LoyaltyProgress},
    },
};

pub const MAX_COMPLETION_ATTEMPTS: u32 = 3;

/// Longest range accepted by [`AppointmentUseCases::revenue_summary`].
pub const MAX_REVENUE_RANGE_DAYS: i64 = 366;

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait CustomerRepo: Send + Sync {
    async fn get_by_id(&self, shop_id: &str, customer_id: Uuid) -> AppResult<Option<Customer>>;
}

#[async_trait]
pub trait AppointmentRepo: Send + Sync {
    async fn get_by_id(&self, shop_id: &str, appointment_id: Uuid)
    -> AppResult<Option<Appointment>>;

    /// Appointments with `from <= date <= to`.
    async fn list_by_shop_and_range(
        &self,
        shop_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<Appointment>>;

    /// Writes the completed appointment and the customer in one transaction.
    /// Returns `AppError::Conflict` when the customer version moved or the
    /// appointment was finished by someone else in the meantime.
    async fn save_completion(
        &self,
        appointment: &Appointment,
        customer: &Customer,
        expected_customer_version: i32,
    ) -> AppResult<()>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct AppointmentUseCases {
    customer_repo: Arc<dyn CustomerRepo>,
    appointment_repo: Arc<dyn AppointmentRepo>,
}

impl AppointmentUseCases {
    pub fn new(
        customer_repo: Arc<dyn CustomerRepo>,
        appointment_repo: Arc<dyn AppointmentRepo>,
    ) -> Self {
        Self {
            customer_repo,
            appointment_repo,
        }
    }

    /// Completes an appointment, paid or as a free-cut redemption, and
    /// persists the customer's loyalty state with it.
    #[instrument(skip(self))]
    pub async fn complete_appointment(
        &self,
        shop_id: &str,
        appointment_id: Uuid,
        mode: CompletionMode,
        date: NaiveDate,
    ) -> AppResult<CompletionOutcome> {
        let mut attempt = 1;
        loop {
            match self
                .complete_once(shop_id, appointment_id, mode, date)
                .await
            {
                Err(AppError::Conflict) if attempt < MAX_COMPLETION_ATTEMPTS => {
                    tracing::warn!(attempt, %appointment_id, "Customer changed concurrently, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn revenue_summary(
        &self,
        shop_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<RevenueSummary> {
        if from > to {
            return Err(AppError::InvalidInput("`from` must not be after `to`".into()));
        }
        if (to - from).num_days() > MAX_REVENUE_RANGE_DAYS {
            return Err(AppError::InvalidInput(format!(
                "Range must not exceed {MAX_REVENUE_RANGE_DAYS} days"
            )));
        }

        let appointments = self
            .appointment_repo
            .list_by_shop_and_range(shop_id, from, to)
            .await?;
        Ok(RevenueSummary::from_appointments(&appointments))
    }

    #[instrument(skip(self))]
    pub async fn loyalty_progress(
        &self,
        shop_id: &str,
        customer_id: Uuid,
    ) -> AppResult<LoyaltyProgress> {
        let customer = self
            .customer_repo
            .get_by_id(shop_id, customer_id)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(customer.loyalty_progress())
    }

    async fn complete_once(
        &self,
        shop_id: &str,
        appointment_id: Uuid,
        mode: CompletionMode,
        date: NaiveDate,
    ) -> AppResult<CompletionOutcome> {
        let appointment = self
            .appointment_repo
            .get_by_id(shop_id, appointment_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let customer = self
            .customer_repo
            .get_by_id(shop_id, appointment.customer_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let outcome = complete_appointment(&appointment, &customer, mode, date)?;

        match &outcome {
            CompletionOutcome::Completed {
                appointment: completed,
                customer: updated,
                reward_earned,
            } => {
                self.appointment_repo
                    .save_completion(completed, updated, customer.version)
                    .await?;
                tracing::info!(
                    %appointment_id,
                    customer_id = %updated.id,
                    redeemed = completed.redeemed,
                    reward_earned,
                    loyalty_cuts = updated.loyalty_cuts,
                    "Appointment completed"
                );
            }
            CompletionOutcome::NoFreeCutAvailable => {
                tracing::info!(%appointment_id, customer_id = %customer.id, "No free cut available");
            }
        }

        Ok(outcome)
    }
}

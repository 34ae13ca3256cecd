//! "10th cut free" accrual and redemption.
//!
//! Functions take the current record and return the updated copy; nothing
//! here touches storage.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        appointment::{Appointment, AppointmentStatus},
        customer::{CUTS_PER_REWARD, Customer},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitOutcome {
    pub customer: Customer,
    pub reward_earned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionOutcome {
    pub customer: Customer,
    pub success: bool,
}

/// How an appointment is being paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    Paid,
    RedeemFreeCut,
}

impl CompletionMode {
    pub fn from_redeem_flag(redeem_free_cut: bool) -> Self {
        if redeem_free_cut {
            CompletionMode::RedeemFreeCut
        } else {
            CompletionMode::Paid
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    #[serde(rename_all = "camelCase")]
    Completed {
        appointment: Appointment,
        customer: Customer,
        reward_earned: bool,
    },
    /// Redemption requested but the customer has no credit. Nothing changed.
    NoFreeCutAvailable,
}

/// Records a paid visit and advances the loyalty counter.
pub fn complete_visit(
    customer: &Customer,
    price_cents: i64,
    date: NaiveDate,
) -> AppResult<VisitOutcome> {
    if !(0..CUTS_PER_REWARD).contains(&customer.loyalty_cuts) {
        return Err(AppError::InvalidInput(format!(
            "loyalty_cuts out of range: {}",
            customer.loyalty_cuts
        )));
    }
    if price_cents < 0 {
        return Err(AppError::InvalidInput("price must not be negative".into()));
    }

    let mut updated = record_visit(customer, date)?;
    updated.total_spent_cents = updated
        .total_spent_cents
        .checked_add(price_cents)
        .ok_or_else(|| counter_overflow("total_spent_cents"))?;
    updated.loyalty_cuts += 1;

    let reward_earned = updated.loyalty_cuts >= CUTS_PER_REWARD;
    if reward_earned {
        updated.loyalty_cuts = 0;
        updated.free_cuts_available = updated
            .free_cuts_available
            .checked_add(1)
            .ok_or_else(|| counter_overflow("free_cuts_available"))?;
    }

    Ok(VisitOutcome {
        customer: updated,
        reward_earned,
    })
}

/// Copy of `customer` with the visit counters advanced.
fn record_visit(customer: &Customer, date: NaiveDate) -> AppResult<Customer> {
    let mut updated = customer.clone();
    updated.visits = updated
        .visits
        .checked_add(1)
        .ok_or_else(|| counter_overflow("visits"))?;
    updated.total_cuts_completed = updated
        .total_cuts_completed
        .checked_add(1)
        .ok_or_else(|| counter_overflow("total_cuts_completed"))?;
    updated.last_visit = Some(date);
    Ok(updated)
}

fn counter_overflow(field: &str) -> AppError {
    AppError::InvalidInput(format!("{field} overflow"))
}

/// Consumes one free cut when available. A customer without credit comes
/// back unchanged with `success == false`.
pub fn redeem_free_cut(customer: &Customer) -> RedemptionOutcome {
    if !customer.has_free_cut() {
        return RedemptionOutcome {
            customer: customer.clone(),
            success: false,
        };
    }

    let mut updated = customer.clone();
    updated.free_cuts_available -= 1;
    RedemptionOutcome {
        customer: updated,
        success: true,
    }
}

/// Completes an appointment and applies the matching loyalty rule.
///
/// Redeemed completions count as a visit but never advance `loyalty_cuts`
/// and never add to `total_spent_cents`.
pub fn complete_appointment(
    appointment: &Appointment,
    customer: &Customer,
    mode: CompletionMode,
    date: NaiveDate,
) -> AppResult<CompletionOutcome> {
    if !appointment.status.is_completable() {
        return Err(AppError::InvalidInput(format!(
            "appointment is already {}",
            appointment.status
        )));
    }
    if appointment.customer_id != customer.id || appointment.shop_id != customer.shop_id {
        return Err(AppError::InvalidInput(
            "appointment does not belong to this customer".into(),
        ));
    }

    let mut completed = appointment.clone();
    completed.status = AppointmentStatus::Completed;

    match mode {
        CompletionMode::Paid => {
            let visit = complete_visit(customer, appointment.price_cents, date)?;
            completed.redeemed = false;
            Ok(CompletionOutcome::Completed {
                appointment: completed,
                customer: visit.customer,
                reward_earned: visit.reward_earned,
            })
        }
        CompletionMode::RedeemFreeCut => {
            let redemption = redeem_free_cut(customer);
            if !redemption.success {
                return Ok(CompletionOutcome::NoFreeCutAvailable);
            }

            let updated = record_visit(&redemption.customer, date)?;

            completed.redeemed = true;
            Ok(CompletionOutcome::Completed {
                appointment: completed,
                customer: updated,
                reward_earned: false,
            })
        }
    }
}

//! In-memory mock implementations for customer and appointment repositories.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::appointment::{AppointmentRepo, CustomerRepo},
    domain::entities::{appointment::Appointment, customer::Customer},
};

// ============================================================================
// InMemoryCustomerRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryCustomerRepo {
    pub customers: Mutex<HashMap<Uuid, Customer>>,
}

impl InMemoryCustomerRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: Vec<Customer>) -> Self {
        let map = customers.into_iter().map(|c| (c.id, c)).collect();
        Self {
            customers: Mutex::new(map),
        }
    }

    pub fn get(&self, customer_id: Uuid) -> Option<Customer> {
        self.customers.lock().unwrap().get(&customer_id).cloned()
    }
}

#[async_trait]
impl CustomerRepo for InMemoryCustomerRepo {
    async fn get_by_id(&self, shop_id: &str, customer_id: Uuid) -> AppResult<Option<Customer>> {
        Ok(self.get(customer_id).filter(|c| c.shop_id == shop_id))
    }
}

// ============================================================================
// InMemoryAppointmentRepo
// ============================================================================

/// Writes completions into the shared customer repo, checking the
/// customer version the same way the Postgres transaction does.
pub struct InMemoryAppointmentRepo {
    pub appointments: Mutex<HashMap<Uuid, Appointment>>,
    customers: Arc<InMemoryCustomerRepo>,
    pending_conflicts: Mutex<u32>,
}

impl InMemoryAppointmentRepo {
    pub fn new(customers: Arc<InMemoryCustomerRepo>, appointments: Vec<Appointment>) -> Self {
        let map = appointments.into_iter().map(|a| (a.id, a)).collect();
        Self {
            appointments: Mutex::new(map),
            customers,
            pending_conflicts: Mutex::new(0),
        }
    }

    /// The next `count` completions fail with `AppError::Conflict`.
    pub fn fail_next_saves_with_conflict(&self, count: u32) {
        *self.pending_conflicts.lock().unwrap() = count;
    }

    pub fn get(&self, appointment_id: Uuid) -> Option<Appointment> {
        self.appointments
            .lock()
            .unwrap()
            .get(&appointment_id)
            .cloned()
    }
}

#[async_trait]
impl AppointmentRepo for InMemoryAppointmentRepo {
    async fn get_by_id(
        &self,
        shop_id: &str,
        appointment_id: Uuid,
    ) -> AppResult<Option<Appointment>> {
        Ok(self.get(appointment_id).filter(|a| a.shop_id == shop_id))
    }

    async fn list_by_shop_and_range(
        &self,
        shop_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .appointments
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.shop_id == shop_id && a.date >= from && a.date <= to)
            .cloned()
            .collect();
        appointments.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        Ok(appointments)
    }

    async fn save_completion(
        &self,
        appointment: &Appointment,
        customer: &Customer,
        expected_customer_version: i32,
    ) -> AppResult<()> {
        {
            let mut pending = self.pending_conflicts.lock().unwrap();
            if *pending > 0 {
                *pending -= 1;
                return Err(AppError::Conflict);
            }
        }

        let mut appointments = self.appointments.lock().unwrap();
        let mut customers = self.customers.customers.lock().unwrap();

        let stored_appointment = appointments
            .get_mut(&appointment.id)
            .ok_or(AppError::NotFound)?;
        if !stored_appointment.status.is_completable() {
            return Err(AppError::Conflict);
        }
        let stored_customer = customers.get_mut(&customer.id).ok_or(AppError::NotFound)?;
        if stored_customer.version != expected_customer_version {
            return Err(AppError::Conflict);
        }

        let now = chrono::Utc::now().naive_utc();
        *stored_appointment = Appointment {
            updated_at: Some(now),
            ..appointment.clone()
        };
        *stored_customer = Customer {
            version: expected_customer_version + 1,
            ..customer.clone()
        };
        Ok(())
    }
}

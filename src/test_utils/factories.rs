//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::domain::entities::{
    appointment::{Appointment, AppointmentStatus},
    customer::Customer,
    shop::Shop,
    subscription::{Subscription, SubscriptionStatus},
};

pub const TEST_SHOP_ID: &str = "barbearia-centro";

/// Create a test subscription (active, paid through 2026-02-10).
pub fn create_test_subscription(overrides: impl FnOnce(&mut Subscription)) -> Subscription {
    let mut subscription = Subscription {
        status: SubscriptionStatus::Active,
        due_date: Some(test_date(2026, 2, 10)),
        paid_until: Some(test_date(2026, 2, 10)),
        grace_days: Some(3),
        external_customer_id: Some("cus_000001".to_string()),
        external_subscription_id: Some("sub_000001".to_string()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut subscription);
    subscription
}

/// Create a test shop with an active subscription.
pub fn create_test_shop(overrides: impl FnOnce(&mut Shop)) -> Shop {
    let mut shop = Shop {
        id: TEST_SHOP_ID.to_string(),
        name: "Barbearia Centro".to_string(),
        owner_name: "Carlos Silva".to_string(),
        owner_email: "carlos@example.com".to_string(),
        owner_phone: "11999990000".to_string(),
        owner_document: None,
        active: true,
        subscription: Some(create_test_subscription(|_| {})),
        version: 0,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut shop);
    shop
}

/// Create a test customer with no loyalty history.
pub fn create_test_customer(overrides: impl FnOnce(&mut Customer)) -> Customer {
    let mut customer = Customer {
        id: Uuid::new_v4(),
        shop_id: TEST_SHOP_ID.to_string(),
        name: "João Pereira".to_string(),
        phone: "11988887777".to_string(),
        loyalty_cuts: 0,
        free_cuts_available: 0,
        total_cuts_completed: 0,
        total_spent_cents: 0,
        visits: 0,
        last_visit: None,
        version: 0,
        created_at: Some(test_datetime()),
    };
    overrides(&mut customer);
    customer
}

/// Create a confirmed appointment for the given customer.
pub fn create_test_appointment(
    customer: &Customer,
    overrides: impl FnOnce(&mut Appointment),
) -> Appointment {
    let mut appointment = Appointment {
        id: Uuid::new_v4(),
        shop_id: customer.shop_id.clone(),
        customer_id: customer.id,
        barber_id: None,
        service_id: None,
        date: test_date(2026, 3, 14),
        time: "10:00".to_string(),
        status: AppointmentStatus::Confirmed,
        price_cents: 5000,
        redeemed: false,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut appointment);
    appointment
}

pub fn test_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Fixed timestamp so assertions stay deterministic.
pub fn test_datetime() -> NaiveDateTime {
    test_date(2026, 1, 10).and_hms_opt(9, 0, 0).unwrap()
}

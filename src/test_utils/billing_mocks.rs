//! Recording stand-in for the payment provider.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::billing_provider::{
        BillingProvider, CustomerId, CustomerInfo, NewSubscription, SubscriptionId,
    },
};

/// Hands out sequential ids and records every call for assertions.
#[derive(Default)]
pub struct DummyBillingProvider {
    next_id: AtomicU32,
    fail_subscriptions: bool,
    fail_cancellations: bool,
    customers: Mutex<Vec<CustomerInfo>>,
    customer_updates: Mutex<Vec<(String, CustomerInfo)>>,
    deleted_customers: Mutex<Vec<String>>,
    subscriptions: Mutex<Vec<NewSubscription>>,
    cancelled_subscriptions: Mutex<Vec<String>>,
}

impl DummyBillingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// `create_subscription` always fails.
    pub fn failing_subscriptions() -> Self {
        Self {
            fail_subscriptions: true,
            ..Self::default()
        }
    }

    /// `cancel_subscription` always fails.
    pub fn failing_cancellations() -> Self {
        Self {
            fail_cancellations: true,
            ..Self::default()
        }
    }

    pub fn customers(&self) -> Vec<CustomerInfo> {
        self.customers.lock().unwrap().clone()
    }

    pub fn customer_updates(&self) -> Vec<(String, CustomerInfo)> {
        self.customer_updates.lock().unwrap().clone()
    }

    pub fn deleted_customers(&self) -> Vec<String> {
        self.deleted_customers.lock().unwrap().clone()
    }

    pub fn subscriptions(&self) -> Vec<NewSubscription> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn cancelled_subscriptions(&self) -> Vec<String> {
        self.cancelled_subscriptions.lock().unwrap().clone()
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}_{n:06}")
    }
}

#[async_trait]
impl BillingProvider for DummyBillingProvider {
    async fn create_customer(&self, info: &CustomerInfo) -> AppResult<CustomerId> {
        self.customers.lock().unwrap().push(info.clone());
        Ok(CustomerId::new(self.next_id("cus")))
    }

    async fn update_customer(
        &self,
        customer_id: &CustomerId,
        info: &CustomerInfo,
    ) -> AppResult<()> {
        self.customer_updates
            .lock()
            .unwrap()
            .push((customer_id.to_string(), info.clone()));
        Ok(())
    }

    async fn delete_customer(&self, customer_id: &CustomerId) -> AppResult<()> {
        self.deleted_customers
            .lock()
            .unwrap()
            .push(customer_id.to_string());
        Ok(())
    }

    async fn create_subscription(&self, input: &NewSubscription) -> AppResult<SubscriptionId> {
        if self.fail_subscriptions {
            return Err(AppError::Provider("subscription rejected".into()));
        }
        self.subscriptions.lock().unwrap().push(input.clone());
        Ok(SubscriptionId::new(self.next_id("sub")))
    }

    async fn cancel_subscription(&self, subscription_id: &SubscriptionId) -> AppResult<()> {
        if self.fail_cancellations {
            return Err(AppError::Provider("provider unavailable".into()));
        }
        self.cancelled_subscriptions
            .lock()
            .unwrap()
            .push(subscription_id.to_string());
        Ok(())
    }
}

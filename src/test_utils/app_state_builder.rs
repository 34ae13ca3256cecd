//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` creates an `AppState` backed by in-memory repos and
//! the recording billing provider, so routes can be driven with `axum-test`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use chrono::FixedOffset;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        appointment::AppointmentUseCases, payment_webhook::PaymentWebhookUseCases,
        shop::ShopUseCases,
    },
    domain::entities::{appointment::Appointment, customer::Customer, shop::Shop},
    infra::config::AppConfig,
    test_utils::{
        DummyBillingProvider, InMemoryAppointmentRepo, InMemoryCustomerRepo, InMemoryShopRepo,
    },
};

pub const TEST_MASTER_API_KEY: &str = "master_test_key_123";
pub const TEST_WEBHOOK_TOKEN: &str = "whk_test_token_456";

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let shop = create_test_shop(|s| s.id = "barbearia-centro".to_string());
///
/// let (app_state, repos) = TestAppStateBuilder::new()
///     .with_shop(shop)
///     .build_with_repos();
/// ```
pub struct TestAppStateBuilder {
    shops: Vec<Shop>,
    customers: Vec<Customer>,
    appointments: Vec<Appointment>,
    shop_repo: Option<Arc<InMemoryShopRepo>>,
    webhook_token: Option<String>,
    fail_open: bool,
}

/// Handles on the in-memory stores behind a built `AppState`.
pub struct TestRepos {
    pub shops: Arc<InMemoryShopRepo>,
    pub customers: Arc<InMemoryCustomerRepo>,
    pub appointments: Arc<InMemoryAppointmentRepo>,
    pub billing: Arc<DummyBillingProvider>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            shops: vec![],
            customers: vec![],
            appointments: vec![],
            shop_repo: None,
            webhook_token: Some(TEST_WEBHOOK_TOKEN.to_string()),
            fail_open: true,
        }
    }

    pub fn with_shop(mut self, shop: Shop) -> Self {
        self.shops.push(shop);
        self
    }

    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customers.push(customer);
        self
    }

    pub fn with_appointment(mut self, appointment: Appointment) -> Self {
        self.appointments.push(appointment);
        self
    }

    /// Use a prepared shop repo (e.g. `InMemoryShopRepo::failing()`).
    pub fn with_shop_repo(mut self, repo: Arc<InMemoryShopRepo>) -> Self {
        self.shop_repo = Some(repo);
        self
    }

    /// Disable the webhook token check.
    pub fn without_webhook_token(mut self) -> Self {
        self.webhook_token = None;
        self
    }

    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    pub fn build(self) -> AppState {
        self.build_with_repos().0
    }

    pub fn build_with_repos(self) -> (AppState, TestRepos) {
        let config = test_config(self.webhook_token, self.fail_open);

        let shops = self
            .shop_repo
            .unwrap_or_else(|| Arc::new(InMemoryShopRepo::with_shops(self.shops)));
        let customers = Arc::new(InMemoryCustomerRepo::with_customers(self.customers));
        let appointments = Arc::new(InMemoryAppointmentRepo::new(
            customers.clone(),
            self.appointments,
        ));
        let billing = Arc::new(DummyBillingProvider::new());

        let app_state = AppState {
            shop_use_cases: Arc::new(ShopUseCases::new(
                shops.clone(),
                billing.clone(),
                config.shop_settings(),
            )),
            payment_webhook_use_cases: Arc::new(PaymentWebhookUseCases::new(shops.clone())),
            appointment_use_cases: Arc::new(AppointmentUseCases::new(
                customers.clone(),
                appointments.clone(),
            )),
            config: Arc::new(config),
        };

        (
            app_state,
            TestRepos {
                shops,
                customers,
                appointments,
                billing,
            },
        )
    }
}

fn test_config(webhook_token: Option<String>, fail_open: bool) -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/barbershop_test".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        cors_origin: HeaderValue::from_static("http://localhost:5173"),
        master_api_key: SecretString::new(TEST_MASTER_API_KEY.into()),
        payment_webhook_token: webhook_token.map(|t| SecretString::new(t.into())),
        asaas_api_key: SecretString::new("asaas_test".into()),
        asaas_base_url: Url::parse("https://sandbox.asaas.com/api/v3/").unwrap(),
        monthly_price_cents: 9_700,
        default_grace_days: 3,
        shop_utc_offset: FixedOffset::west_opt(3 * 3600).unwrap(),
        subscription_check_fail_open: fail_open,
    }
}

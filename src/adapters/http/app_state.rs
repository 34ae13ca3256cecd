use std::sync::Arc;

use crate::{
    application::use_cases::{
        appointment::AppointmentUseCases, payment_webhook::PaymentWebhookUseCases,
        shop::ShopUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub shop_use_cases: Arc<ShopUseCases>,
    pub payment_webhook_use_cases: Arc<PaymentWebhookUseCases>,
    pub appointment_use_cases: Arc<AppointmentUseCases>,
}

use std::fs::File;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::billing_provider::BillingProvider,
        use_cases::{
            appointment::{AppointmentRepo, AppointmentUseCases, CustomerRepo},
            payment_webhook::PaymentWebhookUseCases,
            shop::{ShopRepo, ShopUseCases},
        },
    },
    infra::{
        asaas_client::AsaasClient, config::AppConfig, error::InfraError, postgres_persistence,
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    let postgres_arc = postgres_persistence(&config.database_url).await?;

    let asaas = AsaasClient::new(
        SecretString::new(config.asaas_api_key.expose_secret().into()),
        config.asaas_base_url.clone(),
    )
    .map_err(InfraError::HttpClient)?;
    tracing::info!(base_url = %config.asaas_base_url, "Asaas client ready");

    let shop_repo = postgres_arc.clone() as Arc<dyn ShopRepo>;

    let shop_use_cases = ShopUseCases::new(
        shop_repo.clone(),
        Arc::new(asaas) as Arc<dyn BillingProvider>,
        config.shop_settings(),
    );
    let payment_webhook_use_cases = PaymentWebhookUseCases::new(shop_repo);
    let appointment_use_cases = AppointmentUseCases::new(
        postgres_arc.clone() as Arc<dyn CustomerRepo>,
        postgres_arc as Arc<dyn AppointmentRepo>,
    );

    if config.payment_webhook_token.is_none() {
        tracing::warn!("PAYMENT_WEBHOOK_TOKEN not set, webhook requests are not authenticated");
    }

    Ok(AppState {
        config: Arc::new(config),
        shop_use_cases: Arc::new(shop_use_cases),
        payment_webhook_use_cases: Arc::new(payment_webhook_use_cases),
        appointment_use_cases: Arc::new(appointment_use_cases),
    })
}

pub fn init_tracing() -> Result<(), InfraError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "barbershop_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").map_err(InfraError::LogFile)?;
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    Ok(())
}

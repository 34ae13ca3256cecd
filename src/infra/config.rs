use std::net::SocketAddr;

use axum::http::HeaderValue;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Utc};
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::{
    application::use_cases::{
        shop::ShopSettings, subscription_lifecycle::ObservationErrorPolicy,
    },
    infra::{asaas_client, error::InfraError},
};

pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// Bearer key for the master panel endpoints.
    pub master_api_key: SecretString,
    /// Expected value of the provider's webhook token header. Unset disables the check.
    pub payment_webhook_token: Option<SecretString>,
    pub asaas_api_key: SecretString,
    pub asaas_base_url: Url,
    pub monthly_price_cents: i64,
    pub default_grace_days: i32,
    /// Offset used for "today" and grace deadlines (shops are in BRT, UTC-3).
    pub shop_utc_offset: FixedOffset,
    /// Let shops through when their subscription cannot be read.
    pub subscription_check_fail_open: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let database_url: String = get_env("DATABASE_URL");
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));

        let cors_origin_raw: String =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:5173"));
        let cors_origin =
            HeaderValue::from_str(&cors_origin_raw).map_err(|e| InfraError::ConfigInvalid {
                var: "CORS_ORIGIN",
                reason: e.to_string(),
            })?;

        let master_api_key = SecretString::new(get_env::<String>("MASTER_API_KEY").into());
        let payment_webhook_token = std::env::var("PAYMENT_WEBHOOK_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| SecretString::new(s.into()));

        let asaas_api_key = SecretString::new(get_env::<String>("ASAAS_API_KEY").into());
        let asaas_sandbox: bool = get_env_default("ASAAS_SANDBOX", false);
        let asaas_base_url = match std::env::var("ASAAS_BASE_URL").ok() {
            Some(raw) => Url::parse(&raw),
            None => asaas_client::default_base_url(asaas_sandbox),
        }
        .map_err(|e| InfraError::ConfigInvalid {
            var: "ASAAS_BASE_URL",
            reason: e.to_string(),
        })?;

        let monthly_price_cents: i64 = get_env_default("MONTHLY_PRICE_CENTS", 9_700);
        if monthly_price_cents <= 0 {
            return Err(InfraError::ConfigInvalid {
                var: "MONTHLY_PRICE_CENTS",
                reason: "must be positive".into(),
            });
        }

        let default_grace_days: i32 = get_env_default("DEFAULT_GRACE_DAYS", 3);
        if default_grace_days < 0 {
            return Err(InfraError::ConfigInvalid {
                var: "DEFAULT_GRACE_DAYS",
                reason: "must not be negative".into(),
            });
        }

        let offset_hours: i32 = get_env_default("SHOP_UTC_OFFSET_HOURS", -3);
        let shop_utc_offset =
            FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| InfraError::ConfigInvalid {
                var: "SHOP_UTC_OFFSET_HOURS",
                reason: format!("{offset_hours} is not a valid offset"),
            })?;

        let subscription_check_fail_open: bool =
            get_env_default("SUBSCRIPTION_CHECK_FAIL_OPEN", true);

        Ok(Self {
            database_url,
            bind_addr,
            cors_origin,
            master_api_key,
            payment_webhook_token,
            asaas_api_key,
            asaas_base_url,
            monthly_price_cents,
            default_grace_days,
            shop_utc_offset,
            subscription_check_fail_open,
        })
    }

    pub fn shop_settings(&self) -> ShopSettings {
        ShopSettings {
            monthly_price_cents: self.monthly_price_cents,
            default_grace_days: self.default_grace_days,
            observation_policy: ObservationErrorPolicy::from_fail_open(
                self.subscription_check_fail_open,
            ),
        }
    }

    /// Wall-clock time in the shops' timezone.
    pub fn shop_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.shop_utc_offset).naive_local()
    }

    pub fn shop_today(&self) -> NaiveDate {
        self.shop_now().date()
    }
}

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::billing_provider::{
        BillingProvider, CustomerId, CustomerInfo, NewSubscription, SubscriptionId,
    },
    infra::http_client::try_build_client,
};

pub const ASAAS_PRODUCTION_URL: &str = "https://api.asaas.com/api/v3/";
pub const ASAAS_SANDBOX_URL: &str = "https://sandbox.asaas.com/api/v3/";

pub fn default_base_url(sandbox: bool) -> Result<Url, url::ParseError> {
    if sandbox {
        Url::parse(ASAAS_SANDBOX_URL)
    } else {
        Url::parse(ASAAS_PRODUCTION_URL)
    }
}

/// Asaas REST client implementing [`BillingProvider`].
#[derive(Clone)]
pub struct AsaasClient {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

impl AsaasClient {
    pub fn new(api_key: SecretString, base_url: Url) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: try_build_client()?,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("Invalid Asaas endpoint {path}: {e}")))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        request
            .header("access_token", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Asaas request failed: {e}")))
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let body = self.read_success_body(response).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Asaas response");
            AppError::Provider(format!("Failed to parse Asaas response: {e}"))
        })
    }

    /// For DELETE/PUT calls whose body we don't need.
    async fn handle_empty(&self, response: reqwest::Response) -> AppResult<()> {
        self.read_success_body(response).await.map(|_| ())
    }

    async fn read_success_body(&self, response: reqwest::Response) -> AppResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read Asaas response: {e}")))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Asaas API error");
            let message = error_description(&body).unwrap_or_else(|| status.to_string());
            return Err(AppError::Provider(format!("Asaas error: {message}")));
        }

        Ok(body)
    }
}

#[async_trait]
impl BillingProvider for AsaasClient {
    async fn create_customer(&self, info: &CustomerInfo) -> AppResult<CustomerId> {
        let response = self
            .send(
                self.client
                    .post(self.endpoint("customers")?)
                    .json(&AsaasCustomerRequest::from(info)),
            )
            .await?;

        let created: AsaasObject = self.handle_response(response).await?;
        Ok(CustomerId::new(created.id))
    }

    async fn update_customer(
        &self,
        customer_id: &CustomerId,
        info: &CustomerInfo,
    ) -> AppResult<()> {
        let response = self
            .send(
                self.client
                    .put(self.endpoint(&format!("customers/{customer_id}"))?)
                    .json(&AsaasCustomerRequest::from(info)),
            )
            .await?;

        self.handle_empty(response).await
    }

    async fn delete_customer(&self, customer_id: &CustomerId) -> AppResult<()> {
        let response = self
            .send(
                self.client
                    .delete(self.endpoint(&format!("customers/{customer_id}"))?),
            )
            .await?;

        self.handle_empty(response).await
    }

    async fn create_subscription(&self, input: &NewSubscription) -> AppResult<SubscriptionId> {
        let response = self
            .send(
                self.client
                    .post(self.endpoint("subscriptions")?)
                    .json(&AsaasSubscriptionRequest::from(input)),
            )
            .await?;

        let created: AsaasObject = self.handle_response(response).await?;
        Ok(SubscriptionId::new(created.id))
    }

    async fn cancel_subscription(&self, subscription_id: &SubscriptionId) -> AppResult<()> {
        let response = self
            .send(
                self.client
                    .delete(self.endpoint(&format!("subscriptions/{subscription_id}"))?),
            )
            .await?;

        self.handle_empty(response).await
    }
}

/// First `errors[].description` of an Asaas error body.
fn error_description(body: &str) -> Option<String> {
    serde_json::from_str::<AsaasErrorResponse>(body)
        .ok()?
        .errors
        .into_iter()
        .find_map(|e| e.description)
}

// ============================================================================
// Asaas API Types
// ============================================================================

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct AsaasCustomerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpf_cnpj: Option<String>,
}

impl From<&CustomerInfo> for AsaasCustomerRequest {
    fn from(info: &CustomerInfo) -> Self {
        Self {
            name: info.name.clone(),
            email: info.email.clone(),
            mobile_phone: info.phone.clone(),
            cpf_cnpj: info.document.clone(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct AsaasSubscriptionRequest {
    customer: String,
    billing_type: &'static str,
    /// Reais, not cents.
    value: f64,
    cycle: &'static str,
    description: String,
    next_due_date: NaiveDate,
}

impl From<&NewSubscription> for AsaasSubscriptionRequest {
    fn from(input: &NewSubscription) -> Self {
        Self {
            customer: input.customer_id.to_string(),
            // Customer picks boleto, PIX or card on the invoice
            billing_type: "UNDEFINED",
            value: input.value_cents as f64 / 100.0,
            cycle: "MONTHLY",
            description: input.description.clone(),
            next_due_date: input.next_due_date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AsaasObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AsaasErrorResponse {
    #[serde(default)]
    errors: Vec<AsaasError>,
}

#[derive(Debug, Deserialize)]
struct AsaasError {
    description: Option<String>,
}

//! Payment provider webhook.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::warn;

use crate::{
    adapters::http::{app_state::AppState, middleware::secrets_match, routes::parse_json},
    app_error::{AppError, AppResult},
    domain::entities::payment_event::PaymentWebhookPayload,
};

/// Headers the provider may carry its access token in.
const TOKEN_HEADERS: [&str; 2] = ["asaas-access-token", "x-asaas-token"];

pub fn router() -> Router<AppState> {
    Router::new().route("/payments", post(handle_payment_webhook))
}

/// POST /api/webhooks/payments
///
/// 2xx acknowledges the delivery, 5xx asks the provider to redeliver.
async fn handle_payment_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    if let Some(expected) = &app_state.config.payment_webhook_token {
        let provided = webhook_token(&headers).ok_or(AppError::Unauthorized)?;
        if !secrets_match(provided, expected.expose_secret()) {
            warn!("Webhook token mismatch");
            return Err(AppError::Unauthorized);
        }
    }

    let payload: PaymentWebhookPayload = parse_json(&body)?;
    let event_type = payload.event.clone();

    let result = app_state
        .payment_webhook_use_cases
        .process(payload, app_state.config.shop_now(), Utc::now().naive_utc())
        .await;

    match result {
        Ok(outcome) => Ok((
            StatusCode::OK,
            Json(json!({ "received": true, "result": outcome })),
        )),
        Err(AppError::UnknownCustomer(customer_id)) => {
            warn!(customer_id = %customer_id, event_type = %event_type, "Webhook for unknown customer");
            Ok((
                StatusCode::OK,
                Json(json!({ "received": true, "result": { "outcome": "unknown_customer" } })),
            ))
        }
        // 500 so the provider redelivers; logged by the error response
        Err(e) if e.is_retryable() => Err(match e {
            AppError::Database(_) | AppError::Internal(_) => e,
            other => AppError::Internal(format!("{event_type}: {other}")),
        }),
        Err(e) => Err(e),
    }
}

fn webhook_token(headers: &HeaderMap) -> Option<&str> {
    TOKEN_HEADERS
        .iter()
        .find_map(|name| headers.get(*name)?.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

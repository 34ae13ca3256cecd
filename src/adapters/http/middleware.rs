use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

use crate::{adapters::http::app_state::AppState, app_error::AppError};

/// Requires `Authorization: Bearer <MASTER_API_KEY>`.
pub async fn master_auth(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    if !secrets_match(provided, app_state.config.master_api_key.expose_secret()) {
        tracing::warn!("Master API key mismatch");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Answers 402 when the shop in the path has a blocked subscription.
///
/// Evaluated on every request: grace periods expire with time, not with events.
pub async fn subscription_gate(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let shop_id = params.get("shop_id").ok_or(AppError::NotFound)?;

    let status = app_state
        .shop_use_cases
        .subscription_status(shop_id, app_state.config.shop_now())
        .await;

    if status.is_blocked {
        tracing::info!(
            shop_id = %shop_id,
            effective_status = %status.effective_status,
            "Subscription blocked"
        );
        return Err(AppError::SubscriptionBlocked);
    }

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Compares SHA-256 digests in constant time so neither the content nor the
/// length of the expected secret leaks through timing.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

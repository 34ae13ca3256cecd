pub mod health;
pub mod master;
pub mod shop;
pub mod webhook;

use axum::{Router, body::Bytes, middleware};
use serde::de::DeserializeOwned;

use crate::{
    adapters::http::{app_state::AppState, middleware::master_auth},
    app_error::{AppError, AppResult},
};

pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/webhooks", webhook::router())
        .nest(
            "/master",
            master::router().route_layer(middleware::from_fn_with_state(
                app_state.clone(),
                master_auth,
            )),
        )
        .nest("/shops", shop::router(app_state))
}

/// Parses a JSON body, answering 400 instead of axum's 422 on bad payloads.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| AppError::InvalidInput(format!("Invalid JSON: {e}")))
}

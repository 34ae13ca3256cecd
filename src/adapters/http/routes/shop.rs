//! Shop-scoped routes used by the barbershop admin.
//!
//! Everything except the subscription probe sits behind the subscription gate.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, middleware::subscription_gate, routes::parse_json},
    app_error::{AppError, AppResult},
    application::use_cases::loyalty::CompletionMode,
};

pub fn router(app_state: AppState) -> Router<AppState> {
    let gated = Router::new()
        .route(
            "/{shop_id}/appointments/{appointment_id}/complete",
            post(complete_appointment),
        )
        .route(
            "/{shop_id}/customers/{customer_id}/loyalty",
            get(loyalty_progress),
        )
        .route("/{shop_id}/revenue", get(revenue_summary))
        .route_layer(middleware::from_fn_with_state(
            app_state,
            subscription_gate,
        ));

    Router::new()
        .route("/{shop_id}/subscription", get(subscription_status))
        .merge(gated)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteAppointmentBody {
    #[serde(default)]
    redeem_free_cut: bool,
    /// Defaults to today in the shop's timezone.
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct RevenueQuery {
    from: NaiveDate,
    to: NaiveDate,
}

/// GET /api/shops/{shop_id}/subscription
async fn subscription_status(
    State(app_state): State<AppState>,
    Path(shop_id): Path<String>,
) -> impl IntoResponse {
    let status = app_state
        .shop_use_cases
        .subscription_status(&shop_id, app_state.config.shop_now())
        .await;
    Json(status)
}

/// POST /api/shops/{shop_id}/appointments/{appointment_id}/complete
async fn complete_appointment(
    State(app_state): State<AppState>,
    Path((shop_id, appointment_id)): Path<(String, Uuid)>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let body: CompleteAppointmentBody = if body.is_empty() {
        CompleteAppointmentBody::default()
    } else {
        parse_json(&body)?
    };
    let date = body.date.unwrap_or_else(|| app_state.config.shop_today());

    let outcome = app_state
        .appointment_use_cases
        .complete_appointment(
            &shop_id,
            appointment_id,
            CompletionMode::from_redeem_flag(body.redeem_free_cut),
            date,
        )
        .await?;

    Ok(Json(outcome))
}

/// GET /api/shops/{shop_id}/customers/{customer_id}/loyalty
async fn loyalty_progress(
    State(app_state): State<AppState>,
    Path((shop_id, customer_id)): Path<(String, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let progress = app_state
        .appointment_use_cases
        .loyalty_progress(&shop_id, customer_id)
        .await?;
    Ok(Json(progress))
}

/// GET /api/shops/{shop_id}/revenue?from=YYYY-MM-DD&to=YYYY-MM-DD
async fn revenue_summary(
    State(app_state): State<AppState>,
    Path(shop_id): Path<String>,
    query: Result<Query<RevenueQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(range) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let summary = app_state
        .appointment_use_cases
        .revenue_summary(&shop_id, range.from, range.to)
        .await?;
    Ok(Json(summary))
}

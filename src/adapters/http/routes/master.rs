//! Master panel: shop provisioning and administration.
//!
//! Mounted behind `master_auth`.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
    adapters::http::{app_state::AppState, routes::parse_json},
    app_error::AppResult,
    application::use_cases::shop::{EditShopInput, ProvisionShopInput},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shops", post(provision_shop))
        .route("/shops/{shop_id}", patch(update_shop).delete(delete_shop))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ShopAction {
    Edit(EditShopInput),
    Suspend,
    Activate,
}

/// POST /api/master/shops
async fn provision_shop(
    State(app_state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let input: ProvisionShopInput = parse_json(&body)?;

    let shop = app_state
        .shop_use_cases
        .provision_shop(input, app_state.config.shop_today())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "shop": shop })),
    ))
}

/// PATCH /api/master/shops/{shop_id}
async fn update_shop(
    State(app_state): State<AppState>,
    Path(shop_id): Path<String>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let action: ShopAction = parse_json(&body)?;
    let now = Utc::now().naive_utc();
    let shops = &app_state.shop_use_cases;

    let shop = match action {
        ShopAction::Edit(input) => shops.edit_shop(&shop_id, input).await?,
        ShopAction::Suspend => shops.suspend_shop(&shop_id, now).await?,
        ShopAction::Activate => shops.activate_shop(&shop_id, now).await?,
    };

    Ok(Json(json!({ "success": true, "shop": shop })))
}

/// DELETE /api/master/shops/{shop_id}
async fn delete_shop(
    State(app_state): State<AppState>,
    Path(shop_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    app_state.shop_use_cases.delete_shop(&shop_id).await?;
    Ok(Json(json!({ "success": true })))
}

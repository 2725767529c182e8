use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

#[derive(Deserialize)]
pub struct DispatchBody {
    pub price: f64,
}

fn error_json(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(json!({ "error": msg.into() }))).into_response()
}

// GET /alerts/:address
pub async fn get_token_alert(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Response {
    match state.token_alerts.find_by_address(&address).await {
        Ok(Some(t)) => (StatusCode::OK, Json(t)).into_response(),
        Ok(None) => error_json(StatusCode::NOT_FOUND, "Token does not exist in alert registry."),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

// POST /alerts/:address/dispatch
pub async fn post_dispatch_alert(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(body): Json<DispatchBody>,
) -> Response {
    if !body.price.is_finite() || body.price < 0.0 {
        return error_json(StatusCode::BAD_REQUEST, "price must be a non-negative number");
    }

    let token_alert = match state.token_alerts.find_by_address(&address).await {
        Ok(t) => t,
        Err(e) => return error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let outcome = state
        .dispatcher
        .dispatch(body.price, &address, token_alert.as_ref())
        .await;

    (StatusCode::OK, Json(outcome)).into_response()
}

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{services::subgraph, AppState};

const ONE_HOUR_SECONDS: i64 = 60 * 60;
const ONE_WEEK_SECONDS: i64 = 7 * 24 * ONE_HOUR_SECONDS;

/// Start of the hour one week before `now`.
pub fn week_ago_hour_start(now: i64) -> i64 {
    let t = now - ONE_WEEK_SECONDS;
    t - t.rem_euclid(ONE_HOUR_SECONDS)
}

fn bad_request(msg: &str) -> Response {
    (StatusCode::BAD_REQUEST, msg.to_string()).into_response()
}

#[derive(Deserialize)]
pub struct FetchTokenDatasBody {
    pub addresses: Option<Vec<String>>,
}

// POST /fetchTokenDatas
pub async fn post_fetch_token_datas(
    State(state): State<AppState>,
    Json(body): Json<FetchTokenDatasBody>,
) -> Response {
    let Some(addresses) = body.addresses else {
        return bad_request("ERROR: invalid addresses");
    };

    let (valid, invalid): (Vec<String>, Vec<String>) = addresses
        .into_iter()
        .partition(|a| subgraph::is_address(a));

    let token_datas = match state.subgraph.fetch_token_datas(&valid).await {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("fetchTokenDatas: {e}");
            return (StatusCode::BAD_GATEWAY, Json(json!({ "error": e }))).into_response();
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "addresses": { "valid": valid, "invalid": invalid },
            "tokenDatas": token_datas,
        })),
    )
        .into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTokenPriceDataBody {
    pub address: Option<String>,
    pub start_time: Option<i64>,
}

// POST /fetchTokenPriceData
pub async fn post_fetch_token_price_data(
    State(state): State<AppState>,
    Json(body): Json<FetchTokenPriceDataBody>,
) -> Response {
    let Some(address) = body.address.filter(|a| subgraph::is_address(a)) else {
        return bad_request("ERROR: invalid address");
    };

    let start = body
        .start_time
        .unwrap_or_else(|| week_ago_hour_start(Utc::now().timestamp()));

    let chart = state.subgraph.fetch_price_chart(&address, start).await;

    match chart.error {
        None => (StatusCode::OK, Json(json!({ "data": chart.data, "error": false }))).into_response(),
        Some(e) => {
            tracing::warn!("fetchTokenPriceData {address}: {e}");
            // rows fetched before the failure are still served
            let status = if chart.data.is_empty() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(json!({ "data": chart.data, "error": true, "message": e })),
            )
                .into_response()
        }
    }
}

const DEFAULT_TRANSACTION_COUNT: u32 = 100;
const MAX_TRANSACTION_COUNT: u32 = 1000;

#[derive(Deserialize)]
pub struct FetchTokenTransactionsBody {
    pub address: Option<String>,
    pub count: Option<u32>,
}

// POST /fetchTokenTransactions
pub async fn post_fetch_token_transactions(
    State(state): State<AppState>,
    Json(body): Json<FetchTokenTransactionsBody>,
) -> Response {
    let Some(address) = body.address.filter(|a| subgraph::is_address(a)) else {
        return bad_request("ERROR: invalid address");
    };

    let count = body
        .count
        .unwrap_or(DEFAULT_TRANSACTION_COUNT)
        .clamp(1, MAX_TRANSACTION_COUNT);

    match state.subgraph.fetch_token_transactions(&address, count).await {
        Ok(data) => (StatusCode::OK, Json(json!({ "data": data, "error": false }))).into_response(),
        Err(e) => {
            tracing::warn!("fetchTokenTransactions {address}: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "data": [], "error": true, "message": e })),
            )
                .into_response()
        }
    }
}

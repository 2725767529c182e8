#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// A local GraphQL endpoint answering each request with `respond(n, body)`,
/// where `n` counts requests from zero.
pub struct FakeSubgraph {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl FakeSubgraph {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(usize, &Value) -> Value + Send + Sync + 'static,
    {
        let hits = Arc::new(AtomicUsize::new(0));
        let respond = Arc::new(respond);

        let counter = hits.clone();
        let app = Router::new().route(
            "/graphql",
            post(move |Json(body): Json<Value>| {
                let counter = counter.clone();
                let respond = respond.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    Json(respond(n, &body))
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/graphql"),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// `n` hourly rows starting at row index `from`.
pub fn hour_rows(from: usize, n: usize) -> Value {
    let rows: Vec<Value> = (from..from + n)
        .map(|i| {
            json!({
                "periodStartUnix": (i as i64) * 3600,
                "high": "2",
                "low": "0.5",
                "open": "1",
                "close": "1.5"
            })
        })
        .collect();
    Value::Array(rows)
}

/// Answers price chart requests with `sizes[n]` rows for the n-th page.
pub fn paged_chart(sizes: Vec<usize>) -> impl Fn(usize, &Value) -> Value + Send + Sync + 'static {
    move |n: usize, body: &Value| {
        let skip = body["variables"]["skip"].as_u64().unwrap_or(0) as usize;
        let size = sizes.get(n).copied().unwrap_or(0);
        json!({ "data": { "tokenHourDatas": hour_rows(skip, size) } })
    }
}

/// Token priced at `derived_eth * eth_usd`.
pub fn priced_token(derived_eth: &str, eth_usd: &str) -> Value {
    json!({
        "data": {
            "token": { "derivedETH": derived_eth },
            "bundle": { "ethPriceUSD": eth_usd }
        }
    })
}

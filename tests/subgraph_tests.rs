mod common;

use serde_json::{json, Value};

use common::{paged_chart, priced_token, FakeSubgraph};
use dexwatch::services::subgraph::{
    SubgraphClient, TransactionType, MAX_PAGES, PAGE_SIZE, WETH_ADDRESS,
};

const UNI: &str = "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984";

#[tokio::test]
async fn price_chart_walks_pages_until_an_empty_one() {
    let graph = FakeSubgraph::start(paged_chart(vec![100, 100, 0])).await;
    let client = SubgraphClient::new(graph.url.clone());

    let chart = client.fetch_price_chart(UNI, 0).await;

    assert!(chart.error.is_none());
    assert_eq!(chart.data.len(), 200);
    assert_eq!(graph.hits(), 3);
    // skip advanced by one page each time, so rows are contiguous
    assert_eq!(chart.data[150].time, 150 * 3600);
    assert_eq!(chart.data[199].time, 199 * 3600);
}

#[tokio::test]
async fn price_chart_stops_on_a_short_page() {
    let graph = FakeSubgraph::start(paged_chart(vec![100, 37])).await;
    let client = SubgraphClient::new(graph.url.clone());

    let chart = client.fetch_price_chart(UNI, 0).await;

    assert!(chart.error.is_none());
    assert_eq!(chart.data.len(), 137);
    assert_eq!(graph.hits(), 2);
}

#[tokio::test]
async fn price_chart_is_capped_when_pages_never_end() {
    let graph = FakeSubgraph::start(paged_chart(vec![PAGE_SIZE; MAX_PAGES + 5])).await;
    let client = SubgraphClient::new(graph.url.clone());

    let chart = client.fetch_price_chart(UNI, 0).await;

    assert_eq!(graph.hits(), MAX_PAGES);
    assert_eq!(chart.data.len(), MAX_PAGES * PAGE_SIZE);
}

#[tokio::test]
async fn price_chart_keeps_rows_fetched_before_an_error() {
    let full = paged_chart(vec![100]);
    let graph = FakeSubgraph::start(move |n: usize, body: &Value| {
        if n == 0 {
            full(n, body)
        } else {
            json!({ "data": null, "errors": [{ "message": "indexing error" }] })
        }
    })
    .await;
    let client = SubgraphClient::new(graph.url.clone());

    let chart = client.fetch_price_chart(UNI, 0).await;

    assert_eq!(chart.data.len(), 100);
    assert!(chart.error.is_some_and(|e| e.contains("indexing error")));
    assert_eq!(graph.hits(), 2);
}

#[tokio::test]
async fn token_price_is_derived_eth_times_eth_usd() {
    let graph = FakeSubgraph::start(|_: usize, body: &Value| {
        assert_eq!(body["variables"]["id"], json!(UNI));
        priced_token("0.004", "2500")
    })
    .await;
    let client = SubgraphClient::new(graph.url.clone());

    let price = client.fetch_token_price(&UNI.to_uppercase().replace("0X", "0x")).await.unwrap();
    assert!((price - 10.0).abs() < 1e-9);
}

#[tokio::test]
async fn unknown_token_has_no_price() {
    let graph = FakeSubgraph::start(|_: usize, _: &Value| {
        json!({ "data": { "token": null, "bundle": { "ethPriceUSD": "2500" } } })
    })
    .await;
    let client = SubgraphClient::new(graph.url.clone());

    let err = client.fetch_token_price(UNI).await.unwrap_err();
    assert!(err.contains("token not found"));
}

#[tokio::test]
async fn token_transactions_are_merged_newest_first() {
    let swap = json!({
        "timestamp": "300",
        "transaction": { "id": "0xswap" },
        "pool": {
            "token0": { "id": WETH_ADDRESS, "symbol": "WETH" },
            "token1": { "id": UNI, "symbol": "UNI" }
        },
        "origin": "0xtrader",
        "amount0": "1",
        "amount1": "-250",
        "amountUSD": "2500"
    });
    let mint = json!({
        "timestamp": "100",
        "transaction": { "id": "0xmint" },
        "pool": {
            "token0": { "id": UNI, "symbol": "UNI" },
            "token1": { "id": "0xdac17f958d2ee523a2206206994597c13d831ec7", "symbol": "USDT" }
        },
        "origin": "0xlp",
        "amount0": "10",
        "amount1": "100",
        "amountUSD": "200"
    });

    let graph = FakeSubgraph::start(move |_: usize, body: &Value| {
        assert_eq!(body["variables"]["count"], json!(25));
        json!({
            "data": {
                "mintsAs0": [mint.clone()], "mintsAs1": [],
                "burnsAs0": [], "burnsAs1": [],
                "swapsAs0": [], "swapsAs1": [swap.clone()]
            }
        })
    })
    .await;
    let client = SubgraphClient::new(graph.url.clone());

    let txs = client.fetch_token_transactions(UNI, 25).await.unwrap();

    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].kind, TransactionType::Swap);
    assert_eq!(txs[0].token0_symbol, "ETH");
    assert_eq!(txs[0].sender, "0xtrader");
    assert_eq!(txs[1].kind, TransactionType::Mint);
    assert_eq!(txs[1].hash, "0xmint");
}

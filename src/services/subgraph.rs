//! Client for the DEX subgraph (The Graph GraphQL endpoint).
//!
//! Only the handful of queries the dashboard needs are implemented; this is
//! not a general GraphQL client.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::Client;
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const PAGE_SIZE: usize = 100;
pub const MAX_PAGES: usize = 20;

/// True for `0x`-prefixed 20-byte hex addresses.
pub fn is_address(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex"))
        .is_match(s)
}

#[derive(Clone)]
pub struct SubgraphClient {
    http: Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(url: String) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, String> {
        if self.url.trim().is_empty() {
            return Err("SUBGRAPH_URL is missing in .env".to_string());
        }

        let res = self
            .http
            .post(&self.url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("subgraph query failed: {status} {body}"));
        }

        let body = res
            .json::<GraphQlResponse<T>>()
            .await
            .map_err(|e| e.to_string())?;
        body.into_result()
    }

    /// Current data for each known token, keyed by lowercase address.
    /// Addresses the subgraph does not index are absent from the map.
    pub async fn fetch_token_datas(
        &self,
        addresses: &[String],
    ) -> Result<HashMap<String, TokenData>, String> {
        if addresses.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<String> = addresses.iter().map(|a| a.to_lowercase()).collect();
        let data: TokensBulk = self.query(TOKENS_BULK, json!({ "ids": ids })).await?;
        Ok(data.into_token_datas())
    }

    /// USD price of a token: its ETH-denominated price times ETH/USD.
    pub async fn fetch_token_price(&self, address: &str) -> Result<f64, String> {
        let data: TokenPrice = self
            .query(TOKEN_PRICE, json!({ "id": address.to_lowercase() }))
            .await?;
        data.price_usd()
            .ok_or_else(|| format!("token not found in subgraph: {address}"))
    }

    /// Hourly candles since `start_time` (unix seconds), oldest first.
    ///
    /// Pages of `PAGE_SIZE` are fetched until a short page or `MAX_PAGES`.
    /// A failing page ends the walk; rows already fetched are kept and the
    /// failure is reported in `PriceChart::error`.
    pub async fn fetch_price_chart(&self, address: &str, start_time: i64) -> PriceChart {
        let address = address.to_lowercase();
        let mut chart = PriceChart::default();
        let mut skip = 0usize;

        for page_no in 0..MAX_PAGES {
            let page: PriceChartPage = match self
                .query(
                    PRICE_CHART,
                    json!({ "address": address, "startTime": start_time, "skip": skip }),
                )
                .await
            {
                Ok(p) => p,
                Err(e) => {
                    chart.error = Some(e);
                    break;
                }
            };

            let n = page.token_hour_datas.len();
            chart
                .data
                .extend(page.token_hour_datas.into_iter().map(PriceChartEntry::from));

            if n < PAGE_SIZE {
                break;
            }
            if page_no + 1 == MAX_PAGES {
                tracing::warn!(token = address.as_str(), "price chart truncated at {MAX_PAGES} pages");
            }
            skip += n;
        }

        chart
    }

    /// Recent mints, burns and swaps touching the token, newest first.
    /// `count` bounds each of the six event lists queried.
    pub async fn fetch_token_transactions(
        &self,
        address: &str,
        count: u32,
    ) -> Result<Vec<Transaction>, String> {
        let data: TransactionsPage = self
            .query(
                token_transactions_query(),
                json!({ "address": address.to_lowercase(), "count": count }),
            )
            .await?;
        Ok(data.into_transactions())
    }
}

pub const WETH_ADDRESS: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";

/// Wrapped ether is shown as ETH.
pub fn format_token_symbol(address: &str, symbol: &str) -> String {
    if address.eq_ignore_ascii_case(WETH_ADDRESS) {
        return "ETH".to_string();
    }
    symbol.to_string()
}

// ---------------- Queries ----------------

const TOKENS_BULK: &str = r#"
    query tokens($ids: [ID!]!) {
        tokens(
            where: { id_in: $ids }
            orderBy: totalValueLockedUSD
            orderDirection: desc
            subgraphError: allow
        ) {
            id
            symbol
            name
            derivedETH
            volumeUSD
            txCount
            feesUSD
            totalValueLockedUSD
        }
        bundles(where: { id: "1" }) {
            ethPriceUSD
        }
    }
"#;

const TOKEN_PRICE: &str = r#"
    query tokenPrice($id: ID!) {
        token(id: $id) {
            derivedETH
        }
        bundle(id: "1") {
            ethPriceUSD
        }
    }
"#;

const PRICE_CHART: &str = r#"
    query tokenHourDatas($startTime: Int!, $skip: Int!, $address: String!) {
        tokenHourDatas(
            first: 100
            skip: $skip
            where: { token: $address, periodStartUnix_gt: $startTime }
            orderBy: periodStartUnix
            orderDirection: asc
        ) {
            periodStartUnix
            high
            low
            open
            close
        }
    }
"#;

const TX_FIELDS: &str = r#"
            timestamp
            transaction { id }
            pool {
                token0 { id symbol }
                token1 { id symbol }
            }
            amount0
            amount1
            amountUSD
"#;

static TOKEN_TRANSACTIONS_QUERY: OnceLock<String> = OnceLock::new();

fn token_transactions_query() -> &'static str {
    TOKEN_TRANSACTIONS_QUERY.get_or_init(|| {
        let list = |alias: &str, entity: &str, side: &str, who: &str| {
            format!(
                "{alias}: {entity}(first: $count, orderBy: timestamp, orderDirection: desc, \
                 where: {{ {side}: $address }}, subgraphError: allow) {{ {who} {TX_FIELDS} }}"
            )
        };
        format!(
            "query transactions($address: String!, $count: Int!) {{ {} {} {} {} {} {} }}",
            list("mintsAs0", "mints", "token0", "origin"),
            list("mintsAs1", "mints", "token1", "origin"),
            list("burnsAs0", "burns", "token0", "owner"),
            list("burnsAs1", "burns", "token1", "owner"),
            list("swapsAs0", "swaps", "token0", "origin"),
            list("swapsAs1", "swaps", "token1", "origin"),
        )
    })
}

// ---------------- Wire types ----------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl<T> GraphQlResponse<T> {
    fn into_result(self) -> Result<T, String> {
        if !self.errors.is_empty() {
            let msgs: Vec<String> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(format!("subgraph error: {}", msgs.join("; ")));
        }
        self.data
            .ok_or_else(|| "subgraph returned no data".to_string())
    }
}

/// The Graph encodes BigDecimal/BigInt as strings.
fn from_decimal_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<T>().map_err(D::Error::custom)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenFields {
    id: String,
    symbol: String,
    name: String,
    #[serde(rename = "derivedETH", deserialize_with = "from_decimal_str")]
    derived_eth: f64,
    #[serde(rename = "volumeUSD", deserialize_with = "from_decimal_str")]
    volume_usd: f64,
    #[serde(deserialize_with = "from_decimal_str")]
    tx_count: u64,
    #[serde(rename = "feesUSD", deserialize_with = "from_decimal_str")]
    fees_usd: f64,
    #[serde(rename = "totalValueLockedUSD", deserialize_with = "from_decimal_str")]
    total_value_locked_usd: f64,
}

#[derive(Debug, Deserialize)]
struct Bundle {
    #[serde(rename = "ethPriceUSD", deserialize_with = "from_decimal_str")]
    eth_price_usd: f64,
}

#[derive(Debug, Deserialize)]
struct TokensBulk {
    tokens: Vec<TokenFields>,
    #[serde(default)]
    bundles: Vec<Bundle>,
}

impl TokensBulk {
    fn into_token_datas(self) -> HashMap<String, TokenData> {
        let eth_price = self.bundles.first().map(|b| b.eth_price_usd).unwrap_or(0.0);

        self.tokens
            .into_iter()
            .map(|t| {
                let data = TokenData {
                    exists: true,
                    name: t.name,
                    symbol: t.symbol,
                    address: t.id.clone(),
                    volume_usd: t.volume_usd,
                    tx_count: t.tx_count,
                    fees_usd: t.fees_usd,
                    tvl_usd: t.total_value_locked_usd,
                    price_usd: t.derived_eth * eth_price,
                };
                (t.id, data)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct DerivedEth {
    #[serde(rename = "derivedETH", deserialize_with = "from_decimal_str")]
    derived_eth: f64,
}

#[derive(Debug, Deserialize)]
struct TokenPrice {
    token: Option<DerivedEth>,
    bundle: Option<Bundle>,
}

impl TokenPrice {
    fn price_usd(&self) -> Option<f64> {
        let token = self.token.as_ref()?;
        let bundle = self.bundle.as_ref()?;
        Some(token.derived_eth * bundle.eth_price_usd)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourData {
    period_start_unix: i64,
    #[serde(deserialize_with = "from_decimal_str")]
    high: f64,
    #[serde(deserialize_with = "from_decimal_str")]
    low: f64,
    #[serde(deserialize_with = "from_decimal_str")]
    open: f64,
    #[serde(deserialize_with = "from_decimal_str")]
    close: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceChartPage {
    token_hour_datas: Vec<HourData>,
}

#[derive(Debug, Deserialize)]
struct TxHash {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TxToken {
    id: String,
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct TxPool {
    token0: TxToken,
    token1: TxToken,
}

/// Shared shape of mint, burn and swap events. Mints and swaps carry
/// `origin`, burns carry `owner`.
#[derive(Debug, Deserialize)]
struct PoolEvent {
    #[serde(deserialize_with = "from_decimal_str")]
    timestamp: i64,
    transaction: TxHash,
    pool: TxPool,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(deserialize_with = "from_decimal_str")]
    amount0: f64,
    #[serde(deserialize_with = "from_decimal_str")]
    amount1: f64,
    #[serde(rename = "amountUSD", deserialize_with = "from_decimal_str")]
    amount_usd: f64,
}

impl PoolEvent {
    fn into_transaction(self, kind: TransactionType) -> Transaction {
        let sender = match kind {
            TransactionType::Burn => self.owner,
            TransactionType::Mint | TransactionType::Swap => self.origin,
        };
        let t0 = self.pool.token0;
        let t1 = self.pool.token1;

        Transaction {
            kind,
            hash: self.transaction.id,
            timestamp: self.timestamp,
            sender: sender.unwrap_or_default(),
            token0_symbol: format_token_symbol(&t0.id, &t0.symbol),
            token1_symbol: format_token_symbol(&t1.id, &t1.symbol),
            token0_address: t0.id,
            token1_address: t1.id,
            amount_usd: self.amount_usd,
            amount_token0: self.amount0,
            amount_token1: self.amount1,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TransactionsPage {
    #[serde(rename = "mintsAs0", default)]
    mints_as0: Vec<PoolEvent>,
    #[serde(rename = "mintsAs1", default)]
    mints_as1: Vec<PoolEvent>,
    #[serde(rename = "burnsAs0", default)]
    burns_as0: Vec<PoolEvent>,
    #[serde(rename = "burnsAs1", default)]
    burns_as1: Vec<PoolEvent>,
    #[serde(rename = "swapsAs0", default)]
    swaps_as0: Vec<PoolEvent>,
    #[serde(rename = "swapsAs1", default)]
    swaps_as1: Vec<PoolEvent>,
}

impl TransactionsPage {
    fn into_transactions(self) -> Vec<Transaction> {
        let groups = [
            (TransactionType::Mint, self.mints_as0),
            (TransactionType::Mint, self.mints_as1),
            (TransactionType::Burn, self.burns_as0),
            (TransactionType::Burn, self.burns_as1),
            (TransactionType::Swap, self.swaps_as0),
            (TransactionType::Swap, self.swaps_as1),
        ];

        let mut out: Vec<Transaction> = groups
            .into_iter()
            .flat_map(|(kind, events)| events.into_iter().map(move |e| e.into_transaction(kind)))
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }
}

// ---------------- Public shapes ----------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    // token is in some pool
    pub exists: bool,
    pub name: String,
    pub symbol: String,
    pub address: String,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: f64,
    pub tx_count: u64,
    #[serde(rename = "feesUSD")]
    pub fees_usd: f64,
    #[serde(rename = "tvlUSD")]
    pub tvl_usd: f64,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Swap,
    Mint,
    Burn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub hash: String,
    pub timestamp: i64,
    pub sender: String,
    pub token0_symbol: String,
    pub token1_symbol: String,
    pub token0_address: String,
    pub token1_address: String,
    #[serde(rename = "amountUSD")]
    pub amount_usd: f64,
    pub amount_token0: f64,
    pub amount_token1: f64,
}

/// Price history plus the error that cut it short, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceChart {
    pub data: Vec<PriceChartEntry>,
    pub error: Option<String>,
}

/// Candlestick entry for price charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChartEntry {
    // unix timestamp
    pub time: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

impl From<HourData> for PriceChartEntry {
    fn from(h: HourData) -> Self {
        Self {
            time: h.period_start_unix,
            open: h.open,
            close: h.close,
            high: h.high,
            low: h.low,
        }
    }
}

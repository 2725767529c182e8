use std::env;

use crate::services::evaluator::BelowComparison;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub subgraph_url: String,

    pub alert_interval_secs: u64,
    pub alert_step_timeout_secs: u64,
    pub below_comparison: BelowComparison,

    pub email_api_url: String,
    pub email_api_key: String,
    pub email_from: String,

    pub telegram_bot_token: String,
    pub telegram_api_base: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Seconds setting that must be at least one.
fn secs_or(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default)
        .max(1)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let below_comparison = match env::var("ALERT_BELOW_COMPARISON") {
        Ok(raw) => raw.parse::<BelowComparison>().unwrap_or_else(|e| {
            tracing::warn!("{e}, falling back to literal comparison");
            BelowComparison::Literal
        }),
        Err(_) => BelowComparison::Literal,
    };

    Settings {
        mongodb_uri: var_or("MONGODB_URI", "mongodb://localhost:27017"),
        mongodb_db: var_or("MONGODB_DB", "dexwatch"),
        host: var_or("HOST", "127.0.0.1"),
        port: parse_or("PORT", 5000),

        subgraph_url: var_or(
            "SUBGRAPH_URL",
            "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3",
        ),

        alert_interval_secs: secs_or(env::var("ALERT_INTERVAL_SECS").ok(), 60),
        alert_step_timeout_secs: secs_or(env::var("ALERT_STEP_TIMEOUT_SECS").ok(), 10),
        below_comparison,

        email_api_url: var_or("EMAIL_API_URL", ""),
        email_api_key: var_or("EMAIL_API_KEY", ""),
        email_from: var_or("EMAIL_FROM", "alerts@dexwatch.local"),

        telegram_bot_token: var_or("TELEGRAM_BOT_TOKEN", ""),
        telegram_api_base: var_or("TELEGRAM_API_BASE", "https://api.telegram.org"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_settings_are_at_least_one() {
        assert_eq!(secs_or(Some("0".into()), 10), 1);
        assert_eq!(secs_or(Some(" 30 ".into()), 10), 30);
        assert_eq!(secs_or(Some("soon".into()), 10), 10);
        assert_eq!(secs_or(None, 60), 60);
    }
}

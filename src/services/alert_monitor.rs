use std::time::Duration;

use tokio::time;

use crate::AppState;

pub fn spawn_price_alert_monitor(state: AppState) {
    let every = Duration::from_secs(state.settings.alert_interval_secs.max(1));

    tokio::spawn(async move {
        let mut interval = time::interval(every);

        loop {
            interval.tick().await;

            if let Err(e) = run_tick(&state).await {
                tracing::error!("[alert-monitor] tick error: {}", e);
            }
        }
    });
}

/// One alert cycle over the whole registry. Returns how many tokens were
/// dispatched.
pub async fn run_tick(state: &AppState) -> Result<usize, String> {
    let registry = state
        .token_alerts
        .list_all()
        .await
        .map_err(|e| e.to_string())?;

    let mut dispatched = 0;

    for token in registry {
        if token.subscribers.is_empty() {
            continue;
        }

        let price = match state.subgraph.fetch_token_price(&token.token_address).await {
            Ok(p) => p,
            Err(e) => {
                // skip this token for this tick
                tracing::warn!(token = token.token_address.as_str(), "price fetch failed: {e}");
                continue;
            }
        };

        if !price.is_finite() || price <= 0.0 {
            continue;
        }

        let outcome = state
            .dispatcher
            .dispatch(price, &token.token_address, Some(&token))
            .await;

        tracing::info!(
            token = token.token_address.as_str(),
            price,
            sent = outcome.alerts_sent_to.len(),
            not_sent = outcome.alerts_not_sent_to.len(),
            failed = outcome.delivery_failures.len(),
            "{}",
            outcome.message
        );
        dispatched += 1;
    }

    Ok(dispatched)
}

//! Threshold evaluation for a single subscriber's watchlist entry.

use std::str::FromStr;

use serde::Serialize;

use crate::models::User;

/// How `below` thresholds are compared against the current price.
///
/// `Literal` keeps the historical `price >= target` check, identical to the
/// `above` list. `Inverted` fires when `price <= target`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BelowComparison {
    #[default]
    Literal,
    Inverted,
}

impl BelowComparison {
    fn hit(self, price: f64, target: f64) -> bool {
        match self {
            BelowComparison::Literal => price >= target,
            BelowComparison::Inverted => price <= target,
        }
    }
}

impl FromStr for BelowComparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(BelowComparison::Literal),
            "inverted" => Ok(BelowComparison::Inverted),
            other => Err(format!("unknown below comparison: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DecisionReason {
    Reached,
    NoWatchlistEntry,
    NoThresholds,
    ThresholdsNotMet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDecision {
    pub should_alert: bool,
    pub error: bool,
    pub message: String,
    #[serde(skip)]
    pub reason: DecisionReason,
}

impl AlertDecision {
    fn reached() -> Self {
        Self {
            should_alert: true,
            error: false,
            message: "Should alert user.".to_string(),
            reason: DecisionReason::Reached,
        }
    }

    fn skipped(reason: DecisionReason, message: String) -> Self {
        Self {
            should_alert: false,
            error: true,
            message,
            reason,
        }
    }
}

/// Decides whether `user` should be alerted about `token_address` trading at
/// `current_price`. Any `above` target at or under the price fires; `below`
/// targets are compared per `below`.
pub fn should_alert_user(
    token_address: &str,
    current_price: f64,
    user: &User,
    below: BelowComparison,
) -> AlertDecision {
    let Some(entry) = user.watchlist_entry(token_address) else {
        return AlertDecision::skipped(
            DecisionReason::NoWatchlistEntry,
            "token not in watchlist".to_string(),
        );
    };

    let alerts = &entry.price_alerts;
    if alerts.above.is_empty() && alerts.below.is_empty() {
        return AlertDecision::skipped(
            DecisionReason::NoThresholds,
            format!("Token is not in {}'s watchlist.", user.google_id),
        );
    }

    if alerts.above.iter().any(|&target| current_price >= target) {
        return AlertDecision::reached();
    }

    // TODO: confirm with product whether `below` should default to Inverted;
    // until then Literal keeps existing subscribers' alerts unchanged.
    if alerts.below.iter().any(|&target| below.hit(current_price, target)) {
        return AlertDecision::reached();
    }

    AlertDecision::skipped(
        DecisionReason::ThresholdsNotMet,
        "Price targets not reached.".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotifyBy, PriceAlerts, WatchlistEntry};

    const TOKEN: &str = "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984";

    fn user_with(above: Vec<f64>, below: Vec<f64>) -> User {
        User {
            id: None,
            google_id: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            telegram_chat_id: None,
            token_watchlist: vec![WatchlistEntry {
                token_address: TOKEN.to_string(),
                price_alerts: PriceAlerts { above, below },
            }],
            notify_by: NotifyBy { email: true, telegram: false },
        }
    }

    #[test]
    fn above_target_reached_fires() {
        let user = user_with(vec![100.0], vec![]);
        let d = should_alert_user(TOKEN, 105.0, &user, BelowComparison::Literal);
        assert!(d.should_alert);
        assert!(!d.error);
        assert_eq!(d.message, "Should alert user.");
        assert_eq!(d.reason, DecisionReason::Reached);
    }

    #[test]
    fn above_target_equal_to_price_fires() {
        let user = user_with(vec![120.0, 100.0], vec![]);
        let d = should_alert_user(TOKEN, 100.0, &user, BelowComparison::Literal);
        assert!(d.should_alert);
    }

    #[test]
    fn literal_below_does_not_fire_when_price_drops_under_target() {
        let user = user_with(vec![100.0], vec![60.0]);
        let d = should_alert_user(TOKEN, 50.0, &user, BelowComparison::Literal);
        assert!(!d.should_alert);
        assert!(d.error);
        assert_eq!(d.message, "Price targets not reached.");
        assert_eq!(d.reason, DecisionReason::ThresholdsNotMet);
    }

    #[test]
    fn literal_below_fires_when_price_is_over_target() {
        let user = user_with(vec![], vec![60.0]);
        let d = should_alert_user(TOKEN, 70.0, &user, BelowComparison::Literal);
        assert!(d.should_alert);
    }

    #[test]
    fn inverted_below_fires_when_price_drops_under_target() {
        let user = user_with(vec![100.0], vec![60.0]);
        let d = should_alert_user(TOKEN, 50.0, &user, BelowComparison::Inverted);
        assert!(d.should_alert);

        let d = should_alert_user(TOKEN, 70.0, &user, BelowComparison::Inverted);
        assert!(!d.should_alert);
    }

    #[test]
    fn empty_thresholds_report_not_in_watchlist() {
        let user = user_with(vec![], vec![]);
        let d = should_alert_user(TOKEN, 1.0, &user, BelowComparison::Literal);
        assert!(!d.should_alert);
        assert!(d.error);
        assert_eq!(d.message, "Token is not in alice's watchlist.");
        assert_eq!(d.reason, DecisionReason::NoThresholds);
    }

    #[test]
    fn missing_entry_is_reported_without_panicking() {
        let user = user_with(vec![1.0], vec![]);
        let d = should_alert_user("0xdead", 10.0, &user, BelowComparison::Literal);
        assert!(!d.should_alert);
        assert!(d.error);
        assert_eq!(d.message, "token not in watchlist");
        assert_eq!(d.reason, DecisionReason::NoWatchlistEntry);
    }

    #[test]
    fn lookup_ignores_address_case() {
        let user = user_with(vec![1.0], vec![]);
        let d = should_alert_user(&TOKEN.to_uppercase(), 2.0, &user, BelowComparison::Literal);
        assert!(d.should_alert);
    }

    #[test]
    fn nan_price_never_fires() {
        let user = user_with(vec![1.0], vec![1.0]);
        for policy in [BelowComparison::Literal, BelowComparison::Inverted] {
            let d = should_alert_user(TOKEN, f64::NAN, &user, policy);
            assert!(!d.should_alert);
        }
    }

    #[test]
    fn same_inputs_give_same_decision() {
        let user = user_with(vec![100.0], vec![60.0]);
        let a = should_alert_user(TOKEN, 80.0, &user, BelowComparison::Literal);
        let b = should_alert_user(TOKEN, 80.0, &user, BelowComparison::Literal);
        assert_eq!(a, b);
    }

    #[test]
    fn parses_below_comparison() {
        assert_eq!("Literal".parse::<BelowComparison>(), Ok(BelowComparison::Literal));
        assert_eq!(" inverted ".parse::<BelowComparison>(), Ok(BelowComparison::Inverted));
        assert!("sideways".parse::<BelowComparison>().is_err());
    }
}

use std::fmt;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceAlerts {
    #[serde(default)]
    pub above: Vec<f64>,
    #[serde(default)]
    pub below: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub token_address: String,

    #[serde(default)]
    pub price_alerts: PriceAlerts,
}

/// Notification channels a user can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Telegram,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Telegram => "telegram",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyBy {
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub telegram: bool,
}

impl NotifyBy {
    pub fn enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::Telegram => self.telegram,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub google_id: String,

    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,

    #[serde(default)]
    pub token_watchlist: Vec<WatchlistEntry>,

    #[serde(default)]
    pub notify_by: NotifyBy,
}

impl User {
    /// Watchlist entry for `token_address`, compared case-insensitively
    /// since hex addresses come both checksummed and lowercased.
    pub fn watchlist_entry(&self, token_address: &str) -> Option<&WatchlistEntry> {
        self.token_watchlist
            .iter()
            .find(|e| e.token_address.eq_ignore_ascii_case(token_address))
    }
}

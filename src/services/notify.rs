use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::Settings;
use crate::errors::NotifyError;
use crate::models::{Channel, TokenAlert, User};

/// A notification transport for one channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> Channel;

    async fn notify(&self, user: &User, token: &TokenAlert, price: f64) -> Result<(), NotifyError>;
}

pub fn alert_subject(token: &TokenAlert) -> String {
    format!("{} price alert", token.token_symbol)
}

pub fn alert_text(token: &TokenAlert, price: f64) -> String {
    format!(
        "{} ({}) reached your price target.\nCurrent price: ${:.6}\nToken: {}",
        token.token_symbol, token.token_name, price, token.token_address
    )
}

async fn check_response(res: reqwest::Response, what: &str) -> Result<(), NotifyError> {
    if res.status().is_success() {
        return Ok(());
    }

    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    Err(NotifyError::Transport(format!("{what} failed: {status} {body}")))
}

// ---------------- Email ----------------

/// Sends mail through an HTTP mail API that accepts a JSON message.
#[derive(Clone)]
pub struct EmailNotifier {
    http: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl EmailNotifier {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            http: Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn notify(&self, user: &User, token: &TokenAlert, price: f64) -> Result<(), NotifyError> {
        let to = user
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| NotifyError::MissingContact {
                user: user.google_id.clone(),
                contact: "email address",
            })?;

        let res = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": alert_subject(token),
                "text": alert_text(token, price),
            }))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        check_response(res, "email send").await
    }
}

// ---------------- Telegram ----------------

#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    api_base: String,
    bot_token: String,
}

impl TelegramNotifier {
    pub fn new(api_base: String, bot_token: String) -> Self {
        Self {
            http: Client::new(),
            api_base,
            bot_token,
        }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel(&self) -> Channel {
        Channel::Telegram
    }

    async fn notify(&self, user: &User, token: &TokenAlert, price: f64) -> Result<(), NotifyError> {
        let chat_id = user
            .telegram_chat_id
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| NotifyError::MissingContact {
                user: user.google_id.clone(),
                contact: "telegram chat id",
            })?;

        let res = self
            .http
            .post(self.send_message_url())
            .json(&json!({
                "chat_id": chat_id,
                "text": alert_text(token, price),
            }))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        check_response(res, "telegram sendMessage").await
    }
}

/// Transports with credentials present in `settings`, email first.
pub fn configured_notifiers(settings: &Settings) -> Vec<Arc<dyn Notifier>> {
    let mut out: Vec<Arc<dyn Notifier>> = Vec::new();

    if !settings.email_api_url.trim().is_empty() {
        out.push(Arc::new(EmailNotifier::new(
            settings.email_api_url.clone(),
            settings.email_api_key.clone(),
            settings.email_from.clone(),
        )));
    } else {
        tracing::warn!("EMAIL_API_URL is missing, email alerts disabled");
    }

    if !settings.telegram_bot_token.trim().is_empty() {
        out.push(Arc::new(TelegramNotifier::new(
            settings.telegram_api_base.clone(),
            settings.telegram_bot_token.clone(),
        )));
    } else {
        tracing::warn!("TELEGRAM_BOT_TOKEN is missing, telegram alerts disabled");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotifyBy;

    fn token() -> TokenAlert {
        TokenAlert {
            id: None,
            token_symbol: "UNI".into(),
            token_name: "Uniswap".into(),
            token_address: "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984".into(),
            subscribers: vec![],
        }
    }

    fn bare_user() -> User {
        User {
            id: None,
            google_id: "bob".into(),
            email: None,
            telegram_chat_id: Some("  ".into()),
            token_watchlist: vec![],
            notify_by: NotifyBy { email: true, telegram: true },
        }
    }

    #[test]
    fn alert_text_names_token_and_price() {
        let text = alert_text(&token(), 5.25);
        assert!(text.starts_with("UNI (Uniswap)"));
        assert!(text.contains("$5.250000"));
        assert!(text.contains("0x1f9840a85d5af5bf1d1762f925bdaddc4201f984"));
        assert_eq!(alert_subject(&token()), "UNI price alert");
    }

    #[test]
    fn telegram_url_joins_base_and_token() {
        let n = TelegramNotifier::new("https://api.telegram.org/".into(), "123:abc".into());
        assert_eq!(n.send_message_url(), "https://api.telegram.org/bot123:abc/sendMessage");
    }

    #[tokio::test]
    async fn missing_contacts_fail_before_any_request() {
        let email = EmailNotifier::new("http://127.0.0.1:9/mail".into(), String::new(), "x@y".into());
        let err = email.notify(&bare_user(), &token(), 1.0).await.unwrap_err();
        assert!(matches!(err, NotifyError::MissingContact { contact: "email address", .. }));

        let tg = TelegramNotifier::new("http://127.0.0.1:9".into(), "t".into());
        let err = tg.notify(&bare_user(), &token(), 1.0).await.unwrap_err();
        assert!(matches!(err, NotifyError::MissingContact { contact: "telegram chat id", .. }));
    }
}

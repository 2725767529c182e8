//! Fans a token's price out to every subscriber whose targets are reached.
//!
//! Subscribers are processed one at a time in registry order, so the order of
//! notifications (and of the report) is deterministic. Each user lookup and
//! each send is bounded by `step_timeout`; a slow or failing subscriber is
//! recorded and the run moves on.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::errors::{DispatchError, NotifyError};
use crate::models::{AlertOutcome, AlertSent, DeliveryFailure, TokenAlert, User};

use super::evaluator::{should_alert_user, BelowComparison};
use super::notify::Notifier;
use super::repository::UserRepository;

pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AlertDispatcher {
    users: Arc<dyn UserRepository>,
    notifiers: Vec<Arc<dyn Notifier>>,
    below: BelowComparison,
    step_timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            notifiers: Vec::new(),
            below: BelowComparison::default(),
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn with_notifiers(mut self, notifiers: impl IntoIterator<Item = Arc<dyn Notifier>>) -> Self {
        self.notifiers.extend(notifiers);
        self
    }

    pub fn with_below_comparison(mut self, below: BelowComparison) -> Self {
        self.below = below;
        self
    }

    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    pub async fn dispatch(
        &self,
        price: f64,
        token_address: &str,
        token_alert: Option<&TokenAlert>,
    ) -> AlertOutcome {
        let Some(token_alert) = token_alert else {
            tracing::warn!(token = token_address, "dispatch for unregistered token");
            return AlertOutcome::failed(DispatchError::SubscriptionNotFound.to_string());
        };

        if token_alert.subscribers.is_empty() {
            return AlertOutcome::failed(
                DispatchError::NoSubscribers(token_address.to_string()).to_string(),
            );
        }

        let mut outcome = AlertOutcome::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for subscriber in &token_alert.subscribers {
            if !seen.insert(subscriber.as_str()) {
                continue;
            }

            let user = match self.lookup(subscriber).await {
                Ok(u) => u,
                Err(e) => {
                    tracing::warn!(token = token_address, "{e}");
                    outcome.alerts_not_sent_to.push(subscriber.clone());
                    continue;
                }
            };

            let decision = should_alert_user(token_address, price, &user, self.below);
            if !decision.should_alert {
                tracing::debug!(
                    token = token_address,
                    subscriber = subscriber.as_str(),
                    "{}",
                    decision.message
                );
                outcome.alerts_not_sent_to.push(subscriber.clone());
                continue;
            }

            let mut attempted = false;
            for notifier in &self.notifiers {
                let channel = notifier.channel();
                if !user.notify_by.enabled(channel) {
                    continue;
                }
                attempted = true;

                if let Err(e) = self.send(notifier.as_ref(), &user, token_alert, price).await {
                    tracing::warn!(
                        token = token_address,
                        subscriber = subscriber.as_str(),
                        channel = channel.as_str(),
                        "alert not delivered: {e}"
                    );
                    outcome.delivery_failures.push(DeliveryFailure {
                        name: subscriber.clone(),
                        by: channel,
                        reason: e.to_string(),
                    });
                }

                outcome.alerts_sent_to.push(AlertSent {
                    name: subscriber.clone(),
                    by: channel,
                });
            }

            if !attempted {
                tracing::debug!(
                    subscriber = subscriber.as_str(),
                    "targets reached but no enabled channel has a transport"
                );
                outcome.alerts_not_sent_to.push(subscriber.clone());
            }
        }

        outcome.message = "dispatch complete".to_string();
        outcome
    }

    async fn lookup(&self, google_id: &str) -> Result<User, DispatchError> {
        match timeout(self.step_timeout, self.users.find_by_google_id(google_id)).await {
            Err(_) => Err(DispatchError::LookupTimeout(google_id.to_string())),
            Ok(Err(source)) => Err(DispatchError::SubscriberLookupFailure {
                id: google_id.to_string(),
                source,
            }),
            Ok(Ok(None)) => Err(DispatchError::SubscriberNotFound(google_id.to_string())),
            Ok(Ok(Some(user))) => Ok(user),
        }
    }

    async fn send(
        &self,
        notifier: &dyn Notifier,
        user: &User,
        token_alert: &TokenAlert,
        price: f64,
    ) -> Result<(), NotifyError> {
        timeout(self.step_timeout, notifier.notify(user, token_alert, price))
            .await
            .unwrap_or(Err(NotifyError::Timeout(self.step_timeout)))
    }
}

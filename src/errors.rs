//! Error types for the alert core.

use std::time::Duration;

use thiserror::Error;

/// Document store failures.
#[derive(Error, Debug, Clone)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(String),
}

/// Notification transport failures.
#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("user {user} has no {contact} configured")]
    MissingContact { user: String, contact: &'static str },

    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// Dispatch failures. The first two end a dispatch run, the rest are
/// recorded per subscriber.
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    #[error("Token does not exist in alert registry.")]
    SubscriptionNotFound,

    #[error("There are no subscribers for the token: {0}.")]
    NoSubscribers(String),

    #[error("subscriber not found: {0}")]
    SubscriberNotFound(String),

    #[error("lookup of subscriber {id} failed: {source}")]
    SubscriberLookupFailure {
        id: String,
        #[source]
        source: RepositoryError,
    },

    #[error("lookup of subscriber {0} timed out")]
    LookupTimeout(String),
}

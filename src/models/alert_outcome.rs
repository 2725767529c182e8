use serde::Serialize;

use super::Channel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSent {
    pub name: String,
    pub by: Channel,
}

/// A send that was attempted but did not complete. The subscriber is still
/// listed in `alerts_sent_to`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryFailure {
    pub name: String,
    pub by: Channel,
    pub reason: String,
}

/// Report of one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertOutcome {
    pub error: bool,
    pub alerts_sent_to: Vec<AlertSent>,
    pub alerts_not_sent_to: Vec<String>,
    pub delivery_failures: Vec<DeliveryFailure>,
    pub message: String,
}

impl AlertOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            ..Self::default()
        }
    }
}

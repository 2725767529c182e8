use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One token's alert registry: who is subscribed to price alerts for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAlert {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub token_symbol: String,
    pub token_name: String,
    pub token_address: String,

    // googleId of each subscribed user
    #[serde(default)]
    pub subscribers: Vec<String>,
}

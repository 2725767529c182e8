use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::errors::RepositoryError;
use crate::models::{TokenAlert, User};

pub const USERS: &str = "users";
pub const TOKEN_ALERTS: &str = "tokenalerts";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait TokenAlertRepository: Send + Sync {
    async fn find_by_address(&self, token_address: &str) -> Result<Option<TokenAlert>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<TokenAlert>, RepositoryError>;
}

fn db_err(e: mongodb::error::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

// ---------------- MongoDB ----------------

#[derive(Clone)]
pub struct MongoUserRepository {
    users: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection::<User>(USERS),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        self.users
            .find_one(doc! { "googleId": google_id }, None)
            .await
            .map_err(db_err)
    }
}

#[derive(Clone)]
pub struct MongoTokenAlertRepository {
    token_alerts: Collection<TokenAlert>,
}

impl MongoTokenAlertRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            token_alerts: db.collection::<TokenAlert>(TOKEN_ALERTS),
        }
    }
}

#[async_trait]
impl TokenAlertRepository for MongoTokenAlertRepository {
    async fn find_by_address(&self, token_address: &str) -> Result<Option<TokenAlert>, RepositoryError> {
        // addresses are stored as entered; match regardless of checksum casing
        let pattern = format!("^{}$", regex::escape(token_address));
        self.token_alerts
            .find_one(
                doc! { "tokenAddress": { "$regex": pattern, "$options": "i" } },
                None,
            )
            .await
            .map_err(db_err)
    }

    async fn list_all(&self) -> Result<Vec<TokenAlert>, RepositoryError> {
        let mut cursor = self.token_alerts.find(doc! {}, None).await.map_err(db_err)?;

        let mut items = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res.map_err(db_err)?);
        }

        Ok(items)
    }
}

// ---------------- In-memory ----------------

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.google_id.clone(), u)).collect()),
        }
    }

    pub fn insert(&self, user: User) -> Result<(), RepositoryError> {
        let mut map = self
            .users
            .write()
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        map.insert(user.google_id.clone(), user);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        let map = self
            .users
            .read()
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(map.get(google_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryTokenAlertRepository {
    token_alerts: RwLock<Vec<TokenAlert>>,
}

impl InMemoryTokenAlertRepository {
    pub fn new(token_alerts: impl IntoIterator<Item = TokenAlert>) -> Self {
        Self {
            token_alerts: RwLock::new(token_alerts.into_iter().collect()),
        }
    }
}

#[async_trait]
impl TokenAlertRepository for InMemoryTokenAlertRepository {
    async fn find_by_address(&self, token_address: &str) -> Result<Option<TokenAlert>, RepositoryError> {
        let items = self
            .token_alerts
            .read()
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(items
            .iter()
            .find(|t| t.token_address.eq_ignore_ascii_case(token_address))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<TokenAlert>, RepositoryError> {
        let items = self
            .token_alerts
            .read()
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(items.clone())
    }
}

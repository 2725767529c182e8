//! Library entrypoint for dexwatch.
//!
//! Integration tests under `tests/` import the app state, routers and
//! controllers from here.

use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod models;

pub mod services;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub settings: config::Settings,
    pub subgraph: services::subgraph::SubgraphClient,
    pub token_alerts: Arc<dyn services::repository::TokenAlertRepository>,
    pub dispatcher: Arc<services::dispatcher::AlertDispatcher>,
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mongodb::Client;

use dexwatch::{
    config, routes,
    services::{
        alert_monitor, db_init,
        dispatcher::AlertDispatcher,
        notify,
        repository::{MongoTokenAlertRepository, MongoUserRepository},
        subgraph::SubgraphClient,
    },
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri).await?;
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!("could not ensure indexes: {e}");
    }

    let dispatcher = AlertDispatcher::new(Arc::new(MongoUserRepository::new(&db)))
        .with_notifiers(notify::configured_notifiers(&settings))
        .with_below_comparison(settings.below_comparison)
        .with_step_timeout(Duration::from_secs(settings.alert_step_timeout_secs));

    let state = AppState {
        subgraph: SubgraphClient::new(settings.subgraph_url.clone()),
        token_alerts: Arc::new(MongoTokenAlertRepository::new(&db)),
        dispatcher: Arc::new(dispatcher),
        db,
        settings: settings.clone(),
    };

    alert_monitor::spawn_price_alert_monitor(state.clone());

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::{AppState, controllers::home_controller};

pub mod home_routes;
pub mod tokens_routes;
pub mod alerts_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = tokens_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);

    router
        .fallback(home_controller::not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

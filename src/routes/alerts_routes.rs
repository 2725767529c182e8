use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::alerts_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/alerts/:address", get(alerts_controller::get_token_alert))
        .route("/alerts/:address/dispatch", post(alerts_controller::post_dispatch_alert))
}

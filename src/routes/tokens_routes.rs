use axum::{Router, routing::post};
use crate::{AppState, controllers::tokens_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/fetchTokenDatas", post(tokens_controller::post_fetch_token_datas))
        .route("/fetchTokenPriceData", post(tokens_controller::post_fetch_token_price_data))
        .route("/fetchTokenTransactions", post(tokens_controller::post_fetch_token_transactions))
}

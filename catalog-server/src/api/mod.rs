//! API routes for catalog-server

pub mod goods;
pub mod health;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let goods = Router::new()
        .route("/api/goods", get(goods::query_goods).post(goods::create_good))
        .route("/api/goods/all", get(goods::list_all))
        .route("/api/goods/autocomplete", get(goods::autocomplete))
        .route("/api/goods/price-stats", get(goods::price_stats))
        .route(
            "/api/goods/{id}",
            get(goods::get_good).patch(goods::update_good),
        )
        .route("/api/goods/{id}/status", put(goods::update_status))
        .route("/api/goods/{id}/users", post(goods::link_user));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(goods)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

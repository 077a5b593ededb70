//! HTTP surface: the move endpoints, the engine API and the web client.

mod assets;
mod engine_move;
mod game;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::post;
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use assets::cross_origin_isolation;

/// Build the application router.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.dev_origin.clone())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .route("/get_move", post(engine_move::get_move))
        .layer(cors);

    Router::new()
        .route("/move", post(game::make_move))
        .route("/new_game", post(game::new_game))
        .nest("/api", api)
        .fallback_service(assets::web_client(&state.static_dir))
        .layer(middleware::from_fn(cross_origin_isolation))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Create file server routes
pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::serve))
        .route("/*path", get(handlers::serve))
}

/// Build the complete application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(file_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

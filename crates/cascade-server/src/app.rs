//! Router construction.
//!
//! Two routes cover the whole URL surface: the site root for the
//! query-string form and a wildcard for the pretty-permalink form. The
//! path parser decides what is actually a document request; everything
//! else is a pass-through.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::query_document))
        .route("/{*path}", get(handlers::path_document))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

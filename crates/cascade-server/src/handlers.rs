//! HTTP request handlers.
//!
//! Thin adapters between axum and the pure resolver: extract the path
//! or query parameters, parse them into a [`RequestedDocument`], run
//! [`resolve`] and map the outcome onto a response. Served documents go
//! out with deterministic headers: the family content type,
//! `Last-Modified` set to the serving time and `Cache-Control:
//! no-cache` (the persisted index, not the HTTP layer, is the cache).

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::resolver::{self, RouteOutcome, RouterContext, ServedDocument};
use crate::routes::{self, RequestedDocument};
use crate::state::AppState;

/// Handle GET / (query-string form).
pub(crate) async fn query_document(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(&state, routes::parse_query(&params))
}

/// Handle GET /{*path} (pretty-permalink form).
pub(crate) async fn path_document(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    respond(&state, routes::parse_path(&path, &state.config))
}

fn respond(state: &AppState, request: Option<RequestedDocument>) -> Response {
    let Some(request) = request else {
        return pass_through();
    };

    let ctx = RouterContext {
        store: state.store.as_ref(),
        kv: state.kv.as_ref(),
        config: &state.config,
        links: &state.links,
    };

    match resolver::resolve(&ctx, &request) {
        Ok(RouteOutcome::Served(document)) => served(&document),
        Ok(RouteOutcome::Redirect(location)) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
        Ok(RouteOutcome::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Ok(RouteOutcome::PassThrough) => pass_through(),
        Err(error) => {
            tracing::error!(%error, "content store failed while serving document");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn served(document: &ServedDocument) -> Response {
    let last_modified = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    (
        [
            (header::CONTENT_TYPE, document.content_type.to_owned()),
            (header::LAST_MODIFIED, last_modified),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        document.body.clone(),
    )
        .into_response()
}

/// Not a document URL: in a host CMS this falls through to normal
/// content handling; standalone it is a plain 404.
fn pass_through() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

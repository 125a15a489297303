//! HTTP request routing for cascade documents.
//!
//! This crate is the request-facing edge of the engine. The interesting
//! part is pure: [`routes::parse_path`]/[`routes::parse_query`] turn an
//! inbound URL into a [`routes::RequestedDocument`], and
//! [`resolver::resolve`] walks it through the routing state machine
//!
//! ```text
//! Received → SlugResolved → IDValidated → NumberValidated → Served
//!                 │              │               │
//!                 ▼              ▼               ▼
//!            PassThrough      NotFound    Redirect | NotFound
//! ```
//!
//! returning a [`resolver::RouteOutcome`] that tests assert on without
//! any exception-shaped control flow. A thin axum layer maps outcomes to
//! HTTP responses (200 with deterministic headers, 301 with `Location`,
//! 404) and a failing store to a 5xx.
//!
//! # Embedding
//!
//! This is a library. Hosts that already run an HTTP server call the
//! parse/resolve pair directly; [`run_server`] is provided for
//! standalone deployments.
//!
//! ```ignore
//! use std::sync::Arc;
//! use cascade_config::Config;
//! use cascade_server::{ServerConfig, run_server};
//! use cascade_store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new());
//!     let server = ServerConfig::default();
//!     run_server(server, Config::default(), store).await.unwrap();
//! }
//! ```

mod app;
mod handlers;
pub mod resolver;
pub mod routes;
mod state;

pub use resolver::{RouteOutcome, RouterContext, ServedDocument, resolve};
pub use routes::{DocId, RequestedDocument, parse_path, parse_query};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use cascade_config::{Config, Permalinks};
use cascade_kv::{FileKv, Kv, MemoryKv};
use cascade_store::ContentStore;

use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory for the persisted index/metrics store (`None` keeps
    /// everything in memory).
    pub cache_dir: Option<PathBuf>,
    /// Application version; a mismatch wipes the persisted store.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            cache_dir: None,
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the server fails to bind or start.
pub async fn run_server(
    server: ServerConfig,
    config: Config,
    store: Arc<dyn ContentStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let kv: Arc<dyn Kv> = match &server.cache_dir {
        Some(dir) => Arc::new(FileKv::new(dir.clone(), &server.version)),
        None => Arc::new(MemoryKv::new()),
    };

    let links = Permalinks::new(&config);
    let state = Arc::new(AppState {
        store,
        kv,
        config,
        links,
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", server.host, server.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

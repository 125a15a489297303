//! Application state.
//!
//! Shared state for all request handlers: the store handle, the KV
//! persistence, the configuration and the URL generator travel together
//! in one struct behind an `Arc`.

use std::sync::Arc;

use cascade_config::{Config, Permalinks};
use cascade_kv::Kv;
use cascade_store::ContentStore;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Content datastore.
    pub(crate) store: Arc<dyn ContentStore>,
    /// Index and metrics persistence.
    pub(crate) kv: Arc<dyn Kv>,
    /// Configuration.
    pub(crate) config: Config,
    /// Canonical URL generator.
    pub(crate) links: Permalinks,
}

//! Content datastore interface for cascade.
//!
//! This crate defines the [`ContentStore`] trait, the query surface the
//! indexing engine and the document builders run against, together with
//! the row types those queries return. The datastore itself is a host
//! concern: any queryable relational store can sit behind the trait as
//! long as its aggregate counts and its `LIMIT`/`OFFSET` slices agree
//! 1:1 (an off-by-one between the two breaks the pagination contract).
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-memory relational store with builder-style setup,
//!   used by tests and by embedding hosts that load content up front.
//!
//! # Filtering model
//!
//! Exclusion is applied at query time, never by post-filtering:
//! unpublished, password-protected and ghost items never reach a result
//! set, and per-family exclusions are part of every query. Taxonomy and
//! author counts are counts of distinct terms/authors with at least one
//! qualifying published item, not raw rows.

mod memory;
mod store;
mod types;

pub use memory::MemoryStore;
pub use store::{
    AuthorQuery, ContentStore, ItemCountQuery, ItemOrder, ItemQuery, StoreError, TermCountQuery,
    TermQuery,
};
pub use types::{
    AuthorRow, ContentItem, ContentStatus, Family, MediaItem, MediaKind, TermRow, TypeCount,
};

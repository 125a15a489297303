//! The [`ContentStore`] trait and its query/error types.

use chrono::Duration;
use thiserror::Error;

use crate::types::{AuthorRow, ContentItem, Family, MediaItem, MediaKind, TermRow, TypeCount};

/// Error raised by a content-store backend.
///
/// Only genuine backend failures surface as errors; an empty result set
/// is an `Ok` with no rows. A failing aggregate query aborts an index
/// build before anything is persisted, so the next request retries the
/// full build.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying store could not be reached or the query failed
    /// mid-flight. Maps to a 5xx at the request layer.
    #[error("content store unavailable: {0}")]
    Unavailable(String),
    /// The query itself was malformed (e.g. an empty type list where one
    /// is required).
    #[error("malformed store query: {0}")]
    Query(String),
}

/// Sort order for item slice queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemOrder {
    /// Most recently modified first. Document ranks in sitemap indexes
    /// are defined over this order.
    #[default]
    ModifiedDesc,
    /// Most recently published first (news documents).
    PublishedDesc,
    /// Title ascending, ties by id. Hyper-list ranks are defined over
    /// this order.
    TitleAsc,
}

/// Aggregate count query over content items, grouped by content type.
#[derive(Debug, Clone)]
pub struct ItemCountQuery {
    /// Content types to count. Types absent from this list produce no
    /// row at all (they are not counted as zero).
    pub content_types: Vec<String>,
    /// Family whose exclusion rules apply.
    pub family: Family,
    /// Only count items published within this trailing window.
    pub news_window: Option<Duration>,
    /// Force this type's row first regardless of recency (used to pin
    /// the page-like type when a static front page is displayed).
    pub first_type: Option<String>,
}

/// Aggregate count query over taxonomy terms, grouped by taxonomy.
///
/// Counts distinct terms with at least one qualifying published item.
#[derive(Debug, Clone)]
pub struct TermCountQuery {
    /// Taxonomies to count.
    pub taxonomies: Vec<String>,
    /// Term ids excluded from every generated document.
    pub excluded_term_ids: Vec<u64>,
}

/// Slice query for content items, `LIMIT`/`OFFSET` semantics.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    /// Single content type to fetch.
    pub content_type: String,
    /// Family whose exclusion rules apply.
    pub family: Family,
    /// Only fetch items published within this trailing window.
    pub news_window: Option<Duration>,
    /// Sort order; ranks are 1-based positions within this order.
    pub order: ItemOrder,
    /// Maximum number of rows.
    pub limit: u64,
    /// Rows to skip.
    pub offset: u64,
}

/// Slice query for taxonomy terms of one taxonomy.
#[derive(Debug, Clone)]
pub struct TermQuery {
    /// Taxonomy to fetch.
    pub taxonomy: String,
    /// Term ids excluded from every generated document.
    pub excluded_term_ids: Vec<u64>,
    /// Maximum number of rows.
    pub limit: u64,
    /// Rows to skip.
    pub offset: u64,
}

/// Slice query for author archives.
#[derive(Debug, Clone)]
pub struct AuthorQuery {
    /// Author nicenames excluded from every generated document.
    pub excluded_nicenames: Vec<String>,
    /// Maximum number of rows.
    pub limit: u64,
    /// Rows to skip.
    pub offset: u64,
}

/// Query surface of the content datastore.
///
/// Implementations MUST keep aggregate counts and slice queries
/// consistent: for any filter, the count returned by the aggregate query
/// equals the number of rows the corresponding slice query yields across
/// all offsets, in a stable order. The index builders rely on this 1:1
/// correspondence.
pub trait ContentStore: Send + Sync {
    /// Count qualifying items per content type.
    ///
    /// Rows are ordered most-recently-modified first, except that
    /// `first_type` (when set and present) is pinned to the front.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn count_items(&self, query: &ItemCountQuery) -> Result<Vec<TypeCount>, StoreError>;

    /// Count distinct qualifying terms per taxonomy, ordered
    /// most-recently-modified first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn count_terms(&self, query: &TermCountQuery) -> Result<Vec<TypeCount>, StoreError>;

    /// Count distinct authors with at least one published post.
    ///
    /// Returns `None` when no author qualifies (no row, not a zero row).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn count_authors(&self, excluded_nicenames: &[String])
    -> Result<Option<TypeCount>, StoreError>;

    /// Count qualifying items with at least one attachment of `kind`.
    ///
    /// Returns `None` when no item qualifies.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn count_media_parents(
        &self,
        kind: MediaKind,
        content_types: &[String],
    ) -> Result<Option<TypeCount>, StoreError>;

    /// Fetch a slice of qualifying items.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn items(&self, query: &ItemQuery) -> Result<Vec<ContentItem>, StoreError>;

    /// Fetch a single item by id, regardless of qualification.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn item(&self, id: u64) -> Result<Option<ContentItem>, StoreError>;

    /// Fetch a slice of qualifying terms, most recently modified first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn terms(&self, query: &TermQuery) -> Result<Vec<TermRow>, StoreError>;

    /// Fetch the terms of `taxonomy` assigned to one item, in term-id
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn item_terms(&self, item_id: u64, taxonomy: &str) -> Result<Vec<TermRow>, StoreError>;

    /// Fetch a single author by id, regardless of qualification.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn author(&self, id: u64) -> Result<Option<AuthorRow>, StoreError>;

    /// Fetch a slice of qualifying authors, latest post first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn authors(&self, query: &AuthorQuery) -> Result<Vec<AuthorRow>, StoreError>;

    /// Fetch a slice of qualifying items that own at least one
    /// attachment of `kind`, most recently modified first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn media_parents(
        &self,
        kind: MediaKind,
        content_types: &[String],
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ContentItem>, StoreError>;

    /// Fetch attachments of `kind` for the given parents.
    ///
    /// At most the 1000 most recently modified attachments per parent
    /// are returned; older ones are dropped by the query.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend cannot be
    /// queried.
    fn media_for_parents(
        &self,
        kind: MediaKind,
        parent_ids: &[u64],
    ) -> Result<Vec<MediaItem>, StoreError>;
}

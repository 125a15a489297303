//! Document builders for cascade.
//!
//! Given a resolved index entry (a content type plus an item range),
//! each builder queries the content store for exactly that slice and
//! serializes it into its output format:
//!
//! - [`SitemapBuilder`]: general XML sitemap documents
//! - [`NewsmapBuilder`]: Google News sitemap documents
//! - [`MediaSitemapBuilder`]: image and video sitemap documents
//! - [`index_doc`]: the `<sitemapindex>` document
//! - [`stylesheet`]: the companion XSLT stylesheet documents
//! - [`SiteTreeBuilder`]: in-page HTML hyper-lists
//!
//! Every build runs between start/stop counter hooks: the returned
//! [`BuiltDocument`] carries the serialized body together with wall-clock
//! time, query count and item count for the metrics layer. An empty
//! result set yields the static wrapper markup, never an error; the only
//! error a builder can surface is a failing store.

pub mod index_doc;
pub mod media;
pub mod metrics;
pub mod newsmap;
pub mod site_tree;
pub mod sitemap;
pub mod stylesheet;
pub mod text;
pub mod xml;

pub use media::MediaSitemapBuilder;
pub use metrics::{BuildMetrics, FamilyMetrics};
pub use newsmap::NewsmapBuilder;
pub use site_tree::SiteTreeBuilder;
pub use sitemap::SitemapBuilder;

use cascade_config::{Config, Permalinks};
use cascade_store::ContentStore;

/// Shared collaborators handed to every builder.
///
/// An explicit context in place of ambient global state: the store
/// handle, the configuration and the canonical URL generator travel
/// together by reference.
pub struct BuilderContext<'a> {
    /// Content datastore.
    pub store: &'a dyn ContentStore,
    /// Configuration.
    pub config: &'a Config,
    /// Canonical URL generator.
    pub links: &'a Permalinks,
}

/// A resolved document request: which slice of which type to serialize.
#[derive(Debug, Clone)]
pub struct DocumentRequest {
    /// Content-type id the document covers.
    pub doc_id: String,
    /// Requested document number; 0 and 1 both mean the first document.
    pub number: u32,
    /// Items per document for this family.
    pub capacity: u32,
}

impl DocumentRequest {
    /// Maximum number of items this document may hold.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.capacity)
    }

    /// Rank offset of the document's first item.
    #[must_use]
    pub fn offset(&self) -> u64 {
        if self.number > 1 {
            u64::from(self.number - 1) * u64::from(self.capacity)
        } else {
            0
        }
    }
}

/// A serialized document plus its build metrics.
#[derive(Debug, Clone)]
pub struct BuiltDocument {
    /// The full document body.
    pub body: String,
    /// Counters recorded while building.
    pub metrics: BuildMetrics,
}

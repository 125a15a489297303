//! The `<sitemapindex>` document.
//!
//! When a family's index spans more than one document, the bare
//! canonical URL serves this document instead: one `<sitemap>` member
//! per indexed document, in index order, each pointing at the member's
//! canonical URL.

use cascade_index::SitemapIndex;
use cascade_store::{Family, StoreError};

use crate::metrics::Counters;
use crate::xml::XmlDocument;
use crate::{BuilderContext, BuiltDocument};

/// Serialize the index document of `family`.
///
/// # Errors
///
/// Never fails today; the `Result` keeps the builder contract uniform
/// for the request layer.
pub fn build(
    ctx: &BuilderContext<'_>,
    family: Family,
    index: &SitemapIndex,
) -> Result<BuiltDocument, StoreError> {
    let mut counters = Counters::start();
    let stylesheet = ctx.links.stylesheet(family, Some("index"));
    let mut doc = XmlDocument::sitemapindex(&stylesheet);

    for (content_type, documents) in index.entries() {
        for number in 1..=documents {
            counters.record_item();
            doc.sitemap_ref(&ctx.links.document(family, Some(content_type), number));
        }
    }

    Ok(BuiltDocument {
        body: doc.finish(),
        metrics: counters.stop(),
    })
}

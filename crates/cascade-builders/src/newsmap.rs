//! The Google News sitemap builder.
//!
//! News documents only carry items published within the trailing
//! two-day window (UTC, measured at query time), each wrapped in a
//! `<news:news>` block with the publisher name and language. The
//! language code is validated against the Google News pattern at
//! construction; anything else falls back to the default.

use std::sync::OnceLock;

use regex::Regex;

use cascade_store::{ContentStore, Family, ItemOrder, ItemQuery, StoreError};

use crate::metrics::Counters;
use crate::text;
use crate::xml::{NEWS_NS, XmlDocument, w3c_datetime};
use crate::{BuilderContext, BuiltDocument, DocumentRequest};

/// Language used when the configured code fails validation.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Maximum characters of a `<news:title>`.
const TITLE_MAX_CHARS: usize = 70;

fn language_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z]{2}-?[a-z]{1,2}$").unwrap())
}

/// Builder for news sitemap documents.
pub struct NewsmapBuilder<'a> {
    ctx: &'a BuilderContext<'a>,
    counters: Counters,
    publication_name: String,
    publication_language: String,
}

impl<'a> NewsmapBuilder<'a> {
    /// Create a builder over the shared context, validating the
    /// configured publication language.
    #[must_use]
    pub fn new(ctx: &'a BuilderContext<'a>) -> Self {
        let configured = ctx.config.newsmap.publication_language.trim();
        let publication_language = if language_pattern().is_match(configured) {
            configured.to_owned()
        } else {
            tracing::debug!(configured, "invalid publication language, using default");
            DEFAULT_LANGUAGE.to_owned()
        };

        Self {
            ctx,
            counters: Counters::start(),
            publication_name: text::prepare(&ctx.config.newsmap.publication_name, TITLE_MAX_CHARS),
            publication_language,
        }
    }

    /// Build the document for `request`.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the slice query.
    pub fn build(mut self, request: &DocumentRequest) -> Result<BuiltDocument, StoreError> {
        let stylesheet = self.ctx.links.stylesheet(Family::Newsmap, None);
        let mut doc = XmlDocument::urlset(&stylesheet, &[("news", NEWS_NS)]);

        self.counters.record_query();
        let items = self.ctx.store.items(&ItemQuery {
            content_type: request.doc_id.clone(),
            family: Family::Newsmap,
            news_window: Some(chrono::Duration::days(cascade_index::counter::NEWS_WINDOW_DAYS)),
            order: ItemOrder::PublishedDesc,
            limit: request.limit(),
            offset: request.offset(),
        })?;

        for item in &items {
            self.counters.record_item();
            doc.open_element("url");
            doc.text_element("loc", &self.ctx.links.item(&item.content_type, &item.slug));
            doc.open_element("news:news");
            doc.open_element("news:publication");
            doc.text_element("news:name", &self.publication_name);
            doc.text_element("news:language", &self.publication_language);
            doc.close_element("news:publication");
            doc.text_element("news:title", &text::prepare(&item.title, TITLE_MAX_CHARS));
            doc.text_element("news:publication_date", &w3c_datetime(item.published_at));
            doc.close_element("news:news");
            doc.close_element("url");
        }

        Ok(BuiltDocument {
            body: doc.finish(),
            metrics: self.counters.stop(),
        })
    }
}

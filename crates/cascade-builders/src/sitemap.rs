//! The general XML sitemap builder.
//!
//! Serializes one document of the sitemap family: a slice of posts,
//! taxonomy terms or author archives, depending on what the requested
//! content-type id classifies as. The first page document is special:
//! the home page URL is emitted first (ahead of any stored row), the
//! "page for posts" second, and both are removed from the main
//! iteration so they never appear twice.
//!
//! A row's `<lastmod>` is its modification time, unless a matching
//! page template file on disk is newer, in which case the template's
//! mtime wins.

use std::path::Path;

use chrono::{DateTime, Utc};

use cascade_config::ContentFamily;
use cascade_store::{
    AuthorQuery, ContentItem, ContentStore, Family, ItemOrder, ItemQuery, StoreError, TermQuery,
};

use crate::metrics::Counters;
use crate::xml::XmlDocument;
use crate::{BuilderContext, BuiltDocument, DocumentRequest};

/// Builder for general sitemap documents.
pub struct SitemapBuilder<'a> {
    ctx: &'a BuilderContext<'a>,
    counters: Counters,
}

impl<'a> SitemapBuilder<'a> {
    /// Create a builder over the shared context.
    #[must_use]
    pub fn new(ctx: &'a BuilderContext<'a>) -> Self {
        Self {
            ctx,
            counters: Counters::start(),
        }
    }

    /// Build the document for `request`.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from slice queries.
    pub fn build(mut self, request: &DocumentRequest) -> Result<BuiltDocument, StoreError> {
        let stylesheet = self.ctx.links.stylesheet(Family::Sitemap, None);
        let mut doc = XmlDocument::urlset(&stylesheet, &[]);

        match self.ctx.config.content_family(&request.doc_id) {
            Some(ContentFamily::Taxonomy) => self.build_term_urls(&mut doc, request)?,
            Some(ContentFamily::Author) => self.build_author_urls(&mut doc, request)?,
            _ => self.build_item_urls(&mut doc, request)?,
        }

        Ok(BuiltDocument {
            body: doc.finish(),
            metrics: self.counters.stop(),
        })
    }

    fn build_item_urls(
        &mut self,
        doc: &mut XmlDocument,
        request: &DocumentRequest,
    ) -> Result<(), StoreError> {
        self.counters.record_query();
        let mut items = self.ctx.store.items(&ItemQuery {
            content_type: request.doc_id.clone(),
            family: Family::Sitemap,
            news_window: None,
            order: ItemOrder::ModifiedDesc,
            limit: request.limit(),
            offset: request.offset(),
        })?;

        // The home page and the page for posts lead the first page
        // document; pull them out of the slice so they appear once.
        if request.doc_id == "page" && request.number <= 1 {
            self.build_home_url(doc, &mut items)?;
            self.build_posts_page_url(doc, &mut items);
        }

        for item in &items {
            let lastmod = if item.content_type == "page" {
                self.page_template_lastmod(item)
            } else {
                item.modified_at
            };
            self.url(doc, &self.ctx.links.item(&item.content_type, &item.slug), Some(lastmod));
        }

        Ok(())
    }

    /// Emit the home page URL ahead of everything else.
    fn build_home_url(
        &mut self,
        doc: &mut XmlDocument,
        items: &mut Vec<ContentItem>,
    ) -> Result<(), StoreError> {
        if let Some(front_id) = self.ctx.config.site.page_on_front {
            let front = match items.iter().position(|item| item.id == front_id) {
                Some(position) => Some(items.remove(position)),
                None => {
                    self.counters.record_query();
                    self.ctx.store.item(front_id)?
                }
            };
            let lastmod = front.map(|item| {
                self.template_lastmod(&["front-page.html".to_owned()], item.modified_at)
            });
            self.url(doc, &self.ctx.links.home(), lastmod);
            return Ok(());
        }

        // No static front page: the home URL is the blog index, last
        // modified with the latest post.
        self.counters.record_query();
        let latest = self.ctx.store.items(&ItemQuery {
            content_type: "post".to_owned(),
            family: Family::Sitemap,
            news_window: None,
            order: ItemOrder::ModifiedDesc,
            limit: 1,
            offset: 0,
        })?;
        self.url(
            doc,
            &self.ctx.links.home(),
            latest.first().map(|item| item.modified_at),
        );
        Ok(())
    }

    /// Emit the page that lists posts, when it is part of this slice.
    fn build_posts_page_url(&mut self, doc: &mut XmlDocument, items: &mut Vec<ContentItem>) {
        let Some(posts_page_id) = self.ctx.config.site.page_for_posts else {
            return;
        };
        if let Some(position) = items.iter().position(|item| item.id == posts_page_id) {
            let page = items.remove(position);
            self.url(
                doc,
                &self.ctx.links.item(&page.content_type, &page.slug),
                Some(page.modified_at),
            );
        }
    }

    fn build_term_urls(
        &mut self,
        doc: &mut XmlDocument,
        request: &DocumentRequest,
    ) -> Result<(), StoreError> {
        self.counters.record_query();
        let terms = self.ctx.store.terms(&TermQuery {
            taxonomy: request.doc_id.clone(),
            excluded_term_ids: self
                .ctx
                .config
                .excluded_term_ids(&request.doc_id, Family::Sitemap),
            limit: request.limit(),
            offset: request.offset(),
        })?;

        for term in &terms {
            self.url(
                doc,
                &self.ctx.links.term(&term.taxonomy, &term.slug),
                Some(term.last_modified),
            );
        }
        Ok(())
    }

    fn build_author_urls(
        &mut self,
        doc: &mut XmlDocument,
        request: &DocumentRequest,
    ) -> Result<(), StoreError> {
        self.counters.record_query();
        let authors = self.ctx.store.authors(&AuthorQuery {
            excluded_nicenames: self
                .ctx
                .config
                .excluded_authors(Family::Sitemap)
                .to_vec(),
            limit: request.limit(),
            offset: request.offset(),
        })?;

        for author in &authors {
            self.url(
                doc,
                &self.ctx.links.author(&author.nicename),
                Some(author.last_modified),
            );
        }
        Ok(())
    }

    fn url(&mut self, doc: &mut XmlDocument, loc: &str, lastmod: Option<DateTime<Utc>>) {
        self.counters.record_item();
        doc.url(loc, lastmod);
    }

    /// The template probe for a regular page row.
    fn page_template_lastmod(&self, item: &ContentItem) -> DateTime<Utc> {
        let candidates = [
            format!("page-{}.html", item.slug),
            format!("page-{}.html", item.id),
        ];
        self.template_lastmod(&candidates, item.modified_at)
    }

    /// Return the newer of `default` and the mtime of the first
    /// existing template file.
    fn template_lastmod(&self, names: &[String], default: DateTime<Utc>) -> DateTime<Utc> {
        let Some(dir) = self.ctx.config.site.template_dir.as_deref() else {
            return default;
        };
        for name in names {
            if let Some(mtime) = file_mtime(&dir.join(name)) {
                if mtime > default {
                    return mtime;
                }
                return default;
            }
        }
        default
    }
}

fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

//! The image and video sitemap builder.
//!
//! One builder serves both media kinds. Attachments are grouped under
//! the content item they belong to: each `<url>` is a parent item's
//! permalink followed by one extension block per attachment. The store
//! caps attachments at the 1000 most recent per parent; older ones are
//! already gone by the time rows arrive here.

use std::collections::HashMap;

use cascade_store::{ContentStore, Family, MediaItem, MediaKind, StoreError};

use crate::metrics::Counters;
use crate::text;
use crate::xml::{IMAGE_NS, VIDEO_NS, XmlDocument};
use crate::{BuilderContext, BuiltDocument, DocumentRequest};

/// Maximum characters of image/video titles.
const TITLE_MAX_CHARS: usize = 70;

/// Maximum characters of an `<image:caption>`.
const CAPTION_MAX_CHARS: usize = 160;

/// Maximum characters of a `<video:description>`.
const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Builder for image and video sitemap documents.
pub struct MediaSitemapBuilder<'a> {
    ctx: &'a BuilderContext<'a>,
    kind: MediaKind,
    counters: Counters,
    media_emitted: u32,
}

impl<'a> MediaSitemapBuilder<'a> {
    /// Create a builder for `kind` over the shared context.
    #[must_use]
    pub fn new(ctx: &'a BuilderContext<'a>, kind: MediaKind) -> Self {
        Self {
            ctx,
            kind,
            counters: Counters::start(),
            media_emitted: 0,
        }
    }

    /// Build the document for `request`.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the slice queries.
    pub fn build(mut self, request: &DocumentRequest) -> Result<BuiltDocument, StoreError> {
        let variant = self.kind.slug();
        let stylesheet = self.ctx.links.stylesheet(Family::Sitemap, Some(variant));
        let namespace = match self.kind {
            MediaKind::Image => ("image", IMAGE_NS),
            MediaKind::Video => ("video", VIDEO_NS),
        };
        let mut doc = XmlDocument::urlset(&stylesheet, &[namespace]);

        let post_types = self.ctx.config.included_post_types(Family::Sitemap);

        self.counters.record_query();
        let parents = self.ctx.store.media_parents(
            self.kind,
            &post_types,
            request.limit(),
            request.offset(),
        )?;

        if !parents.is_empty() {
            let parent_ids: Vec<u64> = parents.iter().map(|item| item.id).collect();
            self.counters.record_query();
            let media = self.ctx.store.media_for_parents(self.kind, &parent_ids)?;

            let mut by_parent: HashMap<u64, Vec<&MediaItem>> = HashMap::new();
            for item in &media {
                by_parent.entry(item.parent).or_default().push(item);
            }

            for parent in &parents {
                self.counters.record_item();
                doc.open_element("url");
                doc.text_element(
                    "loc",
                    &self.ctx.links.item(&parent.content_type, &parent.slug),
                );
                for media_item in by_parent.get(&parent.id).into_iter().flatten() {
                    match self.kind {
                        MediaKind::Image => self.image_block(&mut doc, media_item),
                        MediaKind::Video => self.video_block(&mut doc, media_item),
                    }
                    self.media_emitted += 1;
                }
                doc.close_element("url");
            }
        }

        tracing::debug!(kind = variant, media = self.media_emitted, "media sitemap built");

        Ok(BuiltDocument {
            body: doc.finish(),
            metrics: self.counters.stop(),
        })
    }

    fn image_block(&self, doc: &mut XmlDocument, media: &MediaItem) {
        doc.open_element("image:image");
        doc.text_element("image:loc", &media.url);
        let title = text::prepare(&media.title, TITLE_MAX_CHARS);
        if !title.is_empty() {
            doc.text_element("image:title", &title);
        }
        let caption = text::prepare(&media.caption, CAPTION_MAX_CHARS);
        if !caption.is_empty() {
            doc.text_element("image:caption", &caption);
        }
        doc.close_element("image:image");
    }

    fn video_block(&self, doc: &mut XmlDocument, media: &MediaItem) {
        doc.open_element("video:video");
        if let Some(thumbnail) = self.thumbnail_for(media) {
            doc.text_element("video:thumbnail_loc", &thumbnail);
        }
        doc.text_element("video:title", &text::prepare(&media.title, TITLE_MAX_CHARS));
        doc.text_element(
            "video:description",
            &text::prepare(&media.caption, DESCRIPTION_MAX_CHARS),
        );
        doc.text_element("video:content_loc", &media.url);
        doc.close_element("video:video");
    }

    /// The attachment's own thumbnail, or the configured placeholder.
    fn thumbnail_for(&self, media: &MediaItem) -> Option<String> {
        media
            .thumbnail_url
            .clone()
            .or_else(|| self.ctx.config.sitemap.placeholder_thumbnail.clone())
    }
}

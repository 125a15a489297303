//! Row types returned by [`ContentStore`](crate::ContentStore) queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document family: a top-level grouping of served documents sharing an
/// index and a capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// General XML sitemaps, including the image/video variants.
    Sitemap,
    /// Google News sitemaps.
    Newsmap,
    /// In-page "site tree" hyper-lists.
    SiteTree,
}

impl Family {
    /// Stable identifier used in persistence keys, query strings and URLs.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Sitemap => "sitemap",
            Self::Newsmap => "newsmap",
            Self::SiteTree => "site_tree",
        }
    }

    /// Parse a family from its slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "sitemap" => Some(Self::Sitemap),
            "newsmap" => Some(Self::Newsmap),
            "site_tree" => Some(Self::SiteTree),
            _ => None,
        }
    }
}

/// Publication status of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStatus {
    /// Publicly visible.
    Published,
    /// Not yet published.
    Draft,
    /// Removed from the site but still stored.
    Trashed,
}

/// A single content row (a post, page or custom-type entry).
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Store-assigned identifier.
    pub id: u64,
    /// URL slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Content type identifier (e.g. "post", "page", "recipe").
    pub content_type: String,
    /// Publication status.
    pub status: ContentStatus,
    /// True when reading requires a password; such items never appear in
    /// generated documents.
    pub password_protected: bool,
    /// Parent item for hierarchical types.
    pub parent: Option<u64>,
    /// Authoring user.
    pub author: Option<u64>,
    /// Editorial topic used to group pages in hyper-lists.
    pub topic: Option<String>,
    /// Sticky items are promoted to the top of hyper-lists.
    pub sticky: bool,
    /// Ghost content is globally excluded from every generated document.
    pub ghost: bool,
    /// Families this item is explicitly excluded from.
    pub excluded_from: Vec<Family>,
    /// First publication time (UTC).
    pub published_at: DateTime<Utc>,
    /// Last modification time (UTC).
    pub modified_at: DateTime<Utc>,
}

impl ContentItem {
    /// Create a published item with the given identity and modification
    /// time. The remaining fields start at their neutral values and can
    /// be adjusted with the builder-style setters.
    #[must_use]
    pub fn new(
        id: u64,
        slug: impl Into<String>,
        content_type: impl Into<String>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        let slug = slug.into();
        Self {
            id,
            title: slug.clone(),
            slug,
            content_type: content_type.into(),
            status: ContentStatus::Published,
            password_protected: false,
            parent: None,
            author: None,
            topic: None,
            sticky: false,
            ghost: false,
            excluded_from: Vec::new(),
            published_at: modified_at,
            modified_at,
        }
    }

    /// Set the display title.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the publication status.
    #[must_use]
    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the first publication time.
    #[must_use]
    pub fn published(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Set the parent item.
    #[must_use]
    pub fn child_of(mut self, parent: u64) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the authoring user.
    #[must_use]
    pub fn by_author(mut self, author: u64) -> Self {
        self.author = Some(author);
        self
    }

    /// Set the grouping topic.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Mark the item sticky.
    #[must_use]
    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    /// Mark the item as ghost content.
    #[must_use]
    pub fn ghost(mut self) -> Self {
        self.ghost = true;
        self
    }

    /// Mark the item password-protected.
    #[must_use]
    pub fn password_protected(mut self) -> Self {
        self.password_protected = true;
        self
    }

    /// Exclude the item from documents of `family`.
    #[must_use]
    pub fn excluded_from(mut self, family: Family) -> Self {
        self.excluded_from.push(family);
        self
    }

    /// Whether the item may appear in documents of `family`.
    #[must_use]
    pub fn qualifies_for(&self, family: Family) -> bool {
        self.status == ContentStatus::Published
            && !self.password_protected
            && !self.ghost
            && !self.excluded_from.contains(&family)
    }
}

/// A taxonomy term row joined with the last modification time of its
/// most recently modified qualifying item.
#[derive(Debug, Clone)]
pub struct TermRow {
    /// Store-assigned identifier.
    pub id: u64,
    /// URL slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Owning taxonomy identifier (e.g. "category", "post_tag").
    pub taxonomy: String,
    /// Parent term for hierarchical taxonomies.
    pub parent: Option<u64>,
    /// `MAX(modified_at)` over the term's published items.
    pub last_modified: DateTime<Utc>,
}

/// An author row joined with the modification time of their latest post.
#[derive(Debug, Clone)]
pub struct AuthorRow {
    /// Store-assigned identifier.
    pub id: u64,
    /// URL-safe author name.
    pub nicename: String,
    /// Display name.
    pub display_name: String,
    /// `MAX(modified_at)` over the author's published posts.
    pub last_modified: DateTime<Utc>,
}

/// Kind of an attached media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Still images.
    Image,
    /// Video files or embeds.
    Video,
}

impl MediaKind {
    /// Stable identifier used in index keys and URLs.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// A media attachment row.
#[derive(Debug, Clone)]
pub struct MediaItem {
    /// Store-assigned identifier.
    pub id: u64,
    /// Content item this media is attached to.
    pub parent: u64,
    /// Media kind.
    pub kind: MediaKind,
    /// Public URL of the media file.
    pub url: String,
    /// Title, may be empty.
    pub title: String,
    /// Caption or description, may be empty.
    pub caption: String,
    /// Thumbnail URL, when one is derivable.
    pub thumbnail_url: Option<String>,
    /// Last modification time (UTC).
    pub modified_at: DateTime<Utc>,
}

/// One aggregate-count row: `(content_type, count, last_modified)`.
///
/// Produced fresh per index build and discarded once folded into an
/// index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCount {
    /// Counted content type (a post type, a taxonomy, "authors", or a
    /// media kind).
    pub content_type: String,
    /// Number of qualifying rows.
    pub count: u64,
    /// `MAX(modified_at)` over the counted rows, when tracked.
    pub last_modified: Option<DateTime<Utc>>,
}

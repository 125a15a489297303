//! Configuration for cascade.
//!
//! Parses `cascade.toml` configuration with serde and exposes the
//! accessors the indexing engine and the builders consult: content-type
//! inclusion per family, per-document capacities, the site-tree
//! pagination threshold, and exclusion lists.
//!
//! Misconfigured numeric values never fail a request: a capacity or
//! threshold of zero or less silently falls back to the compiled-in
//! default, logged once at read time.

mod urls;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use cascade_store::{Family, MediaKind};

pub use urls::Permalinks;

/// Compiled-in maximum number of items a single sitemap document may
/// contain.
pub const DEFAULT_CAPACITY: u32 = 1000;

/// Compiled-in site-tree items-per-page threshold.
pub const DEFAULT_PAGE_THRESHOLD: u32 = 100;

/// Error raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which query path serves a content-type id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentFamily {
    /// A post type (post, page, custom type).
    Post,
    /// A taxonomy.
    Taxonomy,
    /// The "authors" pseudo-type.
    Author,
    /// A media kind ("image" or "video").
    Media(MediaKind),
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,
    /// General sitemap family.
    pub sitemap: SitemapConfig,
    /// News sitemap family.
    pub newsmap: NewsmapConfig,
    /// In-page site-tree family.
    pub site_tree: SiteTreeConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Whether documents of `family` are served at all.
    #[must_use]
    pub fn is_family_active(&self, family: Family) -> bool {
        match family {
            Family::Sitemap => self.sitemap.enabled,
            Family::Newsmap => self.newsmap.enabled,
            Family::SiteTree => self.site_tree.enabled,
        }
    }

    /// Whether `content_type` is included in documents of `family`.
    #[must_use]
    pub fn is_content_type_included(&self, content_type: &str, family: Family) -> bool {
        match family {
            Family::Sitemap => {
                self.sitemap.content_types.iter().any(|t| t == content_type)
                    || self.sitemap.taxonomies.iter().any(|t| t == content_type)
                    || (content_type == "authors" && self.sitemap.include_authors)
            }
            Family::Newsmap => self.newsmap.content_types.iter().any(|t| t == content_type),
            Family::SiteTree => self
                .site_tree
                .content_types
                .iter()
                .any(|t| t.id == content_type),
        }
    }

    /// Post types included in `family`, in registration order.
    #[must_use]
    pub fn included_post_types(&self, family: Family) -> Vec<String> {
        self.site
            .content_types
            .iter()
            .filter(|ty| self.is_content_type_included(ty, family))
            .cloned()
            .collect()
    }

    /// Taxonomies included in the sitemap family, in registration order.
    #[must_use]
    pub fn included_taxonomies(&self) -> Vec<String> {
        self.site
            .taxonomies
            .iter()
            .filter(|tax| self.sitemap.taxonomies.iter().any(|t| t == *tax))
            .cloned()
            .collect()
    }

    /// Items-per-document capacity for `family`, falling back to
    /// [`DEFAULT_CAPACITY`] when configured as zero or negative.
    #[must_use]
    pub fn capacity(&self, family: Family) -> u32 {
        let configured = match family {
            Family::Sitemap => self.sitemap.capacity,
            Family::Newsmap => self.newsmap.capacity,
            Family::SiteTree => i64::from(self.page_threshold()),
        };
        match u32::try_from(configured) {
            Ok(capacity) if capacity > 0 => capacity,
            _ => {
                tracing::debug!(
                    family = family.slug(),
                    configured,
                    "invalid capacity, using default"
                );
                DEFAULT_CAPACITY
            }
        }
    }

    /// Site-tree items-per-page threshold, falling back to
    /// [`DEFAULT_PAGE_THRESHOLD`] when configured as zero or negative.
    #[must_use]
    pub fn page_threshold(&self) -> u32 {
        match u32::try_from(self.site_tree.threshold) {
            Ok(threshold) if threshold > 0 => threshold,
            _ => {
                tracing::debug!(
                    configured = self.site_tree.threshold,
                    "invalid site-tree threshold, using default"
                );
                DEFAULT_PAGE_THRESHOLD
            }
        }
    }

    /// Classify a requested content-type id into the query path that
    /// serves it, or `None` for ids that name nothing registered.
    #[must_use]
    pub fn content_family(&self, id: &str) -> Option<ContentFamily> {
        match id {
            "image" => Some(ContentFamily::Media(MediaKind::Image)),
            "video" => Some(ContentFamily::Media(MediaKind::Video)),
            "authors" => Some(ContentFamily::Author),
            _ if self.site.content_types.iter().any(|t| t == id) => Some(ContentFamily::Post),
            _ if self.site.taxonomies.iter().any(|t| t == id) => Some(ContentFamily::Taxonomy),
            _ => None,
        }
    }

    /// Term ids excluded from documents of `family` for `taxonomy`.
    #[must_use]
    pub fn excluded_term_ids(&self, taxonomy: &str, family: Family) -> Vec<u64> {
        let map = match family {
            Family::Sitemap | Family::Newsmap => &self.sitemap.excluded_terms,
            Family::SiteTree => &self.site_tree.excluded_terms,
        };
        map.get(taxonomy).cloned().unwrap_or_default()
    }

    /// Author nicenames excluded from documents of `family`.
    #[must_use]
    pub fn excluded_authors(&self, family: Family) -> &[String] {
        match family {
            Family::Sitemap | Family::Newsmap => &self.sitemap.excluded_authors,
            Family::SiteTree => &self.site_tree.excluded_authors,
        }
    }
}

/// Site-wide settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root URL, no trailing slash (e.g. `https://example.com`).
    pub base_url: String,
    /// Whether pretty permalinks (`/{type}-sitemap.xml`) are active; when
    /// false, documents are addressed with the query-string form.
    pub pretty_permalinks: bool,
    /// Registered public post types, in registration order.
    pub content_types: Vec<String>,
    /// Registered public taxonomies, in registration order.
    pub taxonomies: Vec<String>,
    /// Static front page item id, when one is displayed.
    pub page_on_front: Option<u64>,
    /// Item id of the page that lists posts.
    pub page_for_posts: Option<u64>,
    /// Directory holding page templates, probed for `lastmod` overrides.
    pub template_dir: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_owned(),
            pretty_permalinks: true,
            content_types: vec!["page".to_owned(), "post".to_owned()],
            taxonomies: vec!["category".to_owned(), "post_tag".to_owned()],
            page_on_front: None,
            page_for_posts: None,
            template_dir: None,
        }
    }
}

/// General sitemap family configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Whether the family is served.
    pub enabled: bool,
    /// Items per document; invalid values fall back to the default.
    pub capacity: i64,
    /// Included post types.
    pub content_types: Vec<String>,
    /// Included taxonomies.
    pub taxonomies: Vec<String>,
    /// Whether author archives are included.
    pub include_authors: bool,
    /// Whether the image sitemap is served.
    pub include_images: bool,
    /// Whether the video sitemap is served.
    pub include_videos: bool,
    /// Per-taxonomy excluded term ids.
    pub excluded_terms: BTreeMap<String, Vec<u64>>,
    /// Excluded author nicenames.
    pub excluded_authors: Vec<String>,
    /// Thumbnail URL served when none is derivable for a media element.
    pub placeholder_thumbnail: Option<String>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: i64::from(DEFAULT_CAPACITY),
            content_types: vec!["page".to_owned(), "post".to_owned()],
            taxonomies: Vec::new(),
            include_authors: false,
            include_images: false,
            include_videos: false,
            excluded_terms: BTreeMap::new(),
            excluded_authors: Vec::new(),
            placeholder_thumbnail: None,
        }
    }
}

/// News sitemap family configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsmapConfig {
    /// Whether the family is served.
    pub enabled: bool,
    /// Items per document; invalid values fall back to the default.
    pub capacity: i64,
    /// Included post types.
    pub content_types: Vec<String>,
    /// `<news:name>` publisher name.
    pub publication_name: String,
    /// `<news:language>` code; validated against the Google News pattern
    /// at build time, falling back to "en" on mismatch.
    pub publication_language: String,
}

impl Default for NewsmapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: i64::from(DEFAULT_CAPACITY),
            content_types: vec!["post".to_owned()],
            publication_name: String::new(),
            publication_language: "en".to_owned(),
        }
    }
}

/// How hyper-list entries of one content type are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// Group posts under month headers.
    Date,
    /// Group posts under their first category.
    Category,
    /// Group posts under their author.
    Author,
    /// Group pages under their editorial topic.
    Topic,
}

/// One content type of the site-tree dictionary.
///
/// Order in the configuration file is the packing order.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteTreeType {
    /// Content-type id.
    pub id: String,
    /// Cap applied to the count before pagination.
    #[serde(default)]
    pub limit: Option<u64>,
    /// Grouping with headers, when any.
    #[serde(default)]
    pub grouping: Option<Grouping>,
    /// Ancestors deeper than this are rendered without hyperlinks.
    #[serde(default)]
    pub hyperlink_depth: Option<u32>,
}

impl SiteTreeType {
    /// A type entry with no limit, grouping or depth restriction.
    #[must_use]
    pub fn plain(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            limit: None,
            grouping: None,
            hyperlink_depth: None,
        }
    }
}

/// In-page site-tree configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteTreeConfig {
    /// Whether a site-tree page is served.
    pub enabled: bool,
    /// Slug of the page the site tree is served on.
    pub page_slug: String,
    /// Items per page; invalid values fall back to the default.
    pub threshold: i64,
    /// Ordered content-type dictionary; this order defines how ranges
    /// are packed into pages.
    pub content_types: Vec<SiteTreeType>,
    /// Per-taxonomy excluded term ids.
    pub excluded_terms: BTreeMap<String, Vec<u64>>,
    /// Excluded author nicenames.
    pub excluded_authors: Vec<String>,
}

impl Default for SiteTreeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            page_slug: "site-tree".to_owned(),
            threshold: i64::from(DEFAULT_PAGE_THRESHOLD),
            content_types: Vec::new(),
            excluded_terms: BTreeMap::new(),
            excluded_authors: Vec::new(),
        }
    }
}

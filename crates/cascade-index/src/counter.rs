//! Aggregate counting per content family.
//!
//! The counter decides which types are queried at all (inclusion
//! configuration), pushes exclusion into the store queries, and returns
//! `(content_type, count, last_modified)` tuples in the order documents
//! will be numbered: post types first (page-like type pinned when a
//! static front page is displayed), then taxonomies, authors and media
//! kinds for the general sitemap family.
//!
//! Types with nothing to count produce no tuple: a zero row would
//! otherwise claim a document it cannot fill.

use chrono::Duration;

use cascade_config::Config;
use cascade_store::{
    ContentStore, Family, ItemCountQuery, MediaKind, StoreError, TermCountQuery, TypeCount,
};

/// Trailing publication window of news documents, in days.
pub const NEWS_WINDOW_DAYS: i64 = 2;

/// One counted type, with a flag telling the index builder whether the
/// count participates in the running item total. Media parents are
/// re-listings of already-counted items, so they never do.
#[derive(Debug, Clone)]
pub struct CountedType {
    /// The aggregate row.
    pub count: TypeCount,
    /// Whether this count feeds the item total.
    pub tracks_items: bool,
}

impl CountedType {
    fn tracked(count: TypeCount) -> Self {
        Self {
            count,
            tracks_items: true,
        }
    }

    fn untracked(count: TypeCount) -> Self {
        Self {
            count,
            tracks_items: false,
        }
    }
}

/// Count every content type included in `family`, in document-numbering
/// order.
///
/// # Errors
///
/// Propagates [`StoreError`] from the store untouched; no partial result
/// is returned.
pub fn count_family(
    store: &dyn ContentStore,
    config: &Config,
    family: Family,
) -> Result<Vec<CountedType>, StoreError> {
    let mut counts = Vec::new();

    let post_types = config.included_post_types(family);
    if !post_types.is_empty() {
        let first_type = (family == Family::Sitemap
            && post_types.iter().any(|t| t == "page")
            && config.site.page_on_front.is_some())
        .then(|| "page".to_owned());

        let news_window =
            (family == Family::Newsmap).then(|| Duration::days(NEWS_WINDOW_DAYS));

        let rows = store.count_items(&ItemCountQuery {
            content_types: post_types.clone(),
            family,
            news_window,
            first_type,
        })?;
        counts.extend(rows.into_iter().map(CountedType::tracked));
    }

    if family == Family::Sitemap {
        let taxonomies = config.included_taxonomies();
        if !taxonomies.is_empty() {
            let excluded: Vec<u64> = taxonomies
                .iter()
                .flat_map(|tax| config.excluded_term_ids(tax, family))
                .collect();
            let rows = store.count_terms(&TermCountQuery {
                taxonomies,
                excluded_term_ids: excluded,
            })?;
            counts.extend(rows.into_iter().map(CountedType::tracked));
        }

        if config.sitemap.include_authors
            && let Some(row) = store.count_authors(config.excluded_authors(family))?
        {
            counts.push(CountedType::tracked(row));
        }

        for (kind, enabled) in [
            (MediaKind::Image, config.sitemap.include_images),
            (MediaKind::Video, config.sitemap.include_videos),
        ] {
            if enabled
                && !post_types.is_empty()
                && let Some(row) = store.count_media_parents(kind, &post_types)?
            {
                counts.push(CountedType::untracked(row));
            }
        }
    }

    Ok(counts)
}

/// Count every content type of the site-tree dictionary, with per-type
/// limits applied. Returned in dictionary order; types with nothing to
/// count are absent.
///
/// # Errors
///
/// Propagates [`StoreError`] from the store untouched.
pub fn count_site_tree(
    store: &dyn ContentStore,
    config: &Config,
) -> Result<Vec<TypeCount>, StoreError> {
    let family = Family::SiteTree;

    let post_types = config.included_post_types(family);
    let mut by_type: Vec<TypeCount> = Vec::new();

    if !post_types.is_empty() {
        let rows = store.count_items(&ItemCountQuery {
            content_types: post_types,
            family,
            news_window: None,
            first_type: None,
        })?;
        by_type.extend(rows);
    }

    let taxonomies: Vec<String> = config
        .site
        .taxonomies
        .iter()
        .filter(|tax| config.is_content_type_included(tax, family))
        .cloned()
        .collect();
    if !taxonomies.is_empty() {
        let excluded: Vec<u64> = taxonomies
            .iter()
            .flat_map(|tax| config.excluded_term_ids(tax, family))
            .collect();
        by_type.extend(store.count_terms(&TermCountQuery {
            taxonomies,
            excluded_term_ids: excluded,
        })?);
    }

    if config.is_content_type_included("authors", family)
        && let Some(row) = store.count_authors(config.excluded_authors(family))?
    {
        by_type.push(row);
    }

    // Dictionary order decides packing order; per-type limits cap counts
    // before pagination.
    let mut ordered = Vec::new();
    for entry in &config.site_tree.content_types {
        if let Some(mut row) = by_type.iter().find(|c| c.content_type == entry.id).cloned() {
            if let Some(limit) = entry.limit
                && limit > 0
            {
                row.count = row.count.min(limit);
            }
            ordered.push(row);
        }
    }

    Ok(ordered)
}

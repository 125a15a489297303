//! In-memory content store.
//!
//! [`MemoryStore`] keeps content rows in plain vectors and answers every
//! [`ContentStore`] query by filtering them, which makes it both the test
//! backend and a usable store for hosts that load content up front. All
//! filtering happens inside the query methods, matching the contract that
//! exclusion is query-time, never post-filtering.

use std::collections::HashMap;

use chrono::Utc;

use crate::store::{
    AuthorQuery, ContentStore, ItemCountQuery, ItemOrder, ItemQuery, StoreError, TermCountQuery,
    TermQuery,
};
use crate::types::{
    AuthorRow, ContentItem, ContentStatus, Family, MediaItem, MediaKind, TermRow, TypeCount,
};

/// Attachments beyond this per-parent window are dropped by media
/// queries, oldest first.
const MAX_MEDIA_PER_PARENT: usize = 1000;

/// A taxonomy term as stored.
#[derive(Debug, Clone)]
struct TermRecord {
    id: u64,
    slug: String,
    name: String,
    taxonomy: String,
    parent: Option<u64>,
}

/// An author as stored.
#[derive(Debug, Clone)]
struct AuthorRecord {
    id: u64,
    nicename: String,
    display_name: String,
}

/// In-memory [`ContentStore`] with builder-style setup.
///
/// # Example
///
/// ```
/// use cascade_store::{ContentItem, ContentStore, Family, ItemCountQuery, MemoryStore};
/// use chrono::{TimeZone, Utc};
///
/// let store = MemoryStore::new()
///     .with_item(ContentItem::new(1, "hello", "post", Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
///
/// let counts = store
///     .count_items(&ItemCountQuery {
///         content_types: vec!["post".to_owned()],
///         family: Family::Sitemap,
///         news_window: None,
///         first_type: None,
///     })
///     .unwrap();
/// assert_eq!(counts[0].count, 1);
/// ```
#[derive(Default)]
pub struct MemoryStore {
    items: Vec<ContentItem>,
    terms: Vec<TermRecord>,
    assignments: Vec<(u64, u64)>,
    authors: Vec<AuthorRecord>,
    media: Vec<MediaItem>,
    unavailable: bool,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a content item.
    #[must_use]
    pub fn with_item(mut self, item: ContentItem) -> Self {
        self.items.push(item);
        self
    }

    /// Add many content items.
    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = ContentItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Add a taxonomy term.
    #[must_use]
    pub fn with_term(
        mut self,
        id: u64,
        slug: impl Into<String>,
        name: impl Into<String>,
        taxonomy: impl Into<String>,
    ) -> Self {
        self.terms.push(TermRecord {
            id,
            slug: slug.into(),
            name: name.into(),
            taxonomy: taxonomy.into(),
            parent: None,
        });
        self
    }

    /// Add a taxonomy term with a parent term.
    #[must_use]
    pub fn with_child_term(
        mut self,
        id: u64,
        slug: impl Into<String>,
        name: impl Into<String>,
        taxonomy: impl Into<String>,
        parent: u64,
    ) -> Self {
        self.terms.push(TermRecord {
            id,
            slug: slug.into(),
            name: name.into(),
            taxonomy: taxonomy.into(),
            parent: Some(parent),
        });
        self
    }

    /// Assign an item to a term.
    #[must_use]
    pub fn with_assignment(mut self, term_id: u64, item_id: u64) -> Self {
        self.assignments.push((term_id, item_id));
        self
    }

    /// Add an author.
    #[must_use]
    pub fn with_author(
        mut self,
        id: u64,
        nicename: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        self.authors.push(AuthorRecord {
            id,
            nicename: nicename.into(),
            display_name: display_name.into(),
        });
        self
    }

    /// Add a media attachment.
    #[must_use]
    pub fn with_media(mut self, media: MediaItem) -> Self {
        self.media.push(media);
        self
    }

    /// Make every query fail with [`StoreError::Unavailable`].
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("backend offline".to_owned()));
        }
        Ok(())
    }

    /// Items qualifying for `family`, optionally within the news window,
    /// restricted to `content_type` when given.
    fn qualifying<'a>(
        &'a self,
        family: Family,
        news_window: Option<chrono::Duration>,
        content_type: Option<&'a str>,
    ) -> impl Iterator<Item = &'a ContentItem> {
        let horizon = news_window.map(|window| Utc::now() - window);
        self.items.iter().filter(move |item| {
            item.qualifies_for(family)
                && content_type.is_none_or(|ty| item.content_type == ty)
                && horizon.is_none_or(|h| item.published_at >= h)
        })
    }

    /// Published items assigned to `term_id`.
    fn published_items_of_term(&self, term_id: u64) -> impl Iterator<Item = &ContentItem> {
        self.assignments
            .iter()
            .filter(move |(t, _)| *t == term_id)
            .filter_map(|(_, item_id)| self.items.iter().find(|item| item.id == *item_id))
            .filter(|item| item.status == ContentStatus::Published)
    }

    /// Published posts by `author_id`.
    fn published_posts_of_author(&self, author_id: u64) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(move |item| {
            item.author == Some(author_id)
                && item.content_type == "post"
                && item.status == ContentStatus::Published
        })
    }

    /// Whether the item owns at least one attachment of `kind`.
    fn has_media(&self, item_id: u64, kind: MediaKind) -> bool {
        self.media
            .iter()
            .any(|media| media.parent == item_id && media.kind == kind)
    }
}

impl ContentStore for MemoryStore {
    fn count_items(&self, query: &ItemCountQuery) -> Result<Vec<TypeCount>, StoreError> {
        self.check_available()?;

        let mut counts = Vec::new();
        for content_type in &query.content_types {
            let mut count = 0;
            let mut last_modified = None;
            for item in self.qualifying(query.family, query.news_window, Some(content_type)) {
                count += 1;
                if last_modified.is_none_or(|lm| item.modified_at > lm) {
                    last_modified = Some(item.modified_at);
                }
            }
            if count > 0 {
                counts.push(TypeCount {
                    content_type: content_type.clone(),
                    count,
                    last_modified,
                });
            }
        }

        counts.sort_by(|a, b| {
            let a_first = query.first_type.as_deref() == Some(a.content_type.as_str());
            let b_first = query.first_type.as_deref() == Some(b.content_type.as_str());
            b_first
                .cmp(&a_first)
                .then(b.last_modified.cmp(&a.last_modified))
        });

        Ok(counts)
    }

    fn count_terms(&self, query: &TermCountQuery) -> Result<Vec<TypeCount>, StoreError> {
        self.check_available()?;

        let mut counts = Vec::new();
        for taxonomy in &query.taxonomies {
            let mut count = 0;
            let mut last_modified = None;
            for term in self
                .terms
                .iter()
                .filter(|t| t.taxonomy == *taxonomy && !query.excluded_term_ids.contains(&t.id))
            {
                let latest = self
                    .published_items_of_term(term.id)
                    .map(|item| item.modified_at)
                    .max();
                if let Some(latest) = latest {
                    count += 1;
                    if last_modified.is_none_or(|lm| latest > lm) {
                        last_modified = Some(latest);
                    }
                }
            }
            if count > 0 {
                counts.push(TypeCount {
                    content_type: taxonomy.clone(),
                    count,
                    last_modified,
                });
            }
        }

        counts.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));

        Ok(counts)
    }

    fn count_authors(
        &self,
        excluded_nicenames: &[String],
    ) -> Result<Option<TypeCount>, StoreError> {
        self.check_available()?;

        let count = self
            .authors
            .iter()
            .filter(|author| !excluded_nicenames.contains(&author.nicename))
            .filter(|author| self.published_posts_of_author(author.id).next().is_some())
            .count() as u64;

        if count == 0 {
            return Ok(None);
        }
        Ok(Some(TypeCount {
            content_type: "authors".to_owned(),
            count,
            last_modified: None,
        }))
    }

    fn count_media_parents(
        &self,
        kind: MediaKind,
        content_types: &[String],
    ) -> Result<Option<TypeCount>, StoreError> {
        self.check_available()?;

        let count = self
            .qualifying(Family::Sitemap, None, None)
            .filter(|item| content_types.contains(&item.content_type))
            .filter(|item| self.has_media(item.id, kind))
            .count() as u64;

        if count == 0 {
            return Ok(None);
        }
        Ok(Some(TypeCount {
            content_type: kind.slug().to_owned(),
            count,
            last_modified: None,
        }))
    }

    fn items(&self, query: &ItemQuery) -> Result<Vec<ContentItem>, StoreError> {
        self.check_available()?;

        let mut rows: Vec<ContentItem> = self
            .qualifying(query.family, query.news_window, Some(&query.content_type))
            .cloned()
            .collect();

        match query.order {
            ItemOrder::ModifiedDesc => {
                rows.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(a.id.cmp(&b.id)));
            }
            ItemOrder::PublishedDesc => {
                rows.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(a.id.cmp(&b.id)));
            }
            ItemOrder::TitleAsc => {
                rows.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
            }
        }

        Ok(slice(rows, query.limit, query.offset))
    }

    fn item(&self, id: u64) -> Result<Option<ContentItem>, StoreError> {
        self.check_available()?;
        Ok(self.items.iter().find(|item| item.id == id).cloned())
    }

    fn terms(&self, query: &TermQuery) -> Result<Vec<TermRow>, StoreError> {
        self.check_available()?;

        let mut rows: Vec<TermRow> = self
            .terms
            .iter()
            .filter(|t| t.taxonomy == query.taxonomy && !query.excluded_term_ids.contains(&t.id))
            .filter_map(|term| {
                let last_modified = self
                    .published_items_of_term(term.id)
                    .map(|item| item.modified_at)
                    .max()?;
                Some(TermRow {
                    id: term.id,
                    slug: term.slug.clone(),
                    name: term.name.clone(),
                    taxonomy: term.taxonomy.clone(),
                    parent: term.parent,
                    last_modified,
                })
            })
            .collect();

        rows.sort_by(|a, b| b.last_modified.cmp(&a.last_modified).then(a.id.cmp(&b.id)));

        Ok(slice(rows, query.limit, query.offset))
    }

    fn item_terms(&self, item_id: u64, taxonomy: &str) -> Result<Vec<TermRow>, StoreError> {
        self.check_available()?;

        let mut rows: Vec<TermRow> = self
            .assignments
            .iter()
            .filter(|(_, item)| *item == item_id)
            .filter_map(|(term_id, _)| {
                self.terms
                    .iter()
                    .find(|t| t.id == *term_id && t.taxonomy == taxonomy)
            })
            .map(|term| TermRow {
                id: term.id,
                slug: term.slug.clone(),
                name: term.name.clone(),
                taxonomy: term.taxonomy.clone(),
                parent: term.parent,
                last_modified: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            })
            .collect();

        rows.sort_by_key(|t| t.id);
        rows.dedup_by_key(|t| t.id);

        Ok(rows)
    }

    fn author(&self, id: u64) -> Result<Option<AuthorRow>, StoreError> {
        self.check_available()?;

        Ok(self.authors.iter().find(|a| a.id == id).map(|author| {
            let last_modified = self
                .published_posts_of_author(author.id)
                .map(|item| item.modified_at)
                .max()
                .unwrap_or(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH);
            AuthorRow {
                id: author.id,
                nicename: author.nicename.clone(),
                display_name: author.display_name.clone(),
                last_modified,
            }
        }))
    }

    fn authors(&self, query: &AuthorQuery) -> Result<Vec<AuthorRow>, StoreError> {
        self.check_available()?;

        let mut rows: Vec<AuthorRow> = self
            .authors
            .iter()
            .filter(|author| !query.excluded_nicenames.contains(&author.nicename))
            .filter_map(|author| {
                let last_modified = self
                    .published_posts_of_author(author.id)
                    .map(|item| item.modified_at)
                    .max()?;
                Some(AuthorRow {
                    id: author.id,
                    nicename: author.nicename.clone(),
                    display_name: author.display_name.clone(),
                    last_modified,
                })
            })
            .collect();

        rows.sort_by(|a, b| b.last_modified.cmp(&a.last_modified).then(a.id.cmp(&b.id)));

        Ok(slice(rows, query.limit, query.offset))
    }

    fn media_parents(
        &self,
        kind: MediaKind,
        content_types: &[String],
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        self.check_available()?;

        let mut rows: Vec<ContentItem> = self
            .qualifying(Family::Sitemap, None, None)
            .filter(|item| content_types.contains(&item.content_type))
            .filter(|item| self.has_media(item.id, kind))
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(a.id.cmp(&b.id)));

        Ok(slice(rows, limit, offset))
    }

    fn media_for_parents(
        &self,
        kind: MediaKind,
        parent_ids: &[u64],
    ) -> Result<Vec<MediaItem>, StoreError> {
        self.check_available()?;

        let mut per_parent: HashMap<u64, Vec<MediaItem>> = HashMap::new();
        for media in self
            .media
            .iter()
            .filter(|media| media.kind == kind && parent_ids.contains(&media.parent))
        {
            per_parent.entry(media.parent).or_default().push(media.clone());
        }

        let mut rows = Vec::new();
        for group in per_parent.values_mut() {
            group.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(a.id.cmp(&b.id)));
            group.truncate(MAX_MEDIA_PER_PARENT);
            rows.append(group);
        }

        rows.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(a.id.cmp(&b.id)));

        Ok(rows)
    }
}

/// Apply `LIMIT`/`OFFSET` to sorted rows.
fn slice<T>(rows: Vec<T>, limit: u64, offset: u64) -> Vec<T> {
    rows.into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn at(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn post_count_query() -> ItemCountQuery {
        ItemCountQuery {
            content_types: vec!["post".to_owned(), "page".to_owned()],
            family: Family::Sitemap,
            news_window: None,
            first_type: None,
        }
    }

    #[test]
    fn test_count_items_groups_by_type() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(1)))
            .with_item(ContentItem::new(2, "b", "post", at(2)))
            .with_item(ContentItem::new(3, "c", "page", at(3)));

        let counts = store.count_items(&post_count_query()).unwrap();

        // Page modified most recently, so it sorts first.
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].content_type, "page");
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].content_type, "post");
        assert_eq!(counts[1].count, 2);
        assert_eq!(counts[1].last_modified, Some(at(2)));
    }

    #[test]
    fn test_count_items_skips_types_with_no_rows() {
        let store = MemoryStore::new().with_item(ContentItem::new(1, "a", "post", at(1)));

        let counts = store.count_items(&post_count_query()).unwrap();

        // No "page" tuple at all, not a zero row.
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].content_type, "post");
    }

    #[test]
    fn test_count_items_excludes_unqualified_rows() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(1)))
            .with_item(ContentItem::new(2, "b", "post", at(2)).ghost())
            .with_item(ContentItem::new(3, "c", "post", at(3)).password_protected())
            .with_item(ContentItem::new(4, "d", "post", at(4)).with_status(ContentStatus::Draft))
            .with_item(ContentItem::new(5, "e", "post", at(5)).excluded_from(Family::Sitemap));

        let counts = store.count_items(&post_count_query()).unwrap();

        assert_eq!(counts[0].count, 1);
    }

    #[test]
    fn test_count_items_first_type_pins_page() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(9)))
            .with_item(ContentItem::new(2, "b", "page", at(1)));

        let mut query = post_count_query();
        query.first_type = Some("page".to_owned());
        let counts = store.count_items(&query).unwrap();

        assert_eq!(counts[0].content_type, "page");
        assert_eq!(counts[1].content_type, "post");
    }

    #[test]
    fn test_count_items_news_window() {
        let now = Utc::now();
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "fresh", "post", now).published(now))
            .with_item(
                ContentItem::new(2, "old", "post", now).published(now - Duration::days(10)),
            );

        let mut query = post_count_query();
        query.family = Family::Newsmap;
        query.news_window = Some(Duration::days(2));
        let counts = store.count_items(&query).unwrap();

        assert_eq!(counts[0].count, 1);
    }

    #[test]
    fn test_count_terms_distinct_with_published_item() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(1)))
            .with_item(ContentItem::new(2, "b", "post", at(2)).with_status(ContentStatus::Draft))
            .with_term(10, "news", "News", "category")
            .with_term(11, "sport", "Sport", "category")
            .with_term(12, "empty", "Empty", "category")
            .with_assignment(10, 1)
            .with_assignment(10, 1)
            .with_assignment(11, 2);

        let counts = store
            .count_terms(&TermCountQuery {
                taxonomies: vec!["category".to_owned()],
                excluded_term_ids: Vec::new(),
            })
            .unwrap();

        // Term 10 counted once despite two assignments; 11 has only a
        // draft item; 12 has none.
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 1);
    }

    #[test]
    fn test_count_terms_respects_denylist() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(1)))
            .with_term(10, "news", "News", "category")
            .with_assignment(10, 1);

        let counts = store
            .count_terms(&TermCountQuery {
                taxonomies: vec!["category".to_owned()],
                excluded_term_ids: vec![10],
            })
            .unwrap();

        assert!(counts.is_empty());
    }

    #[test]
    fn test_count_authors() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(1)).by_author(100))
            .with_item(ContentItem::new(2, "b", "post", at(2)).by_author(100))
            .with_item(ContentItem::new(3, "c", "page", at(3)).by_author(101))
            .with_author(100, "alice", "Alice")
            .with_author(101, "bob", "Bob");

        let count = store.count_authors(&[]).unwrap().unwrap();

        // Bob only has a page; author archives cover posts.
        assert_eq!(count.content_type, "authors");
        assert_eq!(count.count, 1);
    }

    #[test]
    fn test_count_authors_none_qualify() {
        let store = MemoryStore::new().with_author(100, "alice", "Alice");

        assert!(store.count_authors(&[]).unwrap().is_none());
    }

    #[test]
    fn test_items_slice_matches_counts() {
        let items: Vec<ContentItem> = (1..=25)
            .map(|i| ContentItem::new(i, format!("p{i}"), "post", at((i % 28 + 1) as u32)))
            .collect();
        let store = MemoryStore::new().with_items(items);

        let total: u64 = store.count_items(&post_count_query()).unwrap()[0].count;
        let mut fetched = 0;
        let mut offset = 0;
        loop {
            let page = store
                .items(&ItemQuery {
                    content_type: "post".to_owned(),
                    family: Family::Sitemap,
                    news_window: None,
                    order: ItemOrder::ModifiedDesc,
                    limit: 10,
                    offset,
                })
                .unwrap();
            if page.is_empty() {
                break;
            }
            fetched += page.len() as u64;
            offset += 10;
        }

        assert_eq!(fetched, total);
    }

    #[test]
    fn test_items_ordered_modified_desc() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "old", "post", at(1)))
            .with_item(ContentItem::new(2, "new", "post", at(9)))
            .with_item(ContentItem::new(3, "mid", "post", at(5)));

        let rows = store
            .items(&ItemQuery {
                content_type: "post".to_owned(),
                family: Family::Sitemap,
                news_window: None,
                order: ItemOrder::ModifiedDesc,
                limit: 10,
                offset: 0,
            })
            .unwrap();

        let slugs: Vec<&str> = rows.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_terms_slice_with_last_modified() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(3)))
            .with_item(ContentItem::new(2, "b", "post", at(7)))
            .with_term(10, "news", "News", "category")
            .with_term(11, "sport", "Sport", "category")
            .with_assignment(10, 1)
            .with_assignment(11, 2);

        let rows = store
            .terms(&TermQuery {
                taxonomy: "category".to_owned(),
                excluded_term_ids: Vec::new(),
                limit: 10,
                offset: 0,
            })
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].slug, "sport");
        assert_eq!(rows[0].last_modified, at(7));
        assert_eq!(rows[1].slug, "news");
    }

    #[test]
    fn test_media_for_parents_caps_per_parent() {
        let mut store = MemoryStore::new().with_item(ContentItem::new(1, "a", "post", at(1)));
        for i in 0..(MAX_MEDIA_PER_PARENT as u64 + 5) {
            store = store.with_media(MediaItem {
                id: i,
                parent: 1,
                kind: MediaKind::Image,
                url: format!("https://example.com/i{i}.jpg"),
                title: String::new(),
                caption: String::new(),
                thumbnail_url: None,
                modified_at: at(1) + Duration::seconds(i as i64),
            });
        }

        let rows = store.media_for_parents(MediaKind::Image, &[1]).unwrap();

        assert_eq!(rows.len(), MAX_MEDIA_PER_PARENT);
        // The five oldest attachments were dropped.
        assert!(rows.iter().all(|m| m.id >= 5));
    }

    #[test]
    fn test_media_parents_requires_media_of_kind() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(1)))
            .with_item(ContentItem::new(2, "b", "post", at(2)))
            .with_media(MediaItem {
                id: 1,
                parent: 1,
                kind: MediaKind::Video,
                url: "https://example.com/v.mp4".to_owned(),
                title: String::new(),
                caption: String::new(),
                thumbnail_url: None,
                modified_at: at(1),
            });

        let parents = store
            .media_parents(MediaKind::Image, &["post".to_owned()], 10, 0)
            .unwrap();
        assert!(parents.is_empty());

        let parents = store
            .media_parents(MediaKind::Video, &["post".to_owned()], 10, 0)
            .unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].id, 1);
    }

    #[test]
    fn test_item_terms_filters_by_taxonomy() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(1)))
            .with_term(10, "news", "News", "category")
            .with_term(11, "rust", "Rust", "post_tag")
            .with_assignment(10, 1)
            .with_assignment(11, 1);

        let rows = store.item_terms(1, "category").unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "News");
    }

    #[test]
    fn test_author_lookup() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(5)).by_author(100))
            .with_author(100, "alice", "Alice");

        let row = store.author(100).unwrap().unwrap();
        assert_eq!(row.display_name, "Alice");
        assert_eq!(row.last_modified, at(5));

        assert!(store.author(999).unwrap().is_none());
    }

    #[test]
    fn test_unavailable_store_fails_every_query() {
        let store = MemoryStore::new()
            .with_item(ContentItem::new(1, "a", "post", at(1)))
            .unavailable();

        assert!(matches!(
            store.count_items(&post_count_query()),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(store.item(1), Err(StoreError::Unavailable(_))));
    }
}

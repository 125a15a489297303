//! The persisted sitemap index and its builder.
//!
//! The index records how many documents each content type needs, in the
//! order the counter produced the types; that order is the order
//! documents are numbered across types. The grand total is capped at
//! [`MAX_DOCUMENTS`]: a type whose requirement exceeds the remaining
//! budget is truncated to it, and every later type is dropped from the
//! index for this cache epoch.

use serde::{Deserialize, Serialize};

use cascade_config::Config;
use cascade_kv::{Kv, KvBucketExt};
use cascade_store::{ContentStore, Family, StoreError};

use crate::counter::{CountedType, count_family};
use crate::INDEX_KEY;

/// Hard cap on the total number of documents across all types of one
/// family.
pub const MAX_DOCUMENTS: u32 = 50_000;

/// Value of [`SitemapIndex::total_items`] when item counting was
/// disabled for the build.
pub const ITEMS_UNCOUNTED: i64 = -1;

/// One index entry: a content type and the number of documents it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Content-type identifier.
    pub content_type: String,
    /// Documents required for this type.
    pub documents: u32,
}

/// The persisted index of one document family.
///
/// Entry order is document-numbering order. Invariant:
/// `sum(entry.documents) == total_documents <= MAX_DOCUMENTS`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SitemapIndex {
    entries: Vec<IndexEntry>,
    total_documents: u32,
    total_items: i64,
}

impl SitemapIndex {
    /// Number of documents indexed for `content_type`, or `None` when
    /// the type is absent from the index.
    #[must_use]
    pub fn documents_for(&self, content_type: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.content_type == content_type)
            .map(|e| e.documents)
    }

    /// Total number of documents across all types.
    #[must_use]
    pub fn total_documents(&self) -> u32 {
        self.total_documents
    }

    /// Total number of counted items, or [`ITEMS_UNCOUNTED`].
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.total_items
    }

    /// Whether any type is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in document-numbering order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries
            .iter()
            .map(|e| (e.content_type.as_str(), e.documents))
    }

    /// The content type a bare index request resolves to when only one
    /// document exists: the first registered post type present in the
    /// index, falling back to `default`.
    #[must_use]
    pub fn resolve_index_type<'a>(
        &'a self,
        registered_post_types: &'a [String],
        default: &'a str,
    ) -> &'a str {
        registered_post_types
            .iter()
            .find(|ty| self.documents_for(ty).is_some())
            .map_or(default, |ty| ty.as_str())
    }
}

/// Fold counter output into an index, applying the document budget.
fn fold(counts: &[CountedType], capacity: u32, track_items: bool) -> SitemapIndex {
    let capacity = u64::from(capacity);
    let mut index = SitemapIndex {
        total_items: ITEMS_UNCOUNTED,
        ..SitemapIndex::default()
    };
    let mut counted_any = false;

    for counted in counts {
        let row = &counted.count;
        if row.count == 0 {
            continue;
        }

        let budget_left = MAX_DOCUMENTS - index.total_documents;
        if budget_left == 0 {
            break;
        }

        let documents = row.count.div_ceil(capacity);
        let track = track_items && counted.tracks_items;

        if documents > u64::from(budget_left) {
            // Truncate to the remaining budget and stop indexing: later
            // types are not pagable this epoch.
            index.entries.push(IndexEntry {
                content_type: row.content_type.clone(),
                documents: budget_left,
            });
            index.total_documents = MAX_DOCUMENTS;
            if track {
                add_items(&mut index, u64::from(budget_left) * capacity);
                counted_any = true;
            }
            break;
        }

        index.entries.push(IndexEntry {
            content_type: row.content_type.clone(),
            documents: u32::try_from(documents).unwrap_or(u32::MAX),
        });
        index.total_documents += u32::try_from(documents).unwrap_or(u32::MAX);
        if track {
            add_items(&mut index, row.count);
            counted_any = true;
        }
    }

    // One extra implicit item for the always-present site root, outside
    // the counted types.
    if counted_any {
        add_items(&mut index, 1);
    }

    index
}

fn add_items(index: &mut SitemapIndex, items: u64) {
    if index.total_items == ITEMS_UNCOUNTED {
        index.total_items = 0;
    }
    index.total_items += i64::try_from(items).unwrap_or(i64::MAX);
}

/// Return the cached index of `family`, building and persisting it
/// first when absent.
///
/// The second element is `true` when the index was built by this call;
/// callers use it to refresh totals that only a fresh build knows.
/// `track_items` disables the item total (left at [`ITEMS_UNCOUNTED`])
/// when a caller has no use for it.
///
/// # Errors
///
/// Propagates [`StoreError`] from counting; nothing is persisted on
/// error, so the next request retries the full build.
pub fn build_or_load(
    store: &dyn ContentStore,
    config: &Config,
    kv: &dyn Kv,
    family: Family,
    track_items: bool,
) -> Result<(SitemapIndex, bool), StoreError> {
    let bucket = kv.bucket(family.slug());

    if let Some(index) = bucket.get_json::<SitemapIndex>(INDEX_KEY)
        && !index.is_empty()
    {
        return Ok((index, false));
    }

    let counts = count_family(store, config, family)?;
    let index = fold(&counts, config.capacity(family), track_items);

    bucket.set_json(INDEX_KEY, &index);
    tracing::debug!(
        family = family.slug(),
        total_documents = index.total_documents,
        total_items = index.total_items,
        "sitemap index built"
    );

    Ok((index, true))
}

//! The site-tree page index and its bin-packer.
//!
//! Heterogeneous per-type counts are packed into pages close to a target
//! size with a greedy pass over the configured type dictionary. Two
//! tolerance bands keep pages from degenerating:
//!
//! - a page whose remaining capacity is at or below 30 % of the
//!   threshold is closed before a new type starts on it;
//! - a type's tail fragment at or below 15 % of the threshold is merged
//!   backward into the previous page (when that page already holds the
//!   type, or nothing else is left to place) instead of opening a page
//!   of its own.
//!
//! Ranges are 1-based inclusive ranks within each type's own ordered
//! result set; the document builders turn them into `LIMIT`/`OFFSET`
//! queries 1:1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cascade_config::Config;
use cascade_kv::{Kv, KvBucketExt};
use cascade_store::{ContentStore, Family, StoreError, TypeCount};

use crate::INDEX_KEY;
use crate::counter::count_site_tree;

/// One per-type rank range placed on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    /// Content-type identifier.
    pub content_type: String,
    /// First rank on the page, 1-based inclusive.
    pub start: u64,
    /// Last rank on the page, inclusive.
    pub end: u64,
}

/// One page of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// Page number, 1-based.
    pub number: u32,
    /// Ranges on this page, in dictionary order.
    pub ranges: Vec<PageRange>,
}

/// A resolved `LIMIT`/`OFFSET` slice for one content type of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice {
    /// Content-type identifier.
    pub content_type: String,
    /// Number of items to fetch.
    pub limit: u64,
    /// Items to skip.
    pub offset: u64,
}

/// The persisted page index of the site tree.
///
/// Page 1 always exists, possibly with no ranges (an empty site tree is
/// one empty page, not zero pages).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageIndex {
    pages: Vec<PageEntry>,
}

impl PageIndex {
    /// Highest page number with an entry.
    #[must_use]
    pub fn number_of_pages(&self) -> u32 {
        self.pages.iter().map(|p| p.number).max().unwrap_or(0)
    }

    /// The entry for `number`, or `None` for out-of-range pages.
    #[must_use]
    pub fn page(&self, number: u32) -> Option<&PageEntry> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Whether a request for page `number` can be served.
    #[must_use]
    pub fn page_exists(&self, number: u32) -> bool {
        self.page(number).is_some()
    }

    /// Resolve the ranges of page `number` into query slices.
    #[must_use]
    pub fn slices_for(&self, number: u32) -> Vec<PageSlice> {
        self.page(number).map_or_else(Vec::new, |page| {
            page.ranges
                .iter()
                .map(|range| PageSlice {
                    content_type: range.content_type.clone(),
                    limit: range.end - range.start + 1,
                    offset: range.start - 1,
                })
                .collect()
        })
    }

    /// Total number of items across all pages.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.pages
            .iter()
            .flat_map(|p| &p.ranges)
            .map(|r| r.end - r.start + 1)
            .sum()
    }

    /// Whether the index holds no ranges at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.ranges.is_empty())
    }
}

/// Pack per-type counts into pages of roughly `threshold` items.
///
/// `counts` must be in dictionary order; types with a zero count are
/// skipped entirely.
#[must_use]
pub fn pack(counts: &[TypeCount], threshold: u32) -> PageIndex {
    let threshold = u64::from(threshold.max(1));
    let min_merge = (threshold * 15).div_ceil(100);
    let max_end = (threshold * 30).div_ceil(100);

    let mut pages: BTreeMap<u32, Vec<PageRange>> = BTreeMap::new();
    pages.insert(1, Vec::new());

    let mut page_number: u32 = 1;
    let mut remaining = threshold;

    for (idx, row) in counts.iter().enumerate() {
        let mut count = row.count;
        if count == 0 {
            continue;
        }
        let mut previous_end: u64 = 0;

        // Current page nearly full: close it before this type starts.
        if remaining <= max_end {
            page_number += 1;
            remaining = threshold;
        }

        while count >= remaining {
            pages.entry(page_number).or_default().push(PageRange {
                content_type: row.content_type.clone(),
                start: previous_end + 1,
                end: previous_end + remaining,
            });
            count -= remaining;
            previous_end += remaining;
            page_number += 1;
            remaining = threshold;
        }

        if count > 0 {
            let end = previous_end + count;
            let previous_page = page_number - 1;
            let no_further_content = counts[idx + 1..].iter().all(|c| c.count == 0);
            let previous_page_has_type = pages
                .get(&previous_page)
                .is_some_and(|ranges| ranges.iter().any(|r| r.content_type == row.content_type));
            let current_page_unopened = !pages.contains_key(&page_number);

            if (no_further_content || previous_page_has_type)
                && current_page_unopened
                && count <= min_merge
            {
                // Small tail: extend the previous page instead of
                // opening a new one for a handful of items.
                if previous_page_has_type {
                    if let Some(range) = pages
                        .get_mut(&previous_page)
                        .and_then(|ranges| {
                            ranges.iter_mut().find(|r| r.content_type == row.content_type)
                        })
                    {
                        range.end = end;
                    }
                } else if let Some(ranges) = pages.get_mut(&previous_page) {
                    ranges.push(PageRange {
                        content_type: row.content_type.clone(),
                        start: 1,
                        end,
                    });
                }
                remaining = threshold;
            } else {
                pages.entry(page_number).or_default().push(PageRange {
                    content_type: row.content_type.clone(),
                    start: previous_end + 1,
                    end,
                });
                remaining -= count;
            }
        }
    }

    PageIndex {
        pages: pages
            .into_iter()
            .map(|(number, ranges)| PageEntry { number, ranges })
            .collect(),
    }
}

/// Return the cached page index, building and persisting it first when
/// absent. The second element is `true` when this call built it.
///
/// # Errors
///
/// Propagates [`StoreError`] from counting; nothing is persisted on
/// error.
pub fn build_or_load(
    store: &dyn ContentStore,
    config: &Config,
    kv: &dyn Kv,
) -> Result<(PageIndex, bool), StoreError> {
    let bucket = kv.bucket(Family::SiteTree.slug());

    if let Some(index) = bucket.get_json::<PageIndex>(INDEX_KEY)
        && !index.pages.is_empty()
    {
        return Ok((index, false));
    }

    let counts = count_site_tree(store, config)?;
    let index = pack(&counts, config.page_threshold());

    bucket.set_json(INDEX_KEY, &index);
    tracing::debug!(
        pages = index.number_of_pages(),
        items = index.total_items(),
        "site-tree page index built"
    );

    Ok((index, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn count(content_type: &str, count: u64) -> TypeCount {
        TypeCount {
            content_type: content_type.to_owned(),
            count,
            last_modified: None,
        }
    }

    fn ranges_of(index: &PageIndex, number: u32) -> Vec<(String, u64, u64)> {
        index
            .page(number)
            .map(|p| {
                p.ranges
                    .iter()
                    .map(|r| (r.content_type.clone(), r.start, r.end))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The concrete scenario from the pagination contract: threshold
    /// 100, counts {page: 80, post: 340} in that order.
    #[test]
    fn test_concrete_scenario() {
        let index = pack(&[count("page", 80), count("post", 340)], 100);

        assert_eq!(ranges_of(&index, 1), vec![("page".to_owned(), 1, 80)]);
        assert_eq!(ranges_of(&index, 2), vec![("post".to_owned(), 1, 100)]);
        assert_eq!(ranges_of(&index, 3), vec![("post".to_owned(), 101, 200)]);
        assert_eq!(ranges_of(&index, 4), vec![("post".to_owned(), 201, 300)]);
        assert_eq!(ranges_of(&index, 5), vec![("post".to_owned(), 301, 340)]);
        assert_eq!(index.number_of_pages(), 5);
    }

    #[test]
    fn test_small_tail_merges_backward_into_own_type() {
        // 103 posts, threshold 100: the 3-item tail merges into page 1
        // instead of opening page 2.
        let index = pack(&[count("post", 103)], 100);

        assert_eq!(ranges_of(&index, 1), vec![("post".to_owned(), 1, 103)]);
        assert_eq!(index.number_of_pages(), 1);
    }

    #[test]
    fn test_small_last_type_merges_into_previous_page() {
        // The 10-item taxonomy is the last type with content and fits
        // the merge band, so it lands on the posts' page even though
        // that page is full.
        let index = pack(&[count("post", 100), count("category", 10)], 100);

        assert_eq!(
            ranges_of(&index, 1),
            vec![("post".to_owned(), 1, 100), ("category".to_owned(), 1, 10)]
        );
        assert_eq!(index.number_of_pages(), 1);
    }

    #[test]
    fn test_tail_above_band_starts_a_page() {
        let index = pack(&[count("post", 116)], 100);

        assert_eq!(ranges_of(&index, 1), vec![("post".to_owned(), 1, 100)]);
        assert_eq!(ranges_of(&index, 2), vec![("post".to_owned(), 101, 116)]);
    }

    #[test]
    fn test_nearly_full_page_closes_before_next_type() {
        // After page, remaining capacity is 25 <= 30% of 100, so posts
        // start on a fresh page.
        let index = pack(&[count("page", 75), count("post", 50)], 100);

        assert_eq!(ranges_of(&index, 1), vec![("page".to_owned(), 1, 75)]);
        assert_eq!(ranges_of(&index, 2), vec![("post".to_owned(), 1, 50)]);
    }

    #[test]
    fn test_mid_dictionary_small_type_shares_the_page() {
        // A small type that is neither last nor preceded by itself does
        // not merge; it opens ranges on the current page.
        let index = pack(&[count("page", 40), count("category", 5), count("post", 30)], 100);

        assert_eq!(
            ranges_of(&index, 1),
            vec![
                ("page".to_owned(), 1, 40),
                ("category".to_owned(), 1, 5),
                ("post".to_owned(), 1, 30),
            ]
        );
    }

    #[test]
    fn test_zero_count_types_are_skipped() {
        let index = pack(&[count("page", 0), count("post", 10)], 100);

        assert_eq!(ranges_of(&index, 1), vec![("post".to_owned(), 1, 10)]);
    }

    #[test]
    fn test_empty_counts_give_one_empty_page() {
        let index = pack(&[], 100);

        assert_eq!(index.number_of_pages(), 1);
        assert!(index.page_exists(1));
        assert!(index.is_empty());
        assert_eq!(index.total_items(), 0);
    }

    /// Range coverage: for every type, the union of its ranges is
    /// exactly [1, count] with no gaps and no overlaps.
    #[test]
    fn test_range_coverage() {
        let counts = [
            count("page", 80),
            count("post", 340),
            count("category", 17),
            count("authors", 3),
        ];
        let index = pack(&counts, 100);

        for row in &counts {
            let mut ranges: Vec<(u64, u64)> = (1..=index.number_of_pages())
                .flat_map(|n| ranges_of(&index, n))
                .filter(|(ty, _, _)| *ty == row.content_type)
                .map(|(_, start, end)| (start, end))
                .collect();
            ranges.sort_unstable();

            let mut expected_start = 1;
            for (start, end) in &ranges {
                assert_eq!(*start, expected_start, "gap or overlap in {}", row.content_type);
                assert!(end >= start);
                expected_start = end + 1;
            }
            assert_eq!(expected_start, row.count + 1, "union != [1, count] for {}", row.content_type);
        }
    }

    /// Tolerance bands: no page fragment smaller than 15% of the
    /// threshold unless it was merged, and every page except the last
    /// carries a reasonable load.
    #[test]
    fn test_tolerance_bands() {
        let counts = [count("page", 95), count("post", 250), count("category", 12)];
        let threshold = 100;
        let index = pack(&counts, threshold);

        let last = index.number_of_pages();
        for number in 1..last {
            let total: u64 = index
                .slices_for(number)
                .iter()
                .map(|slice| slice.limit)
                .sum();
            assert!(
                total * 100 >= u64::from(threshold) * 70,
                "page {number} underfilled: {total}"
            );
            assert!(
                total * 100 <= u64::from(threshold) * 130,
                "page {number} overfilled: {total}"
            );
        }
    }

    #[test]
    fn test_slices_resolve_limit_offset() {
        let index = pack(&[count("page", 80), count("post", 340)], 100);

        let slices = index.slices_for(5);
        assert_eq!(
            slices,
            vec![PageSlice {
                content_type: "post".to_owned(),
                limit: 40,
                offset: 300,
            }]
        );
    }

    #[test]
    fn test_pack_is_deterministic() {
        let counts = [count("page", 80), count("post", 340)];
        assert_eq!(pack(&counts, 100), pack(&counts, 100));
    }

    mod build {
        use super::*;
        use pretty_assertions::assert_eq;
        use cascade_config::SiteTreeType;
        use cascade_store::{ContentItem, MemoryStore};
        use cascade_kv::{KvBucket, MemoryKv};
        use chrono::{TimeZone, Utc};

        fn site_tree_config() -> Config {
            let mut config = Config::default();
            config.site_tree.enabled = true;
            config.site_tree.threshold = 10;
            config.site_tree.content_types =
                vec![SiteTreeType::plain("page"), SiteTreeType::plain("post")];
            config
        }

        fn store_with_posts(n: u64) -> MemoryStore {
            let at = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
            MemoryStore::new()
                .with_items((1..=n).map(|i| ContentItem::new(i, format!("p{i}"), "post", at)))
        }

        #[test]
        fn test_build_persists_and_caches() {
            let store = store_with_posts(25);
            let config = site_tree_config();
            let kv = MemoryKv::new();

            let (first, built) = build_or_load(&store, &config, &kv).unwrap();
            assert!(built);
            assert_eq!(first.number_of_pages(), 3);

            let offline = MemoryStore::new().unavailable();
            let (second, built) = build_or_load(&offline, &config, &kv).unwrap();
            assert!(!built);
            assert_eq!(first, second);
        }

        #[test]
        fn test_store_error_leaves_no_partial_cache() {
            let store = MemoryStore::new().unavailable();
            let config = site_tree_config();
            let kv = MemoryKv::new();

            assert!(build_or_load(&store, &config, &kv).is_err());
            assert_eq!(kv.bucket("site_tree").get(crate::INDEX_KEY), None);
        }
    }
}

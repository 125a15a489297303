//! Sitemap indexing and page bin-packing engine.
//!
//! This crate is the algorithmic core of cascade. It turns aggregate
//! counts from the content store into two kinds of persisted indexes:
//!
//! - [`SitemapIndex`]: how many bounded-size XML documents each content
//!   type needs, capped by an overall document budget
//!   ([`MAX_DOCUMENTS`]), built by [`sitemap_index::build_or_load`].
//! - [`PageIndex`]: how per-type item ranges pack into balanced
//!   site-tree pages, built by [`page_index::build_or_load`] with a
//!   greedy bin-packer and small-remainder merging.
//!
//! Both builders are idempotent within a cache epoch: the first call
//! after an invalidation queries the store and persists the result, any
//! later call returns the cached value untouched. Two concurrent first
//! calls may both rebuild; the rebuild is deterministic given the same
//! store state, so last-write-wins is harmless.
//!
//! Invalidation is the caller's trigger (content published or trashed,
//! exclusion toggled, configuration changed): call
//! [`invalidate`] for the affected family and the next request rebuilds.

pub mod counter;
pub mod page_index;
pub mod sitemap_index;

pub use counter::{CountedType, count_family, count_site_tree};
pub use page_index::{PageIndex, PageRange, PageSlice};
pub use sitemap_index::{MAX_DOCUMENTS, SitemapIndex};

use cascade_kv::Kv;
use cascade_store::Family;

/// KV key holding a family's persisted index, inside the bucket named
/// after the family slug.
pub const INDEX_KEY: &str = "index";

/// Delete the persisted index of `family`.
///
/// Call whenever content affecting the family changes (publish, trash,
/// exclusion toggle) or its configuration changes (included types,
/// capacity, threshold). The next request rebuilds from fresh counts.
pub fn invalidate(kv: &dyn Kv, family: Family) {
    kv.bucket(family.slug()).delete(INDEX_KEY);
    tracing::debug!(family = family.slug(), "index invalidated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_kv::{KvBucket, KvBucketExt, MemoryKv};

    #[test]
    fn test_invalidate_removes_only_the_family_index() {
        let kv = MemoryKv::new();
        kv.bucket("sitemap").set_json(INDEX_KEY, &vec![1, 2, 3]);
        kv.bucket("newsmap").set_json(INDEX_KEY, &vec![4]);

        invalidate(&kv, Family::Sitemap);

        assert_eq!(kv.bucket("sitemap").get(INDEX_KEY), None);
        assert!(kv.bucket("newsmap").get(INDEX_KEY).is_some());
    }
}

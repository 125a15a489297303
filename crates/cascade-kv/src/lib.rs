//! Key-value persistence abstraction for cascade.
//!
//! This crate provides the generic persistence traits that decouple the
//! indexing engine from the host's options storage. Two traits form the
//! core API:
//!
//! - [`Kv`]: factory for named buckets
//! - [`KvBucket`]: key-value store with `get`/`set`/`delete`
//!
//! Index caches, build metrics and resolved configuration all live behind
//! these traits, so a host can back them with its own options table, a
//! directory on disk, or nothing at all.
//!
//! # Implementations
//!
//! - [`MemoryKv`]: in-memory store shared across bucket handles
//! - [`FileKv`]: file-based store with version validation
//! - [`NullKv`] / [`NullBucket`]: no-op implementations (always miss)
//!
//! # Example
//!
//! ```
//! use cascade_kv::{Kv, KvBucket, MemoryKv};
//!
//! let kv = MemoryKv::new();
//! let bucket = kv.bucket("sitemap");
//! bucket.set("sitemap_index", b"{}");
//! assert_eq!(bucket.get("sitemap_index"), Some(b"{}".to_vec()));
//! ```

mod ext;
mod file;
mod memory;

pub use ext::KvBucketExt;
pub use file::FileKv;
pub use memory::MemoryKv;

/// A named partition within a [`Kv`] store.
///
/// Keys are opaque strings chosen by the caller (e.g. `sitemap_index`,
/// `metrics`). Values are raw bytes; typed access is layered on top via
/// [`KvBucketExt`].
pub trait KvBucket: Send + Sync {
    /// Retrieve a stored value, or `None` if the key is absent.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, overwriting any existing entry for the same key.
    fn set(&self, key: &str, value: &[u8]);

    /// Remove a key. Removing an absent key is a no-op.
    fn delete(&self, key: &str);
}

/// Factory for named [`KvBucket`]s.
///
/// Buckets are logically isolated from each other: the same key in two
/// buckets refers to two independent values. Calling `bucket` twice with
/// the same name may return independent handles sharing the same
/// underlying storage.
pub trait Kv: Send + Sync {
    /// Open or create a named bucket.
    fn bucket(&self, name: &str) -> Box<dyn KvBucket>;
}

/// No-op [`KvBucket`] that never stores or retrieves data.
pub struct NullBucket;

impl KvBucket for NullBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}

    fn delete(&self, _key: &str) {}
}

/// No-op [`Kv`] that always returns [`NullBucket`]s.
///
/// Use when persistence is disabled: every index build becomes a fresh
/// build and nothing is ever written.
pub struct NullKv;

impl Kv for NullKv {
    fn bucket(&self, _name: &str) -> Box<dyn KvBucket> {
        Box::new(NullBucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_kv_always_misses() {
        let kv = NullKv;
        let bucket = kv.bucket("sitemap");

        assert_eq!(bucket.get("key"), None);

        bucket.set("key", b"hello");
        assert_eq!(bucket.get("key"), None);
    }

    #[test]
    fn test_null_kv_delete_is_noop() {
        let kv = NullKv;
        let bucket = kv.bucket("sitemap");

        bucket.delete("missing");
        assert_eq!(bucket.get("missing"), None);
    }
}

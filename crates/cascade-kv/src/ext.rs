//! Extension trait for [`KvBucket`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::KvBucket;

/// Typed convenience methods for [`KvBucket`].
///
/// Provides `get_json`/`set_json` for serde-serializable types. These are
/// implemented as default methods on an extension trait so that:
///
/// - [`KvBucket`] stays object-safe with no serde dependency
/// - Implementors only need to handle raw bytes
/// - Callers get ergonomic typed access via a blanket impl
///
/// # Example
///
/// ```
/// use cascade_kv::{Kv, KvBucketExt, MemoryKv};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Metrics { num_queries: u32 }
///
/// let kv = MemoryKv::new();
/// let bucket = kv.bucket("sitemap");
///
/// bucket.set_json("metrics", &Metrics { num_queries: 4 });
/// let metrics: Option<Metrics> = bucket.get_json("metrics");
/// ```
pub trait KvBucketExt: KvBucket {
    /// Retrieve a JSON-deserialized value.
    ///
    /// Returns `None` on a miss or deserialization failure, so a value
    /// written by an incompatible schema reads as absent and gets rebuilt.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key)?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Store a value as JSON.
    ///
    /// Silently does nothing if serialization fails.
    fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        if let Ok(bytes) = serde_json::to_vec(value) {
            self.set(key, &bytes);
        }
    }
}

impl<B: KvBucket + ?Sized> KvBucketExt for B {}

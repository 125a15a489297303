//! In-memory key-value store.
//!
//! [`MemoryKv`] keeps every bucket in a shared map guarded by an `RwLock`.
//! Bucket handles obtained from the same store see each other's writes,
//! which mirrors how a host options table behaves across requests. This is
//! the default backend for tests and for embedding hosts that supply their
//! own persistence elsewhere.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{Kv, KvBucket};

type Buckets = HashMap<String, HashMap<String, Vec<u8>>>;

/// In-memory [`Kv`] store.
///
/// Cheap to clone: clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct MemoryKv {
    buckets: Arc<RwLock<Buckets>>,
}

impl MemoryKv {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Kv for MemoryKv {
    fn bucket(&self, name: &str) -> Box<dyn KvBucket> {
        Box::new(MemoryBucket {
            name: name.to_owned(),
            buckets: Arc::clone(&self.buckets),
        })
    }
}

/// Handle to a single bucket of a [`MemoryKv`].
struct MemoryBucket {
    name: String,
    buckets: Arc<RwLock<Buckets>>,
}

impl KvBucket for MemoryBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .read()
            .ok()?
            .get(&self.name)
            .and_then(|bucket| bucket.get(key))
            .cloned()
    }

    fn set(&self, key: &str, value: &[u8]) {
        if let Ok(mut buckets) = self.buckets.write() {
            buckets
                .entry(self.name.clone())
                .or_default()
                .insert(key.to_owned(), value.to_vec());
        }
    }

    fn delete(&self, key: &str) {
        if let Ok(mut buckets) = self.buckets.write()
            && let Some(bucket) = buckets.get_mut(&self.name)
        {
            bucket.remove(key);
        }
    }
}

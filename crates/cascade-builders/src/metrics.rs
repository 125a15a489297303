//! Build counters and persisted per-family metrics.
//!
//! Every builder brackets its work with [`Counters`]: wall-clock time,
//! store queries issued and items emitted. The request layer folds the
//! resulting [`BuildMetrics`] into the persisted [`FamilyMetrics`]
//! record: write-only observability state, never consumed by the
//! indexing logic.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use cascade_kv::{KvBucket, KvBucketExt};

/// KV key holding a family's persisted metrics, inside the bucket named
/// after the family slug.
pub const METRICS_KEY: &str = "metrics";

/// Counters recorded during one build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildMetrics {
    /// Wall-clock build time in seconds, rounded to milliseconds.
    pub runtime: f64,
    /// Store queries issued.
    pub num_queries: u32,
    /// Items emitted.
    pub num_items: u32,
}

/// Start/stop counter hooks bracketing a build.
pub(crate) struct Counters {
    started: Instant,
    queries: u32,
    items: u32,
}

impl Counters {
    /// Start the clock.
    pub(crate) fn start() -> Self {
        Self {
            started: Instant::now(),
            queries: 0,
            items: 0,
        }
    }

    /// Record one store query.
    pub(crate) fn record_query(&mut self) {
        self.queries += 1;
    }

    /// Record one emitted item.
    pub(crate) fn record_item(&mut self) {
        self.items += 1;
    }

    /// Stop the clock and snapshot the counters.
    pub(crate) fn stop(self) -> BuildMetrics {
        let elapsed = self.started.elapsed().as_secs_f64();
        BuildMetrics {
            runtime: (elapsed * 1000.0).round() / 1000.0,
            num_queries: self.queries,
            num_items: self.items,
        }
    }
}

/// Metrics of one served document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetrics {
    /// Build time in seconds.
    pub runtime: f64,
    /// Store queries issued.
    pub num_queries: u32,
}

/// Persisted per-family metrics record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FamilyMetrics {
    /// Documents in the family's index, refreshed on fresh builds.
    pub total_documents: Option<u32>,
    /// Items in the family's index, refreshed on fresh builds.
    pub total_items: Option<i64>,
    /// Counters of the most recent build.
    pub last_build: Option<DocumentMetrics>,
    /// Per-document counters, keyed by document uid (e.g. `post-2`).
    pub per_document: BTreeMap<String, DocumentMetrics>,
    /// Average runtime across documents; present only when the family
    /// spans more than one document.
    pub avg_runtime: Option<f64>,
    /// Average query count across documents; present only when the
    /// family spans more than one document.
    pub avg_num_queries: Option<f64>,
}

impl FamilyMetrics {
    /// Fold one build into the record.
    ///
    /// `totals` carries `(total_documents, total_items)` when the index
    /// was freshly built by this request.
    pub fn record_document(
        &mut self,
        uid: &str,
        build: BuildMetrics,
        totals: Option<(u32, i64)>,
    ) {
        if let Some((documents, items)) = totals {
            self.total_documents = Some(documents);
            self.total_items = Some(items);
        }

        let document = DocumentMetrics {
            runtime: build.runtime,
            num_queries: build.num_queries,
        };
        self.last_build = Some(document);
        self.per_document.insert(uid.to_owned(), document);

        if self.total_documents.unwrap_or(0) > 1 {
            self.recompute_averages();
        } else {
            self.avg_runtime = None;
            self.avg_num_queries = None;
        }
    }

    fn recompute_averages(&mut self) {
        let n = self.per_document.len();
        if n == 0 {
            return;
        }
        let runtime_sum: f64 = self.per_document.values().map(|d| d.runtime).sum();
        let queries_sum: u64 = self
            .per_document
            .values()
            .map(|d| u64::from(d.num_queries))
            .sum();
        self.avg_runtime = Some(((runtime_sum / n as f64) * 1000.0).round() / 1000.0);
        self.avg_num_queries = Some(((queries_sum as f64 / n as f64) * 1000.0).round() / 1000.0);
    }
}

/// Load the family record from `bucket`, fold one build in, store it
/// back.
pub fn record_document(
    bucket: &dyn KvBucket,
    uid: &str,
    build: BuildMetrics,
    totals: Option<(u32, i64)>,
) {
    let mut metrics: FamilyMetrics = bucket.get_json(METRICS_KEY).unwrap_or_default();
    metrics.record_document(uid, build, totals);
    bucket.set_json(METRICS_KEY, &metrics);
}

/// Refresh only the index totals (the index document itself has no
/// per-document entry).
pub fn record_totals(bucket: &dyn KvBucket, documents: u32, items: i64) {
    let mut metrics: FamilyMetrics = bucket.get_json(METRICS_KEY).unwrap_or_default();
    metrics.total_documents = Some(documents);
    metrics.total_items = Some(items);
    bucket.set_json(METRICS_KEY, &metrics);
}

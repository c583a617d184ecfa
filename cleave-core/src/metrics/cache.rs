//! Run-scoped memoization of per-cluster metric values.
//!
//! Candidate clusterings within one search run share most of their
//! clusters, so per-cluster partial values are cached under the cluster's
//! [`ClusterSignature`]. The map is a `DashMap`, so concurrent fitness
//! evaluations and solver workers read and write it without any locking on
//! the caller's side.
//!
//! Eviction removes entries under the shard write lock: once an entry is
//! gone no reader can observe it. Values are pure functions of the cluster
//! composition, so a recomputation after eviction yields the same number.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use cleave_graph::ClassGraph;
use dashmap::DashMap;
use serde::Serialize;

use crate::clustering::ClusterSignature;

use super::MetricKind;

/// Cache counters, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Shared metric cache for one search run.
#[derive(Debug, Default)]
pub struct OptimizationData {
    partials: DashMap<(MetricKind, ClusterSignature), f64>,
    total_call_weight: OnceLock<f64>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl OptimizationData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value of `kind` for the cluster `signature`, computing it on a miss.
    ///
    /// The shard lock is not held while `compute` runs; two workers missing on
    /// the same key both compute and insert the same value.
    pub fn get_or_compute(
        &self,
        kind: MetricKind,
        signature: &ClusterSignature,
        compute: impl FnOnce() -> f64,
    ) -> f64 {
        let key = (kind, signature.clone());
        if let Some(value) = self.partials.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return *value;
        }
        let value = compute();
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.partials.insert(key, value);
        value
    }

    /// Look up a cached value without computing.
    pub fn get(&self, kind: MetricKind, signature: &ClusterSignature) -> Option<f64> {
        self.partials
            .get(&(kind, signature.clone()))
            .map(|value| *value)
    }

    /// Total dependency call weight of the graph, computed once per run.
    #[allow(clippy::cast_precision_loss)]
    pub fn total_call_weight(&self, graph: &ClassGraph) -> f64 {
        *self
            .total_call_weight
            .get_or_init(|| graph.total_call_weight() as f64)
    }

    /// Remove every entry whose signature matches `stale`. Returns the number removed.
    pub fn evict_if(&self, stale: impl Fn(&ClusterSignature) -> bool) -> usize {
        let mut evicted = 0;
        self.partials.retain(|(_, signature), _| {
            let drop = stale(signature);
            if drop {
                evicted += 1;
            }
            !drop
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.partials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.partials.len(),
        }
    }
}

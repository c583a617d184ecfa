//! Greedy agglomerative search.
//!
//! Starting from all singletons, every step scores each pairwise merge of
//! the current clusters in parallel and keeps the merge with the greatest
//! weighted quality. The run stops at the configured target cluster count,
//! or at the monolith when no target is set.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use cleave_graph::ClassGraph;

use crate::clustering::Clustering;
use crate::config::CleaveConfig;
use crate::error::{ClusteringError, ConfigError, SolveError};
use crate::metrics::{Objectives, OptimizationData};
use crate::progress::{NoopReporter, ProgressReporter};
use crate::solution::Solution;

/// Result of a hierarchical run.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The state with exactly the target cluster count.
    Target(Solution),
    /// Every state from all singletons to the monolith, in merge order.
    Trajectory(Vec<Solution>),
}

impl SolveOutcome {
    /// All solutions carried by this outcome.
    pub fn solutions(&self) -> &[Solution] {
        match self {
            Self::Target(solution) => std::slice::from_ref(solution),
            Self::Trajectory(solutions) => solutions,
        }
    }
}

/// One scored merge of clusters `a < b`.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    quality: f64,
    a: usize,
    b: usize,
}

impl Candidate {
    /// Total order: higher quality wins, then the smaller pair.
    fn better(x: Self, y: Self) -> Self {
        let order = x
            .quality
            .total_cmp(&y.quality)
            .then_with(|| (y.a, y.b).cmp(&(x.a, x.b)));
        if order.is_ge() { x } else { y }
    }
}

#[derive(Debug)]
pub struct HierarchicalSolver {
    graph: Arc<ClassGraph>,
    objectives: Objectives,
    weights: Vec<f64>,
    target: Option<usize>,
}

impl HierarchicalSolver {
    pub fn new(
        graph: Arc<ClassGraph>,
        objectives: Objectives,
        weights: Vec<f64>,
        target: Option<usize>,
    ) -> crate::error::Result<Self> {
        if objectives.is_empty() {
            return Err(ConfigError::Invalid("at least one objective metric is required".into()).into());
        }
        if weights.len() != objectives.len() {
            return Err(ConfigError::Invalid(format!(
                "{} weights given for {} objectives",
                weights.len(),
                objectives.len()
            ))
            .into());
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(ConfigError::Invalid("weights must be finite".into()).into());
        }
        let classes = graph.clusterable_count();
        if let Some(target) = target {
            if target == 0 || (classes > 0 && target > classes) {
                return Err(ConfigError::Invalid(format!(
                    "target_clusters ({target}) must be within 1..={classes}"
                ))
                .into());
            }
        }
        Ok(Self {
            graph,
            objectives,
            weights,
            target,
        })
    }

    pub fn from_config(graph: Arc<ClassGraph>, config: &CleaveConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Self::new(
            graph,
            Objectives::from_kinds(&config.objectives.metrics),
            config.objectives.resolved_weights(),
            config.hierarchical.target_clusters,
        )
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// Weighted mean of objective values.
    #[allow(clippy::cast_precision_loss)]
    fn quality(&self, values: &[f64]) -> f64 {
        let weighted: f64 = self.weights.iter().zip(values).map(|(w, v)| w * v).sum();
        weighted / values.len() as f64
    }

    fn merged(current: &Clustering, a: usize, b: usize) -> Result<Clustering, ClusteringError> {
        let mut builder = current.to_builder();
        builder.merge_cluster(b, a)?;
        builder.build()
    }

    fn merge_quality(&self, current: &Clustering, a: usize, b: usize) -> Result<f64, ClusteringError> {
        let candidate = Self::merged(current, a, b)?;
        Ok(self.quality(&self.objectives.evaluate(&self.graph, &candidate)))
    }

    /// Best merge of the current state, independent of thread scheduling.
    fn best_merge(&self, current: &Clustering) -> crate::error::Result<Candidate> {
        let k = current.cluster_count();
        let best = (0..k)
            .into_par_iter()
            .flat_map_iter(|a| (a + 1..k).map(move |b| (a, b)))
            .map(|(a, b)| {
                self.merge_quality(current, a, b)
                    .map(|quality| Candidate { quality, a, b })
            })
            .try_reduce_with(|x, y| Ok(Candidate::better(x, y)));

        match best {
            Some(candidate) => Ok(candidate?),
            None => Err(SolveError::NoCandidate { clusters: k }.into()),
        }
    }

    fn snapshot(&self, clustering: &Clustering) -> Solution {
        let values = self.objectives.evaluate(&self.graph, clustering);
        let quality = self.quality(&values);
        Solution::from_clustering(&self.graph, clustering, values).with_quality(quality)
    }

    pub fn solve(&self) -> crate::error::Result<SolveOutcome> {
        self.solve_with_progress(&NoopReporter)
    }

    #[instrument(skip_all, name = "hierarchical_solve")]
    pub fn solve_with_progress(
        &self,
        progress: &dyn ProgressReporter,
    ) -> crate::error::Result<SolveOutcome> {
        let start = Instant::now();
        let classes = self.graph.clusterable_count();
        if classes == 0 {
            return Err(SolveError::InsufficientData("graph has no clusterable classes".into()).into());
        }

        info!(
            classes,
            target = ?self.target,
            objectives = ?self.objectives.names(),
            "Hierarchical search starting"
        );

        let data = Arc::new(OptimizationData::new());
        let mut current = Clustering::singletons(classes, Arc::clone(&data));
        let mut trajectory = Vec::new();
        let mut steps = 0usize;

        progress.merges_planned((classes - self.target.unwrap_or(1)) as u64);

        let outcome = loop {
            let solution = self.snapshot(&current);
            if self.target == Some(current.cluster_count()) {
                break SolveOutcome::Target(solution);
            }
            trajectory.push(solution);
            if current.cluster_count() == 1 {
                break SolveOutcome::Trajectory(trajectory);
            }

            let best = self.best_merge(&current)?;
            current = Self::merged(&current, best.a, best.b)?;
            steps += 1;

            let evicted = data.evict_if(|signature| !current.is_union_of_clusters(signature));
            debug!(
                step = steps,
                a = best.a,
                b = best.b,
                quality = best.quality,
                clusters = current.cluster_count(),
                evicted,
                "Merged clusters"
            );
            progress.merged(current.cluster_count());
        };

        progress.done();
        let stats = data.stats();
        info!(
            steps,
            clusters = current.cluster_count(),
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            cache_entries = stats.entries,
            elapsed_ms = start.elapsed().as_millis(),
            "Hierarchical search complete"
        );
        Ok(outcome)
    }
}

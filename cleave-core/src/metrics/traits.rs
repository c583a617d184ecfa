use cleave_graph::ClassGraph;

use crate::clustering::Clustering;

/// Common interface for all partition quality metrics.
///
/// Every metric is minimized by the search. Metrics that are naturally
/// maximized (cohesion) report their negation.
pub trait Metric: Send + Sync + std::fmt::Debug {
    /// Name used in logs and output.
    fn name(&self) -> &'static str;

    /// Score a clustering. Must return a finite value.
    fn score(&self, graph: &ClassGraph, clustering: &Clustering) -> f64;
}

// Structural metrics over dependency edges: cohesion, coupling, dynamic coupling.
//
// All three decompose into independent per-cluster terms, which are cached
// in the run's `OptimizationData` under the cluster signature.
#![allow(clippy::cast_precision_loss)]

use cleave_graph::ClassGraph;

use crate::clustering::Clustering;

use super::traits::Metric;
use super::{MetricKind, finite_or_zero, ratio};

/// Sum a per-cluster term over all clusters, consulting the run cache.
fn sum_cached(
    kind: MetricKind,
    clustering: &Clustering,
    term: impl Fn(usize) -> f64,
) -> f64 {
    let cache = clustering.optimization_data();
    (0..clustering.cluster_count())
        .map(|k| finite_or_zero(cache.get_or_compute(kind, &clustering.signature(k), || term(k))))
        .sum()
}

/// Outgoing dependencies of cluster `k` whose callee is not a member of `k`.
/// Callees that are not clusterable (data classes) are always outside.
fn outgoing<'g>(
    graph: &'g ClassGraph,
    clustering: &'g Clustering,
    k: usize,
) -> impl Iterator<Item = &'g cleave_graph::DependencyEdge> {
    clustering.members(k).iter().flat_map(move |&member| {
        graph
            .dependencies_of(member)
            .filter(move |(target, _)| target.is_none_or(|t| clustering.cluster_of(t) != k))
            .map(|(_, edge)| edge)
    })
}

// ── Cohesion ───────────────────────────────────────────────────────

/// Density of internal dependencies, negated.
///
/// For each cluster: distinct directed caller → callee pairs between two
/// different members, divided by the `size * (size - 1)` possible ordered
/// pairs. Call frequency is ignored. Singletons contribute 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cohesion;

impl Cohesion {
    fn cluster_density(graph: &ClassGraph, clustering: &Clustering, k: usize) -> f64 {
        let members = clustering.members(k);
        let size = members.len();
        if size < 2 {
            return 0.0;
        }
        let internal: usize = members
            .iter()
            .map(|&member| {
                graph
                    .dependencies_of(member)
                    .filter(|(target, _)| {
                        target.is_some_and(|t| t != member && clustering.cluster_of(t) == k)
                    })
                    .count()
            })
            .sum();
        ratio(internal, size * (size - 1))
    }
}

impl Metric for Cohesion {
    fn name(&self) -> &'static str {
        "cohesion"
    }

    fn score(&self, graph: &ClassGraph, clustering: &Clustering) -> f64 {
        let total = sum_cached(MetricKind::Cohesion, clustering, |k| {
            Self::cluster_density(graph, clustering, k)
        });
        // Subtracting from zero keeps an all-singleton score at +0.0.
        0.0 - total
    }
}

// ── Coupling ───────────────────────────────────────────────────────

/// Static call sites crossing cluster boundaries, summed over all clusters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Coupling;

impl Metric for Coupling {
    fn name(&self) -> &'static str {
        "coupling"
    }

    fn score(&self, graph: &ClassGraph, clustering: &Clustering) -> f64 {
        sum_cached(MetricKind::Coupling, clustering, |k| {
            outgoing(graph, clustering, k)
                .map(|edge| edge.static_calls as f64)
                .sum()
        })
    }
}

// ── Dynamic coupling ───────────────────────────────────────────────

/// Share of the graph's total call weight that crosses cluster boundaries.
///
/// Uses runtime call counts where the trace provided them and static call
/// sites otherwise. A graph without calls scores 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicCoupling;

impl Metric for DynamicCoupling {
    fn name(&self) -> &'static str {
        "dynamic-coupling"
    }

    fn score(&self, graph: &ClassGraph, clustering: &Clustering) -> f64 {
        let total = clustering.optimization_data().total_call_weight(graph);
        if total <= 0.0 {
            return 0.0;
        }
        let crossing = sum_cached(MetricKind::DynamicCoupling, clustering, |k| {
            outgoing(graph, clustering, k)
                .map(|edge| edge.call_weight() as f64)
                .sum()
        });
        finite_or_zero(crossing / total)
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cleave_graph::{ClassEntry, DependencyEntry, GraphDocument};

    use super::*;
    use crate::clustering::ClusteringBuilder;
    use crate::metrics::OptimizationData;

    fn partition(labels: &[usize], data: &Arc<OptimizationData>) -> Clustering {
        let mut b = ClusteringBuilder::new(labels.len(), Arc::clone(data));
        for (class, &label) in labels.iter().enumerate() {
            b.add_to_cluster(class, label).unwrap();
        }
        b.build().unwrap()
    }

    /// A ⇄ B, C isolated.
    fn pair_and_loner() -> ClassGraph {
        ClassGraph::from_document(&GraphDocument {
            classes: vec![
                ClassEntry::behavioral(1, "A").calls(2, 1),
                ClassEntry::behavioral(2, "B").calls(1, 1),
                ClassEntry::behavioral(3, "C"),
            ],
        })
        .unwrap()
    }

    #[test]
    fn mutual_pair_is_fully_cohesive() {
        let graph = pair_and_loner();
        let data = Arc::new(OptimizationData::new());
        let c = partition(&[0, 0, 1], &data);
        assert!((Cohesion.score(&graph, &c) + 1.0).abs() < 1e-12);
        assert!(Coupling.score(&graph, &c).abs() < 1e-12);
    }

    #[test]
    fn singletons_have_zero_cohesion() {
        let graph = pair_and_loner();
        let data = Arc::new(OptimizationData::new());
        let c = Clustering::singletons(3, data);
        let score = Cohesion.score(&graph, &c);
        assert!(score.is_finite());
        assert!(score.abs() < f64::EPSILON);
        assert!(score.is_sign_positive());
    }

    #[test]
    fn singletons_couple_every_call() {
        let graph = pair_and_loner();
        let data = Arc::new(OptimizationData::new());
        let c = Clustering::singletons(3, data);
        assert!((Coupling.score(&graph, &c) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn coupling_weights_by_static_calls_and_counts_data_callees() {
        let graph = ClassGraph::from_document(&GraphDocument {
            classes: vec![
                ClassEntry::behavioral(1, "A").calls(2, 4).calls(3, 1).calls(9, 2),
                ClassEntry::behavioral(2, "B"),
                ClassEntry::behavioral(3, "C"),
                ClassEntry::data(9, "Row"),
            ],
        })
        .unwrap();
        let data = Arc::new(OptimizationData::new());
        // {A, B} {C}: A→C (1) and A→Row (2) cross.
        let c = partition(&[0, 0, 1], &data);
        assert!((Coupling.score(&graph, &c) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn cohesion_density_over_ordered_pairs() {
        // Three members, A→B, B→C, C→A: 3 of 6 ordered pairs.
        let graph = ClassGraph::from_document(&GraphDocument {
            classes: vec![
                ClassEntry::behavioral(1, "A").calls(2, 10),
                ClassEntry::behavioral(2, "B").calls(3, 1),
                ClassEntry::behavioral(3, "C").calls(1, 1),
            ],
        })
        .unwrap();
        let data = Arc::new(OptimizationData::new());
        let c = partition(&[0, 0, 0], &data);
        assert!((Cohesion.score(&graph, &c) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn self_calls_do_not_count_as_internal_pairs() {
        let graph = ClassGraph::from_document(&GraphDocument {
            classes: vec![
                ClassEntry::behavioral(1, "A").calls(1, 3).calls(2, 1),
                ClassEntry::behavioral(2, "B"),
            ],
        })
        .unwrap();
        let data = Arc::new(OptimizationData::new());
        let c = partition(&[0, 0], &data);
        assert!((Cohesion.score(&graph, &c) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn dynamic_coupling_prefers_runtime_counts() {
        let mut traced = DependencyEntry::new(2, 1);
        traced.dynamic_calls = Some(30);
        let mut a = ClassEntry::behavioral(1, "A");
        a.dependencies.push(traced);
        let graph = ClassGraph::from_document(&GraphDocument {
            classes: vec![a, ClassEntry::behavioral(2, "B").calls(1, 10)],
        })
        .unwrap();
        let data = Arc::new(OptimizationData::new());

        let apart = Clustering::singletons(2, Arc::clone(&data));
        assert!((DynamicCoupling.score(&graph, &apart) - 1.0).abs() < 1e-12);

        let together = partition(&[0, 0], &data);
        assert!(DynamicCoupling.score(&graph, &together).abs() < 1e-12);
    }

    #[test]
    fn dynamic_coupling_without_calls_is_zero() {
        let graph = ClassGraph::from_document(&GraphDocument {
            classes: vec![ClassEntry::behavioral(1, "A"), ClassEntry::behavioral(2, "B")],
        })
        .unwrap();
        let c = Clustering::singletons(2, Arc::new(OptimizationData::new()));
        let score = DynamicCoupling.score(&graph, &c);
        assert!(score.is_finite());
        assert!(score.abs() < f64::EPSILON);
    }

    #[test]
    fn identical_clusters_are_scored_once_across_clusterings() {
        let graph = pair_and_loner();
        let data = Arc::new(OptimizationData::new());
        let first = partition(&[0, 0, 1], &data);
        let second = partition(&[1, 1, 0], &data);

        let a = Coupling.score(&graph, &first);
        let misses_after_first = data.stats().misses;
        let b = Coupling.score(&graph, &second);

        assert!((a - b).abs() < f64::EPSILON);
        assert_eq!(data.stats().misses, misses_after_first);
        assert_eq!(data.stats().hits, 2);
    }
}

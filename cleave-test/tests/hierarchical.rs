use std::sync::Arc;

use cleave_core::config::CleaveConfig;
use cleave_core::hierarchical::{HierarchicalSolver, SolveOutcome};
use cleave_core::metrics::{MetricKind, Objectives};
use cleave_core::progress::IndicatifReporter;
use cleave_test::{chain, config, graph_from, partition_ids, shop};

use cleave_graph::ClassEntry;

// ── Module recovery ──────────────────────────────────────────────

#[test]
fn shop_modules_are_recovered() {
    let solver = HierarchicalSolver::from_config(
        shop(),
        &config("[hierarchical]\ntarget_clusters = 3\n"),
    )
    .unwrap();
    let SolveOutcome::Target(solution) = solver.solve().unwrap() else {
        panic!("expected a target solution");
    };

    assert_eq!(
        partition_ids(&solution),
        vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]
    );
    assert_eq!(solution.objectives.len(), 2);
    // The only remaining dependency between modules is BillingService → OrderService.
    assert!((solution.objectives[1] - 1.0).abs() < f64::EPSILON);
}

#[test]
fn four_singletons_reach_two_clusters_in_two_merges() {
    let graph = graph_from(
        (0..4)
            .map(|i| ClassEntry::behavioral(i, format!("C{i}")))
            .collect(),
    );
    let solver = HierarchicalSolver::from_config(
        graph,
        &config("[hierarchical]\ntarget_clusters = 2\n"),
    )
    .unwrap();
    let reporter = IndicatifReporter::hidden();

    let outcome = solver.solve_with_progress(&reporter).unwrap();

    assert_eq!(reporter.completed(), 2);
    assert_eq!(outcome.solutions().len(), 1);
    assert_eq!(outcome.solutions()[0].microservices.len(), 2);
}

// ── Trajectory ───────────────────────────────────────────────────

#[test]
fn trajectory_shrinks_by_one_cluster_per_step() {
    let solver = HierarchicalSolver::from_config(chain(8), &CleaveConfig::default()).unwrap();
    let SolveOutcome::Trajectory(steps) = solver.solve().unwrap() else {
        panic!("expected a trajectory");
    };

    assert_eq!(steps.len(), 8);
    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step.cluster_count(), 8 - i);
        let members: usize = step.microservices.iter().map(|m| m.classes.len()).sum();
        assert_eq!(members, 8, "step {i} lost classes");
        assert!(step.quality.is_some());
    }
}

#[test]
fn trajectory_only_ever_merges() {
    let solver = HierarchicalSolver::from_config(shop(), &CleaveConfig::default()).unwrap();
    let outcome = solver.solve().unwrap();
    let steps = outcome.solutions();

    for pair in steps.windows(2) {
        let before = partition_ids(&pair[0]);
        let after = partition_ids(&pair[1]);
        // Every earlier cluster is contained in some later cluster.
        for cluster in &before {
            assert!(
                after
                    .iter()
                    .any(|bigger| cluster.iter().all(|id| bigger.contains(id))),
                "{cluster:?} was split"
            );
        }
    }
}

// ── Determinism ──────────────────────────────────────────────────

#[test]
fn solutions_are_identical_across_thread_pools() {
    let kinds = [
        MetricKind::Cohesion,
        MetricKind::Coupling,
        MetricKind::DynamicCoupling,
        MetricKind::SizeBalance,
        MetricKind::DataSharing,
    ];
    let run = |threads: usize| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
            .install(|| {
                HierarchicalSolver::new(shop(), Objectives::from_kinds(&kinds), vec![-1.0; 5], None)
                    .unwrap()
                    .solve()
                    .unwrap()
            })
    };

    let reference = run(1);
    for threads in [2, 4, 8] {
        assert_eq!(run(threads), reference, "{threads} threads");
    }
}

#[test]
fn weights_steer_the_search() {
    // Pure size balance prefers evenly sized clusters over module boundaries.
    let graph = chain(6);
    let solver = HierarchicalSolver::new(
        Arc::clone(&graph),
        Objectives::from_kinds(&[MetricKind::SizeBalance]),
        vec![-1.0],
        Some(3),
    )
    .unwrap();
    let SolveOutcome::Target(solution) = solver.solve().unwrap() else {
        panic!("expected a target solution");
    };
    assert!(solution.microservices.iter().all(|m| m.classes.len() == 2));
}

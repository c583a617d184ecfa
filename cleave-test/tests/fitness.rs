use std::sync::Arc;

use cleave_core::codec::GenomeCodec;
use cleave_core::config::CleaveConfig;
use cleave_core::fitness::{Feasibility, FitnessEvaluator, FitnessFunction};
use cleave_core::metrics::{Objectives, OptimizationData};
use cleave_core::solution::non_dominated;
use cleave_test::{config, shop};

fn genomes(count: usize, len: usize) -> Vec<Vec<usize>> {
    (0..count)
        .map(|seed| (0..len).map(|i| (i * 7 + seed * 3 + i * seed) % 4).collect())
        .collect()
}

// ── Concurrency ──────────────────────────────────────────────────

#[test]
fn concurrent_callers_see_sequential_results() {
    let cfg = config("[objectives]\nmetrics = [\"cohesion\", \"coupling\", \"dynamic-coupling\"]\n");
    let shared = Arc::new(FitnessEvaluator::new(shop(), &cfg).unwrap());
    let population = genomes(200, shared.genome_len());

    let expected: Vec<_> = {
        let fresh = FitnessEvaluator::new(shop(), &cfg).unwrap();
        population.iter().map(|g| fresh.evaluate(g).unwrap()).collect()
    };

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let shared = Arc::clone(&shared);
            let population = &population;
            let expected = &expected;
            scope.spawn(move || {
                for (i, genome) in population.iter().enumerate().skip(worker) {
                    assert_eq!(&shared.evaluate(genome).unwrap(), &expected[i], "genome {i}");
                }
            });
        }
    });

    let stats = shared.optimization_data().stats();
    assert!(stats.hits > 0);
}

#[test]
fn eviction_racing_with_evaluation_never_changes_results() {
    let evaluator = Arc::new(FitnessEvaluator::new(shop(), &CleaveConfig::default()).unwrap());
    let population = genomes(100, evaluator.genome_len());
    let expected: Vec<_> = population
        .iter()
        .map(|g| evaluator.evaluate(g).unwrap())
        .collect();

    std::thread::scope(|scope| {
        let data = Arc::clone(evaluator.optimization_data());
        scope.spawn(move || {
            for _ in 0..2_000 {
                data.evict_if(|signature| signature.len() % 2 == 0);
            }
        });

        for _ in 0..4 {
            let evaluator = Arc::clone(&evaluator);
            let population = &population;
            let expected = &expected;
            scope.spawn(move || {
                for _ in 0..5 {
                    for (genome, want) in population.iter().zip(expected) {
                        assert_eq!(&evaluator.evaluate(genome).unwrap(), want);
                    }
                }
            });
        }
    });
}

#[test]
fn population_evaluation_preserves_order() {
    let evaluator = FitnessEvaluator::new(
        shop(),
        &config("[constraints]\nmin_clusters = 2\nmax_clusters = 3\n"),
    )
    .unwrap();
    let population = genomes(50, evaluator.genome_len());

    let results = evaluator.evaluate_population(&population);
    assert_eq!(results.len(), population.len());
    for (genome, result) in population.iter().zip(results) {
        let evaluation = result.unwrap();
        assert_eq!(evaluation, evaluator.evaluate(genome).unwrap());
        assert_eq!(
            evaluation.is_feasible(),
            (2..=3).contains(&evaluation.cluster_count)
        );
    }
}

// ── Optimizer output ─────────────────────────────────────────────

#[test]
fn non_dominated_front_of_feasible_realizations() {
    let evaluator = FitnessEvaluator::new(
        shop(),
        &config("[constraints]\nmin_clusters = 3\nmax_clusters = 3\n"),
    )
    .unwrap();
    let population = vec![
        vec![0, 0, 0, 1, 1, 1, 2, 2, 2],
        vec![0, 1, 2, 0, 1, 2, 0, 1, 2],
        vec![0, 0, 1, 1, 1, 2, 2, 2, 2],
        vec![0, 0, 0, 0, 0, 0, 0, 0, 0],
    ];

    let feasible: Vec<_> = population
        .iter()
        .filter(|g| evaluator.evaluate(g).unwrap().is_feasible())
        .map(|g| evaluator.realize(g).unwrap())
        .collect();
    assert_eq!(feasible.len(), 3);

    let front = non_dominated(&feasible);
    assert_eq!(front.len(), 1);
    assert_eq!(front[0].objectives, feasible[0].objectives);
}

// ── Properties ───────────────────────────────────────────────────

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn cached_objectives_match_uncached(
            genome in proptest::collection::vec(0usize..9, 9),
            min in 1usize..4,
            span in 0usize..6,
        ) {
            let mut cfg = CleaveConfig::default();
            cfg.constraints.min_clusters = Some(min);
            cfg.constraints.max_clusters = Some(min + span);
            let graph = shop();
            let evaluator = FitnessEvaluator::new(Arc::clone(&graph), &cfg).unwrap();

            // Warm the cache with an unrelated genome first.
            evaluator.evaluate(&[0, 0, 0, 1, 1, 1, 2, 2, 2]).unwrap();
            let evaluation = evaluator.evaluate(&genome).unwrap();

            let clustering = GenomeCodec::new(cfg.codec.encoding, 9)
                .decode(&genome, Arc::new(OptimizationData::new()))
                .unwrap();
            prop_assert_eq!(evaluation.cluster_count, clustering.cluster_count());
            prop_assert_eq!(
                evaluation.feasibility,
                Feasibility::check(clustering.cluster_count(), Some(min), Some(min + span))
            );
            if evaluation.is_feasible() {
                let uncached = Objectives::from_kinds(&cfg.objectives.metrics).evaluate(&graph, &clustering);
                prop_assert_eq!(evaluation.objectives, uncached);
            } else {
                prop_assert!(evaluation.feasibility.violation() < 0.0);
            }
        }
    }
}

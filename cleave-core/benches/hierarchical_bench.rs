// Benchmark the hierarchical solver and population evaluation on synthetic class graphs.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use cleave_core::config::CleaveConfig;
use cleave_core::fitness::FitnessEvaluator;
use cleave_core::hierarchical::HierarchicalSolver;
use cleave_graph::{ClassEntry, ClassGraph, GraphDocument};

/// Build a sparse call graph: class `i` calls `(i * prime + 1) % n` for a few primes.
fn synthetic_graph(class_count: u64) -> Arc<ClassGraph> {
    let classes = (0..class_count)
        .map(|i| {
            [7, 13, 31].iter().fold(
                ClassEntry::behavioral(i, format!("C{i}")),
                |entry, &prime| {
                    let target = (i * prime + 1) % class_count;
                    if target == i { entry } else { entry.calls(target, 1 + i % 3) }
                },
            )
        })
        .collect();
    Arc::new(ClassGraph::from_document(&GraphDocument { classes }).expect("valid synthetic graph"))
}

fn bench_hierarchical(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchical");
    group.sample_size(10);

    for class_count in [16, 32, 64] {
        let graph = synthetic_graph(class_count);
        let mut config = CleaveConfig::default();
        config.hierarchical.target_clusters = Some(4);

        group.bench_with_input(BenchmarkId::new("classes", class_count), &graph, |b, g| {
            b.iter(|| {
                HierarchicalSolver::from_config(Arc::clone(g), &config)
                    .expect("valid solver")
                    .solve()
                    .expect("solve succeeds")
            });
        });
    }

    group.finish();
}

fn bench_population(c: &mut Criterion) {
    let mut group = c.benchmark_group("population");

    for class_count in [100u64, 500] {
        let graph = synthetic_graph(class_count);
        let n = usize::try_from(class_count).expect("small class count");
        let genomes: Vec<Vec<usize>> = (0..100)
            .map(|seed| (0..n).map(|i| (i * 31 + seed) % 10).collect())
            .collect();

        group.bench_with_input(BenchmarkId::new("classes", class_count), &genomes, |b, pop| {
            b.iter(|| {
                let evaluator =
                    FitnessEvaluator::new(Arc::clone(&graph), &CleaveConfig::default())
                        .expect("valid evaluator");
                evaluator.evaluate_population(pop)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hierarchical, bench_population);
criterion_main!(benches);

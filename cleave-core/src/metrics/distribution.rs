// Whole-partition metrics: size balance and shared data ownership.
//
// Neither decomposes into independent per-cluster terms, so neither is
// cached.
#![allow(clippy::cast_precision_loss)]

use std::collections::{HashMap, HashSet};

use cleave_graph::{ClassGraph, ClassId};

use crate::clustering::Clustering;

use super::finite_or_zero;
use super::traits::Metric;

/// Sample standard deviation of cluster member counts.
///
/// A partition with at most one cluster has no spread and scores 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeBalance;

impl SizeBalance {
    fn sample_std_dev(samples: &[f64]) -> f64 {
        if samples.len() <= 1 {
            return 0.0;
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        finite_or_zero(variance.sqrt())
    }
}

impl Metric for SizeBalance {
    fn name(&self) -> &'static str {
        "size-balance"
    }

    fn score(&self, _graph: &ClassGraph, clustering: &Clustering) -> f64 {
        let sizes: Vec<f64> = clustering.clusters().map(|m| m.len() as f64).collect();
        Self::sample_std_dev(&sizes)
    }
}

/// Number of data classes accessed from more than one cluster.
///
/// Each such data class would need a shared database or an owning service
/// with remote access in the resulting architecture.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataSharing;

impl Metric for DataSharing {
    fn name(&self) -> &'static str {
        "data-sharing"
    }

    fn score(&self, graph: &ClassGraph, clustering: &Clustering) -> f64 {
        let mut owners: HashMap<ClassId, usize> = HashMap::new();
        for members in clustering.clusters() {
            let touched: HashSet<ClassId> = members
                .iter()
                .flat_map(|&member| graph.data_accesses_of(member).map(|(id, _)| id))
                .collect();
            for id in touched {
                *owners.entry(id).or_default() += 1;
            }
        }
        owners.values().filter(|&&clusters| clusters > 1).count() as f64
    }
}

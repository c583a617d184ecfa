// Realized decompositions: microservices plus the objective values they scored.

use cleave_graph::{ClassGraph, ClassId};
use serde::{Deserialize, Serialize};

use crate::clustering::Clustering;

/// One cluster of a scored decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Microservice {
    pub id: usize,
    pub classes: Vec<ClassId>,
}

/// A scored decomposition, as handed to persistence and API collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Objective values in configured order (all minimized).
    pub objectives: Vec<f64>,
    /// Weighted quality, when produced by the hierarchical solver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    pub microservices: Vec<Microservice>,
}

impl Solution {
    /// Realize `clustering` against the graph's class ids.
    pub fn from_clustering(graph: &ClassGraph, clustering: &Clustering, objectives: Vec<f64>) -> Self {
        let microservices = clustering
            .clusters()
            .enumerate()
            .map(|(id, members)| Microservice {
                id,
                classes: members.iter().map(|&m| graph.clusterable_id(m)).collect(),
            })
            .collect();
        Self {
            objectives,
            quality: None,
            microservices,
        }
    }

    #[must_use]
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn cluster_count(&self) -> usize {
        self.microservices.len()
    }
}

/// Pareto dominance under minimization: `a` is no worse everywhere and
/// strictly better somewhere.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| x <= y)
        && a.iter().zip(b).any(|(x, y)| x < y)
}

/// Solutions not dominated by any other, in input order.
pub fn non_dominated(solutions: &[Solution]) -> Vec<Solution> {
    solutions
        .iter()
        .filter(|candidate| {
            !solutions
                .iter()
                .any(|other| dominates(&other.objectives, &candidate.objectives))
        })
        .cloned()
        .collect()
}

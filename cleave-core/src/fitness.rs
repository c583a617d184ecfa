//! Fitness boundary for an external multi-objective optimizer.
//!
//! The optimizer owns its population and operators; it only calls
//! [`FitnessFunction::evaluate`] once per genome, possibly from many threads
//! at once. Evaluation decodes the genome, checks the cluster-count bounds
//! and, for feasible genomes only, scores every configured objective.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use cleave_graph::ClassGraph;

use crate::codec::GenomeCodec;
use crate::config::CleaveConfig;
use crate::metrics::{Objectives, OptimizationData};
use crate::solution::Solution;

/// Whether a decoded genome respects the configured cluster-count bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    Feasible,
    TooFewClusters { found: usize, min: usize },
    TooManyClusters { found: usize, max: usize },
}

impl Feasibility {
    pub fn check(found: usize, min: Option<usize>, max: Option<usize>) -> Self {
        match (min, max) {
            (Some(min), _) if found < min => Self::TooFewClusters { found, min },
            (_, Some(max)) if found > max => Self::TooManyClusters { found, max },
            _ => Self::Feasible,
        }
    }

    pub fn is_feasible(self) -> bool {
        self == Self::Feasible
    }

    /// Overall constraint violation: 0 when feasible, otherwise the negated
    /// distance to the nearest bound.
    #[allow(clippy::cast_precision_loss)]
    pub fn violation(self) -> f64 {
        match self {
            Self::Feasible => 0.0,
            Self::TooFewClusters { found, min } => -((min - found) as f64),
            Self::TooManyClusters { found, max } => -((found - max) as f64),
        }
    }
}

/// Outcome of evaluating one genome.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub feasibility: Feasibility,
    /// Objective values in configured order; empty for infeasible genomes.
    pub objectives: Vec<f64>,
    pub cluster_count: usize,
}

impl Evaluation {
    pub fn is_feasible(&self) -> bool {
        self.feasibility.is_feasible()
    }
}

/// The contract an external search engine programs against.
pub trait FitnessFunction: Send + Sync {
    /// Number of genes per genome.
    fn genome_len(&self) -> usize;

    /// Exclusive upper bound of each gene.
    fn gene_upper_bound(&self) -> usize;

    fn objective_count(&self) -> usize;

    fn evaluate(&self, genome: &[usize]) -> crate::error::Result<Evaluation>;
}

/// [`FitnessFunction`] over one graph and configuration.
///
/// Nothing but the shared [`OptimizationData`] changes after construction.
#[derive(Debug)]
pub struct FitnessEvaluator {
    graph: Arc<ClassGraph>,
    codec: GenomeCodec,
    objectives: Objectives,
    min_clusters: Option<usize>,
    max_clusters: Option<usize>,
    data: Arc<OptimizationData>,
}

impl FitnessEvaluator {
    pub fn new(graph: Arc<ClassGraph>, config: &CleaveConfig) -> crate::error::Result<Self> {
        config.validate()?;
        let codec = GenomeCodec::new(config.codec.encoding, graph.clusterable_count())
            .with_max_clusters(config.constraints.max_clusters);
        Ok(Self {
            graph,
            codec,
            objectives: Objectives::from_kinds(&config.objectives.metrics),
            min_clusters: config.constraints.min_clusters,
            max_clusters: config.constraints.max_clusters,
            data: Arc::new(OptimizationData::new()),
        })
    }

    pub fn codec(&self) -> &GenomeCodec {
        &self.codec
    }

    pub fn optimization_data(&self) -> &Arc<OptimizationData> {
        &self.data
    }

    /// Evaluate a whole generation in parallel, preserving input order.
    pub fn evaluate_population(&self, genomes: &[Vec<usize>]) -> Vec<crate::error::Result<Evaluation>> {
        let results: Vec<_> = genomes
            .par_iter()
            .map(|genome| self.evaluate(genome))
            .collect();
        debug!(
            genomes = genomes.len(),
            feasible = results
                .iter()
                .filter(|r| r.as_ref().is_ok_and(Evaluation::is_feasible))
                .count(),
            cache_entries = self.data.len(),
            "Evaluated population"
        );
        results
    }

    /// Decode and score a genome regardless of feasibility.
    pub fn realize(&self, genome: &[usize]) -> crate::error::Result<Solution> {
        let clustering = self.codec.decode(genome, Arc::clone(&self.data))?;
        let values = self.objectives.evaluate(&self.graph, &clustering);
        Ok(Solution::from_clustering(&self.graph, &clustering, values))
    }
}

impl FitnessFunction for FitnessEvaluator {
    fn genome_len(&self) -> usize {
        self.codec.genome_len()
    }

    fn gene_upper_bound(&self) -> usize {
        self.codec.gene_upper_bound()
    }

    fn objective_count(&self) -> usize {
        self.objectives.len()
    }

    fn evaluate(&self, genome: &[usize]) -> crate::error::Result<Evaluation> {
        let clustering = self.codec.decode(genome, Arc::clone(&self.data))?;
        let cluster_count = clustering.cluster_count();
        let feasibility = Feasibility::check(cluster_count, self.min_clusters, self.max_clusters);

        let objectives = if feasibility.is_feasible() {
            self.objectives.evaluate(&self.graph, &clustering)
        } else {
            Vec::new()
        };
        Ok(Evaluation {
            feasibility,
            objectives,
            cluster_count,
        })
    }
}

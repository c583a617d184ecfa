//! Cleave core library: genome decoding, partition metrics, and the
//! hierarchical and fitness-driven searches for microservice candidates.
//!
//! The two entry points are [`hierarchical::HierarchicalSolver`], which
//! greedily merges clusters of a [`cleave_graph::ClassGraph`], and
//! [`fitness::FitnessEvaluator`], which scores genomes on behalf of an
//! external multi-objective optimizer.

pub mod clustering;
pub mod codec;
pub mod config;
pub mod error;
pub mod fitness;
pub mod hierarchical;
pub mod metrics;
pub mod progress;
pub mod solution;

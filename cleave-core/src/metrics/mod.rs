pub mod cache;
pub mod distribution;
pub mod structural;
pub mod traits;

use cleave_graph::ClassGraph;
use serde::{Deserialize, Serialize};

use crate::clustering::Clustering;

pub use cache::{CacheStats, OptimizationData};
pub use distribution::{DataSharing, SizeBalance};
pub use structural::{Cohesion, Coupling, DynamicCoupling};
pub use traits::Metric;

/// Built-in metrics, selectable from configuration.
///
/// Also the family key of cached per-cluster values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    Cohesion,
    Coupling,
    DynamicCoupling,
    SizeBalance,
    DataSharing,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cohesion => "cohesion",
            Self::Coupling => "coupling",
            Self::DynamicCoupling => "dynamic-coupling",
            Self::SizeBalance => "size-balance",
            Self::DataSharing => "data-sharing",
        }
    }

    /// Instantiate the metric this kind names.
    pub fn metric(self) -> Box<dyn Metric> {
        match self {
            Self::Cohesion => Box::new(Cohesion),
            Self::Coupling => Box::new(Coupling),
            Self::DynamicCoupling => Box::new(DynamicCoupling),
            Self::SizeBalance => Box::new(SizeBalance),
            Self::DataSharing => Box::new(DataSharing),
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replace a non-finite metric value with 0.
///
/// Degenerate inputs (empty denominators, too few samples) must never leak
/// NaN or infinity into an objective sum.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Ordered list of configured objectives.
#[derive(Debug)]
pub struct Objectives {
    metrics: Vec<Box<dyn Metric>>,
}

impl Objectives {
    pub fn new(metrics: Vec<Box<dyn Metric>>) -> Self {
        Self { metrics }
    }

    pub fn from_kinds(kinds: &[MetricKind]) -> Self {
        Self::new(kinds.iter().map(|kind| kind.metric()).collect())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    /// Score `clustering` under every objective, in configured order.
    pub fn evaluate(&self, graph: &ClassGraph, clustering: &Clustering) -> Vec<f64> {
        self.metrics
            .iter()
            .map(|metric| finite_or_zero(metric.score(graph, clustering)))
            .collect()
    }
}

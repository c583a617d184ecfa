use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::Encoding;
use crate::error::ConfigError;
use crate::metrics::MetricKind;

/// Top-level cleave configuration, matching `cleave.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaveConfig {
    #[serde(default)]
    pub codec: CodecSection,
    #[serde(default)]
    pub constraints: ConstraintsSection,
    #[serde(default)]
    pub objectives: ObjectivesSection,
    #[serde(default)]
    pub hierarchical: HierarchicalSection,
    #[serde(default)]
    pub search: SearchSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodecSection {
    #[serde(default)]
    pub encoding: Encoding,
}

/// Feasible cluster-count range for the fitness boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstraintsSection {
    pub min_clusters: Option<usize>,
    pub max_clusters: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectivesSection {
    pub metrics: Vec<MetricKind>,
    /// Per-metric weights for the hierarchical quality function.
    pub weights: Option<Vec<f64>>,
}

impl Default for ObjectivesSection {
    fn default() -> Self {
        Self {
            metrics: vec![MetricKind::Cohesion, MetricKind::Coupling],
            weights: None,
        }
    }
}

impl ObjectivesSection {
    /// Configured weights, or `-1.0` per metric.
    ///
    /// Metrics are minimized while the solver maximizes quality, so the
    /// neutral weighting is negative.
    pub fn resolved_weights(&self) -> Vec<f64> {
        self.weights
            .clone()
            .unwrap_or_else(|| vec![-1.0; self.metrics.len()])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchicalSection {
    pub target_clusters: Option<usize>,
}

/// Run limits handed to the external optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSection {
    pub max_evaluations: Option<u64>,
    pub max_wall_time_secs: Option<u64>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            max_evaluations: Some(25_000),
            max_wall_time_secs: None,
        }
    }
}

impl CleaveConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject configurations that cannot describe a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ConstraintsSection {
            min_clusters,
            max_clusters,
        } = self.constraints;

        if min_clusters == Some(0) {
            return Err(ConfigError::Invalid("min_clusters must be positive".into()));
        }
        if max_clusters == Some(0) {
            return Err(ConfigError::Invalid("max_clusters must be positive".into()));
        }
        if let (Some(min), Some(max)) = (min_clusters, max_clusters) {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "min_clusters ({min}) exceeds max_clusters ({max})"
                )));
            }
        }

        if self.objectives.metrics.is_empty() {
            return Err(ConfigError::Invalid("at least one objective metric is required".into()));
        }
        if let Some(weights) = &self.objectives.weights {
            if weights.len() != self.objectives.metrics.len() {
                return Err(ConfigError::Invalid(format!(
                    "{} weights given for {} metrics",
                    weights.len(),
                    self.objectives.metrics.len()
                )));
            }
            if weights.iter().any(|w| !w.is_finite()) {
                return Err(ConfigError::Invalid("weights must be finite".into()));
            }
        }

        if self.hierarchical.target_clusters == Some(0) {
            return Err(ConfigError::Invalid("target_clusters must be positive".into()));
        }
        if self.search.max_evaluations == Some(0) {
            return Err(ConfigError::Invalid("max_evaluations must be positive".into()));
        }
        if self.search.max_wall_time_secs == Some(0) {
            return Err(ConfigError::Invalid("max_wall_time_secs must be positive".into()));
        }
        Ok(())
    }
}

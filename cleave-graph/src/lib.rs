//! Class dependency graph model for cleave.
//!
//! The graph is produced by external collaborators (static analysis, runtime
//! profiling, commit mining) and handed to the core as a [`GraphDocument`].
//! [`ClassGraph`] validates the document once and is read-only afterwards.

pub mod document;
pub mod graph;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use document::{ClassEntry, DataAccessEntry, DependencyEntry, GraphDocument};
pub use graph::ClassGraph;

/// Error type for graph construction.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("Duplicate class id: {0}")]
    DuplicateClass(ClassId),

    #[error("Unknown class id {target} referenced from {source_id}")]
    UnknownClass { source_id: ClassId, target: ClassId },

    #[error("Invalid edge {source_id} -> {target}: {reason}")]
    InvalidEdge {
        source_id: ClassId,
        target: ClassId,
        reason: String,
    },

    #[error("Malformed graph document: {0}")]
    Document(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

// ── Identity ───────────────────────────────────────────────────────

/// Stable identity of a class, assigned by the graph producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u64);

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ClassId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ── Nodes ──────────────────────────────────────────────────────────

/// Role of a class in the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    /// Entity/value class. Never clustered on its own; reached through data-access edges.
    Data,
    /// Class carrying behavior. These are the clusterable classes.
    #[default]
    Behavioral,
}

/// A class in the input graph.
///
/// Equality and hashing use `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassNode {
    pub id: ClassId,
    pub name: String,
    /// Retained size in bytes, when runtime profiling supplied one.
    pub size_bytes: Option<u64>,
    pub kind: ClassKind,
}

impl ClassNode {
    pub fn is_clusterable(&self) -> bool {
        self.kind == ClassKind::Behavioral
    }
}

impl PartialEq for ClassNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassNode {}

impl std::hash::Hash for ClassNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ── Edges ──────────────────────────────────────────────────────────

/// Caller → callee dependency. The caller owns the edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Number of static call sites.
    pub static_calls: u64,
    /// Calls observed at runtime, if a trace was available.
    pub dynamic_calls: Option<u64>,
    /// Distinct calling methods in the caller.
    pub calling_methods: u32,
    /// Per calling method frequency breakdown.
    pub method_frequencies: Option<BTreeMap<String, u64>>,
}

impl DependencyEdge {
    /// Runtime call count when known, static call sites otherwise.
    pub fn call_weight(&self) -> u64 {
        self.dynamic_calls.unwrap_or(self.static_calls)
    }

    /// Fold a repeated declaration of the same caller → callee pair into this edge.
    fn absorb(&mut self, other: DependencyEdge) {
        self.static_calls += other.static_calls;
        self.dynamic_calls = match (self.dynamic_calls, other.dynamic_calls) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0) + b.unwrap_or(0)),
        };
        self.calling_methods += other.calling_methods;
        if let Some(extra) = other.method_frequencies {
            let freqs = self.method_frequencies.get_or_insert_with(BTreeMap::new);
            for (method, count) in extra {
                *freqs.entry(method).or_default() += count;
            }
        }
    }
}

/// Behavioral class → data class access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAccessEdge {
    pub accesses: u64,
}

/// Edge weight stored in the arena graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassEdge {
    Dependency(DependencyEdge),
    DataAccess(DataAccessEdge),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_node_equality_is_by_id() {
        let a = ClassNode {
            id: ClassId(7),
            name: "OrderService".into(),
            size_bytes: Some(1024),
            kind: ClassKind::Behavioral,
        };
        let b = ClassNode {
            id: ClassId(7),
            name: "Renamed".into(),
            size_bytes: None,
            kind: ClassKind::Data,
        };
        assert_eq!(a, b);
    }

    #[test]
    fn call_weight_prefers_dynamic_count() {
        let mut edge = DependencyEdge {
            static_calls: 3,
            ..Default::default()
        };
        assert_eq!(edge.call_weight(), 3);
        edge.dynamic_calls = Some(40);
        assert_eq!(edge.call_weight(), 40);
    }

    #[test]
    fn absorb_sums_counts() {
        let mut edge = DependencyEdge {
            static_calls: 2,
            dynamic_calls: None,
            calling_methods: 1,
            method_frequencies: Some(BTreeMap::from([("place".to_string(), 2)])),
        };
        edge.absorb(DependencyEdge {
            static_calls: 1,
            dynamic_calls: Some(5),
            calling_methods: 1,
            method_frequencies: Some(BTreeMap::from([
                ("place".to_string(), 1),
                ("cancel".to_string(), 4),
            ])),
        });
        assert_eq!(edge.static_calls, 3);
        assert_eq!(edge.dynamic_calls, Some(5));
        assert_eq!(edge.calling_methods, 2);
        let freqs = edge.method_frequencies.unwrap();
        assert_eq!(freqs["place"], 3);
        assert_eq!(freqs["cancel"], 4);
    }

    #[test]
    fn class_kind_serde_names() {
        assert_eq!(serde_json::to_string(&ClassKind::Data).unwrap(), "\"data\"");
        let back: ClassKind = serde_json::from_str("\"behavioral\"").unwrap();
        assert_eq!(back, ClassKind::Behavioral);
    }
}

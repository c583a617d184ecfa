// Serialized graph document: the hand-off format of the graph producers.
//
// Edges reference their targets by class id; resolution and validation
// happen in `ClassGraph::from_document`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ClassId, ClassKind, DataAccessEdge, DependencyEdge};

/// Top-level graph document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_accesses: Vec<DataAccessEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub target: ClassId,
    #[serde(default = "one")]
    pub static_calls: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_calls: Option<u64>,
    #[serde(default = "one_u32")]
    pub calling_methods: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_frequencies: Option<BTreeMap<String, u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataAccessEntry {
    pub target: ClassId,
    #[serde(default = "one")]
    pub accesses: u64,
}

fn one() -> u64 {
    1
}

fn one_u32() -> u32 {
    1
}

impl DependencyEntry {
    /// Shorthand for a dependency with `static_calls` call sites from one method.
    pub fn new(target: u64, static_calls: u64) -> Self {
        Self {
            target: ClassId(target),
            static_calls,
            dynamic_calls: None,
            calling_methods: 1,
            method_frequencies: None,
        }
    }

    pub(crate) fn to_edge(&self) -> DependencyEdge {
        DependencyEdge {
            static_calls: self.static_calls,
            dynamic_calls: self.dynamic_calls,
            calling_methods: self.calling_methods,
            method_frequencies: self.method_frequencies.clone(),
        }
    }
}

impl DataAccessEntry {
    pub(crate) fn to_edge(&self) -> DataAccessEdge {
        DataAccessEdge {
            accesses: self.accesses,
        }
    }
}

impl ClassEntry {
    /// A behavioral class with no edges yet.
    pub fn behavioral(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ClassId(id),
            name: name.into(),
            kind: ClassKind::Behavioral,
            size_bytes: None,
            dependencies: Vec::new(),
            data_accesses: Vec::new(),
        }
    }

    /// A data class with no edges yet.
    pub fn data(id: u64, name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Data,
            ..Self::behavioral(id, name)
        }
    }

    #[must_use]
    pub fn calls(mut self, target: u64, static_calls: u64) -> Self {
        self.dependencies
            .push(DependencyEntry::new(target, static_calls));
        self
    }

    #[must_use]
    pub fn accesses(mut self, target: u64, accesses: u64) -> Self {
        self.data_accesses.push(DataAccessEntry {
            target: ClassId(target),
            accesses,
        });
        self
    }
}

// Validated, read-only class graph.
//
// Nodes and edges live in a petgraph arena; the clusterable (behavioral)
// classes get a dense index in document order, which is the genome ordering.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::document::GraphDocument;
use crate::{ClassEdge, ClassId, ClassKind, ClassNode, DataAccessEdge, DependencyEdge, GraphError};

/// The class/dependency graph the core operates on.
#[derive(Debug, Clone)]
pub struct ClassGraph {
    graph: DiGraph<ClassNode, ClassEdge>,
    by_id: HashMap<ClassId, NodeIndex>,
    /// Clusterable index → arena node.
    clusterable: Vec<NodeIndex>,
    /// Arena node index → clusterable index.
    clusterable_index: Vec<Option<usize>>,
}

impl ClassGraph {
    /// Parse and validate a JSON graph document.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let doc: GraphDocument = serde_json::from_str(json)?;
        Self::from_document(&doc)
    }

    /// Validate a graph document and build the arena graph.
    ///
    /// Repeated dependencies (or data accesses) between the same pair of
    /// classes are folded into a single edge with summed counts.
    pub fn from_document(doc: &GraphDocument) -> crate::Result<Self> {
        let mut graph = DiGraph::<ClassNode, ClassEdge>::with_capacity(doc.classes.len(), 0);
        let mut by_id: HashMap<ClassId, NodeIndex> = HashMap::with_capacity(doc.classes.len());
        let mut clusterable = Vec::new();
        let mut clusterable_index = Vec::with_capacity(doc.classes.len());

        for entry in &doc.classes {
            let node = ClassNode {
                id: entry.id,
                name: entry.name.clone(),
                size_bytes: entry.size_bytes,
                kind: entry.kind,
            };
            let is_clusterable = node.is_clusterable();
            let idx = graph.add_node(node);
            if by_id.insert(entry.id, idx).is_some() {
                return Err(GraphError::DuplicateClass(entry.id));
            }
            if is_clusterable {
                clusterable_index.push(Some(clusterable.len()));
                clusterable.push(idx);
            } else {
                clusterable_index.push(None);
            }
        }

        let resolve = |source_id: ClassId, target: ClassId| {
            by_id
                .get(&target)
                .copied()
                .ok_or(GraphError::UnknownClass { source_id, target })
        };

        let mut dependency_edges: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();
        let mut access_edges: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();

        for entry in &doc.classes {
            let src = by_id[&entry.id];

            for dep in &entry.dependencies {
                let tgt = resolve(entry.id, dep.target)?;
                match dependency_edges.entry((src, tgt)) {
                    Entry::Occupied(existing) => {
                        if let Some(ClassEdge::Dependency(edge)) = graph.edge_weight_mut(*existing.get()) {
                            edge.absorb(dep.to_edge());
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(graph.add_edge(src, tgt, ClassEdge::Dependency(dep.to_edge())));
                    }
                }
            }

            if !entry.data_accesses.is_empty() && entry.kind != ClassKind::Behavioral {
                return Err(GraphError::InvalidEdge {
                    source_id: entry.id,
                    target: entry.data_accesses[0].target,
                    reason: "only behavioral classes may access data classes".to_string(),
                });
            }

            for access in &entry.data_accesses {
                let tgt = resolve(entry.id, access.target)?;
                if graph[tgt].kind != ClassKind::Data {
                    return Err(GraphError::InvalidEdge {
                        source_id: entry.id,
                        target: access.target,
                        reason: "data-access target is not a data class".to_string(),
                    });
                }
                match access_edges.entry((src, tgt)) {
                    Entry::Occupied(existing) => {
                        if let Some(ClassEdge::DataAccess(edge)) = graph.edge_weight_mut(*existing.get()) {
                            edge.accesses += access.accesses;
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(graph.add_edge(src, tgt, ClassEdge::DataAccess(access.to_edge())));
                    }
                }
            }
        }

        debug!(
            classes = graph.node_count(),
            clusterable = clusterable.len(),
            edges = graph.edge_count(),
            "Class graph loaded"
        );

        Ok(Self {
            graph,
            by_id,
            clusterable,
            clusterable_index,
        })
    }

    /// All classes, data and behavioral.
    pub fn class_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of behavioral classes, which is also the genome length.
    pub fn clusterable_count(&self) -> usize {
        self.clusterable.len()
    }

    /// The `index`-th clusterable class. Panics if `index` is out of range.
    pub fn clusterable(&self, index: usize) -> &ClassNode {
        &self.graph[self.clusterable[index]]
    }

    pub fn clusterable_id(&self, index: usize) -> ClassId {
        self.clusterable(index).id
    }

    /// Position of a class in the genome ordering, if it is clusterable.
    pub fn clusterable_index_of(&self, id: ClassId) -> Option<usize> {
        let idx = self.by_id.get(&id)?;
        self.clusterable_index[idx.index()]
    }

    pub fn node(&self, id: ClassId) -> Option<&ClassNode> {
        self.by_id.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.graph.node_weights()
    }

    /// Outgoing dependencies of a clusterable class.
    ///
    /// Each item carries the callee's clusterable index (`None` for data
    /// classes) and the edge.
    pub fn dependencies_of(
        &self,
        index: usize,
    ) -> impl Iterator<Item = (Option<usize>, &DependencyEdge)> {
        self.graph
            .edges(self.clusterable[index])
            .filter_map(|edge| match edge.weight() {
                ClassEdge::Dependency(dep) => {
                    Some((self.clusterable_index[edge.target().index()], dep))
                }
                ClassEdge::DataAccess(_) => None,
            })
    }

    /// Data classes read or written by a clusterable class.
    pub fn data_accesses_of(
        &self,
        index: usize,
    ) -> impl Iterator<Item = (ClassId, &DataAccessEdge)> {
        self.graph
            .edges(self.clusterable[index])
            .filter_map(|edge| match edge.weight() {
                ClassEdge::DataAccess(access) => Some((self.graph[edge.target()].id, access)),
                ClassEdge::Dependency(_) => None,
            })
    }

    /// Sum of [`DependencyEdge::call_weight`] over dependencies whose caller
    /// is clusterable. Data classes belong to no cluster; their calls are
    /// excluded.
    pub fn total_call_weight(&self) -> u64 {
        self.graph
            .edge_references()
            .filter(|edge| self.graph[edge.source()].is_clusterable())
            .map(|edge| match edge.weight() {
                ClassEdge::Dependency(dep) => dep.call_weight(),
                ClassEdge::DataAccess(_) => 0,
            })
            .sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

// Partitions of the clusterable classes.
//
// `ClusteringBuilder` is the only mutable form; `Clustering` is frozen,
// normalized (labels 0..k-1) and carries both views of the partition.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::ClusteringError;
use crate::metrics::cache::OptimizationData;

// ── Signature ──────────────────────────────────────────────────────

/// Canonical key of a cluster's composition: its sorted member tuple.
///
/// Two clusters in different clusterings with the same members have equal
/// signatures. `Display` renders the stringified form, e.g. `[0,3,5]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterSignature(Arc<[usize]>);

impl ClusterSignature {
    /// Build a signature from members in any order.
    pub fn from_members(members: &[usize]) -> Self {
        let mut sorted = members.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Self(sorted.into())
    }

    pub fn members(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ClusterSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, member) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{member}")?;
        }
        f.write_str("]")
    }
}

// ── Clustering ─────────────────────────────────────────────────────

/// An immutable, normalized partition of the clusterable classes.
///
/// Classes are addressed by their clusterable index (genome position).
/// Every class belongs to exactly one cluster and cluster ids are `0..k`.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Cluster id → sorted members.
    clusters: Vec<Arc<[usize]>>,
    /// Class → cluster id.
    assignment: Vec<usize>,
    data: Arc<OptimizationData>,
}

impl Clustering {
    /// Every class in its own cluster; class `i` gets cluster `i`.
    pub fn singletons(class_count: usize, data: Arc<OptimizationData>) -> Self {
        Self {
            clusters: (0..class_count).map(|i| Arc::from([i])).collect(),
            assignment: (0..class_count).collect(),
            data,
        }
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Number of classes partitioned.
    pub fn member_count(&self) -> usize {
        self.assignment.len()
    }

    /// Members of cluster `cluster`, sorted ascending.
    pub fn members(&self, cluster: usize) -> &[usize] {
        &self.clusters[cluster]
    }

    /// Cluster id of class `class`.
    pub fn cluster_of(&self, class: usize) -> usize {
        self.assignment[class]
    }

    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Clusters in id order.
    pub fn clusters(&self) -> impl ExactSizeIterator<Item = &[usize]> {
        self.clusters.iter().map(|members| &members[..])
    }

    pub fn signature(&self, cluster: usize) -> ClusterSignature {
        ClusterSignature(Arc::clone(&self.clusters[cluster]))
    }

    /// The run-scoped metric cache shared by every clustering of this run.
    pub fn optimization_data(&self) -> &Arc<OptimizationData> {
        &self.data
    }

    /// Open a builder seeded with this partition.
    pub fn to_builder(&self) -> ClusteringBuilder {
        let clusters = self
            .clusters
            .iter()
            .enumerate()
            .map(|(id, members)| (id, members.to_vec()))
            .collect();
        ClusteringBuilder {
            clusters,
            assignment: self.assignment.iter().copied().map(Some).collect(),
            next_id: self.clusters.len(),
            data: Arc::clone(&self.data),
        }
    }

    /// True when `signature` is a union of whole clusters of this partition.
    ///
    /// Agglomerative search only ever grows clusters, so a signature that
    /// splits any current cluster can never be produced again.
    pub fn is_union_of_clusters(&self, signature: &ClusterSignature) -> bool {
        let mut touched: Vec<usize> = signature
            .members()
            .iter()
            .filter_map(|&m| self.assignment.get(m).copied())
            .collect();
        if touched.len() != signature.len() {
            return false;
        }
        touched.sort_unstable();
        touched.dedup();
        let covered: usize = touched.iter().map(|&c| self.clusters[c].len()).sum();
        covered == signature.len()
    }
}

/// Partitions compare by membership only; the shared cache is not part of identity.
impl PartialEq for Clustering {
    fn eq(&self, other: &Self) -> bool {
        self.assignment == other.assignment
    }
}

impl Eq for Clustering {}

// ── Builder ────────────────────────────────────────────────────────

/// Mutable accumulator used to construct and merge partitions.
///
/// Not shared across threads; [`build`](Self::build) freezes it into a
/// [`Clustering`].
#[derive(Debug, Clone)]
pub struct ClusteringBuilder {
    clusters: BTreeMap<usize, Vec<usize>>,
    assignment: Vec<Option<usize>>,
    next_id: usize,
    data: Arc<OptimizationData>,
}

impl ClusteringBuilder {
    pub fn new(class_count: usize, data: Arc<OptimizationData>) -> Self {
        Self {
            clusters: BTreeMap::new(),
            assignment: vec![None; class_count],
            next_id: 0,
            data,
        }
    }

    pub fn class_count(&self) -> usize {
        self.assignment.len()
    }

    /// Non-empty clusters currently held.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn contains_cluster(&self, id: usize) -> bool {
        self.clusters.contains_key(&id)
    }

    /// Current cluster of `class`, if any.
    pub fn assignment(&self, class: usize) -> Option<usize> {
        self.assignment.get(class).copied().flatten()
    }

    /// Reserve a cluster id never used before in this builder.
    pub fn allocate_cluster(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place `class` in cluster `id`, creating the cluster if needed.
    ///
    /// Adding a class to the cluster it already belongs to is a no-op. A class
    /// held by another cluster is moved; a cluster left empty disappears.
    pub fn add_to_cluster(&mut self, class: usize, id: usize) -> Result<(), ClusteringError> {
        let current = *self
            .assignment
            .get(class)
            .ok_or(ClusteringError::ClassOutOfRange {
                index: class,
                class_count: self.assignment.len(),
            })?;

        match current {
            Some(existing) if existing == id => return Ok(()),
            Some(existing) => self.detach(class, existing),
            None => {}
        }

        self.clusters.entry(id).or_default().push(class);
        self.assignment[class] = Some(id);
        self.next_id = self.next_id.max(id.saturating_add(1));
        Ok(())
    }

    fn detach(&mut self, class: usize, id: usize) {
        if let Some(members) = self.clusters.get_mut(&id) {
            members.retain(|&m| m != class);
            if members.is_empty() {
                self.clusters.remove(&id);
            }
        }
    }

    /// Move every member of `source` into `target` and drop `source`.
    ///
    /// Both ids must exist. Merging a cluster into itself changes nothing.
    pub fn merge_cluster(&mut self, source: usize, target: usize) -> Result<(), ClusteringError> {
        if !self.clusters.contains_key(&target) {
            return Err(ClusteringError::UnknownCluster(target));
        }
        if source == target {
            return Ok(());
        }
        let moved = self
            .clusters
            .remove(&source)
            .ok_or(ClusteringError::UnknownCluster(source))?;

        for &class in &moved {
            self.assignment[class] = Some(target);
        }
        if let Some(members) = self.clusters.get_mut(&target) {
            members.extend(moved);
        }
        Ok(())
    }

    /// Relabel surviving clusters to `0..k` in order of first appearance,
    /// scanning classes from index 0.
    pub fn normalize(&mut self) {
        let mut relabel: HashMap<usize, usize> = HashMap::with_capacity(self.clusters.len());
        for id in self.assignment.iter().flatten() {
            let next = relabel.len();
            relabel.entry(*id).or_insert(next);
        }
        let old = std::mem::take(&mut self.clusters);
        for (id, members) in old {
            if let Some(&new_id) = relabel.get(&id) {
                self.clusters.insert(new_id, members);
            }
        }
        for slot in self.assignment.iter_mut().flatten() {
            if let Some(&new_id) = relabel.get(slot) {
                *slot = new_id;
            }
        }
        self.next_id = self.clusters.len();
    }

    /// Normalize and freeze. Fails if any class is still unassigned.
    pub fn build(mut self) -> Result<Clustering, ClusteringError> {
        if let Some(unassigned) = self.assignment.iter().position(Option::is_none) {
            return Err(ClusteringError::Unassigned(unassigned));
        }
        self.normalize();

        let clusters = self
            .clusters
            .into_values()
            .map(|mut members| {
                members.sort_unstable();
                Arc::from(members)
            })
            .collect();
        let assignment = self.assignment.into_iter().flatten().collect();

        Ok(Clustering {
            clusters,
            assignment,
            data: self.data,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────

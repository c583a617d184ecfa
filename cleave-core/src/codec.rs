//! Genome → [`Clustering`] decoding.
//!
//! A genome is a fixed-length integer vector with one gene per clusterable
//! class, in the graph's clusterable order. Two encodings are supported:
//!
//! - [`Encoding::ClusterLabel`]: `gene[i]` is a raw cluster label for class
//!   `i`. Distinct labels are numbered in order of first appearance, so the
//!   raw values themselves carry no meaning beyond equality.
//! - [`Encoding::GraphAdjacency`]: `gene[i]` links class `i` to class
//!   `gene[i]`; connected classes share a cluster. Decoding is two-phase:
//!   a single assignment pass that records conflicting links as deferred
//!   merges, then a merge pass applied in descending source-id order.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clustering::{Clustering, ClusteringBuilder};
use crate::error::CodecError;
use crate::metrics::OptimizationData;

/// Genome encoding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    #[default]
    ClusterLabel,
    GraphAdjacency,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClusterLabel => "cluster-label",
            Self::GraphAdjacency => "graph-adjacency",
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoder for one encoding over a fixed number of classes.
#[derive(Debug, Clone, Copy)]
pub struct GenomeCodec {
    encoding: Encoding,
    class_count: usize,
    max_clusters: Option<usize>,
}

impl GenomeCodec {
    pub fn new(encoding: Encoding, class_count: usize) -> Self {
        Self {
            encoding,
            class_count,
            max_clusters: None,
        }
    }

    /// Narrow the label domain of [`Encoding::ClusterLabel`] genomes.
    #[must_use]
    pub fn with_max_clusters(mut self, max_clusters: Option<usize>) -> Self {
        self.max_clusters = max_clusters;
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn genome_len(&self) -> usize {
        self.class_count
    }

    /// Exclusive upper bound of every gene, for the optimizer's variable domain.
    ///
    /// Adjacency genes index a class. Label genes need no more distinct
    /// values than the cluster cap (or the class count without one).
    pub fn gene_upper_bound(&self) -> usize {
        match self.encoding {
            Encoding::GraphAdjacency => self.class_count,
            Encoding::ClusterLabel => self
                .max_clusters
                .map_or(self.class_count, |max| max.min(self.class_count)),
        }
    }

    pub fn decode(
        &self,
        genome: &[usize],
        data: Arc<OptimizationData>,
    ) -> Result<Clustering, CodecError> {
        if genome.len() != self.class_count {
            return Err(CodecError::LengthMismatch {
                found: genome.len(),
                expected: self.class_count,
            });
        }
        match self.encoding {
            Encoding::ClusterLabel => decode_labels(genome, data),
            Encoding::GraphAdjacency => decode_adjacency(genome, data),
        }
    }
}

/// Cluster-label decoding: first-seen raw labels get sequential ids.
fn decode_labels(genome: &[usize], data: Arc<OptimizationData>) -> Result<Clustering, CodecError> {
    let mut builder = ClusteringBuilder::new(genome.len(), data);
    let mut normalized: HashMap<usize, usize> = HashMap::new();

    for (class, &label) in genome.iter().enumerate() {
        let next = normalized.len();
        let id = *normalized.entry(label).or_insert(next);
        builder.add_to_cluster(class, id)?;
    }

    Ok(builder.build()?)
}

/// Graph-adjacency (locus) decoding.
fn decode_adjacency(
    genome: &[usize],
    data: Arc<OptimizationData>,
) -> Result<Clustering, CodecError> {
    let class_count = genome.len();
    let mut builder = ClusteringBuilder::new(class_count, data);
    let mut deferred: BTreeSet<(usize, usize)> = BTreeSet::new();

    // Phase 1: single assignment pass.
    for (class, &linked) in genome.iter().enumerate() {
        if linked >= class_count {
            return Err(CodecError::GeneOutOfRange {
                index: class,
                value: linked,
                class_count,
            });
        }
        match (builder.assignment(class), builder.assignment(linked)) {
            (Some(cur), None) => builder.add_to_cluster(linked, cur)?,
            (None, Some(lnk)) => builder.add_to_cluster(class, lnk)?,
            (None, None) => {
                let id = builder.allocate_cluster();
                builder.add_to_cluster(class, id)?;
                builder.add_to_cluster(linked, id)?;
            }
            (Some(cur), Some(lnk)) if cur != lnk => {
                deferred.insert((cur.max(lnk), cur.min(lnk)));
            }
            (Some(_), Some(_)) => {}
        }
    }

    // Phase 2: deferred merges, highest source first. A source already
    // absorbed by an earlier merge is followed to its current representative.
    let mut absorbed_into: HashMap<usize, usize> = HashMap::new();
    let representative = |absorbed_into: &HashMap<usize, usize>, mut id: usize| {
        while let Some(&next) = absorbed_into.get(&id) {
            id = next;
        }
        id
    };

    for &(source, target) in deferred.iter().rev() {
        let source = representative(&absorbed_into, source);
        let target = representative(&absorbed_into, target);
        if source == target {
            continue;
        }
        let (from, into) = (source.max(target), source.min(target));
        builder.merge_cluster(from, into)?;
        absorbed_into.insert(from, into);
    }

    Ok(builder.build()?)
}

// ── Tests ──────────────────────────────────────────────────────────

/// Top-level cleave error type.
///
/// All fallible operations in `cleave-core` return [`Result<T, CoreError>`](Result).
/// Each variant wraps a domain-specific error enum so callers can tell a bad
/// input apart from a broken invariant without string matching.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// Error building or validating the class graph.
    #[error("Graph error: {0}")]
    Graph(#[from] cleave_graph::GraphError),

    /// Partition invariant violated (unknown cluster id, unassigned class).
    #[error("Clustering error: {0}")]
    Clustering(#[from] ClusteringError),

    /// Genome could not be decoded.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Hierarchical search could not proceed.
    #[error("Solver error: {0}")]
    Solve(#[from] SolveError),

    /// Configuration parsing or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Violations of the partition invariants. These indicate logic errors in
/// the caller, never bad user input.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ClusteringError {
    /// A merge referenced a cluster id that does not exist.
    #[error("Unknown cluster id: {0}")]
    UnknownCluster(usize),

    /// `build` was called while some class had no cluster.
    #[error("Class {0} is not assigned to any cluster")]
    Unassigned(usize),

    /// A class index beyond the builder's class count.
    #[error("Class index {index} out of range for {class_count} classes")]
    ClassOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of classes the builder was created for.
        class_count: usize,
    },
}

/// Errors while decoding a genome into a clustering.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Genome length differs from the number of clusterable classes.
    #[error("Genome has {found} genes, expected {expected}")]
    LengthMismatch {
        /// Genes supplied.
        found: usize,
        /// Clusterable classes in the graph.
        expected: usize,
    },

    /// An adjacency gene points past the last class.
    #[error("Gene {index} links to class {value}, but only {class_count} classes exist")]
    GeneOutOfRange {
        /// Gene position.
        index: usize,
        /// Gene value.
        value: usize,
        /// Clusterable classes in the graph.
        class_count: usize,
    },

    /// Builder invariant violated during decoding.
    #[error(transparent)]
    Clustering(#[from] ClusteringError),
}

/// Errors from the hierarchical solver.
#[derive(thiserror::Error, Debug)]
pub enum SolveError {
    /// Nothing to cluster.
    #[error("Insufficient data for clustering: {0}")]
    InsufficientData(String),

    /// The candidate reduction produced no winner although merges remained.
    #[error("No merge candidate available with {clusters} clusters")]
    NoCandidate {
        /// Cluster count of the state that had no candidate.
        clusters: usize,
    },
}

/// Errors in cleave configuration parsing and validation.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Cannot read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration values are present but semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// Configuration file syntax could not be parsed (TOML error, unknown names).
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience alias for `Result<T, CoreError>`.
pub type Result<T> = std::result::Result<T, CoreError>;

use thiserror::Error;

/// Failures while producing or loading the persisted model artifact.
/// These are fatal to serving start, never per-query errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Artifact absent or unreadable.
    #[error("model artifact i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact bytes are not a decodable model.
    #[error("model artifact is corrupt: {0}")]
    Codec(#[from] serde_cbor::Error),

    /// Artifact was written by an incompatible schema.
    #[error("model artifact format v{found} is not supported (expected v{expected})")]
    Version { found: u32, expected: u32 },
}

/// Failures while ingesting corpus CSV data.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("corpus i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column {0:?} not found in csv header")]
    MissingColumn(String),
}

/// Per-query failures, surfaced as values to the boundary layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Query arrived before the artifact finished loading. Retryable.
    #[error("recommendation model is not loaded yet")]
    NotReady,

    /// Exact-title lookup miss. Only reachable when callers bypass the
    /// fuzzy resolver.
    #[error("title {0:?} is not in the catalog")]
    UnknownTitle(String),

    /// No catalog title met the fuzzy score cutoff. The offending input is
    /// echoed back so the boundary can report it.
    #[error("no catalog title is close enough to {input:?}")]
    NoMatch { input: String },
}

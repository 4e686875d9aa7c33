use thiserror::Error;

/// Integrity errors raised when a finished batch breaks its invariants.
#[derive(Debug, Error)]
pub enum Error {
    /// An entity references an id that is not part of an earlier batch.
    #[error("referential gap: {0}")]
    ReferentialGap(String),
    /// A key appears more than once within a batch.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    /// A record violates a per-row invariant (times, prices, cardinality).
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Convenience alias for results returned by airseed crates.
pub type Result<T> = std::result::Result<T, Error>;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("namespace '{namespace}' exhausted: {requested} codes requested, {capacity} available")]
    NamespaceExhausted {
        namespace: String,
        requested: u64,
        capacity: u64,
    },
    #[error("invalid scheduling window: end {end} is not after start {start}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("phase '{to}' cannot follow '{from}'")]
    PhaseOrder {
        from: &'static str,
        to: &'static str,
    },
    #[error("dataset integrity error: {0}")]
    Dataset(#[from] airseed_core::Error),
    #[error("reference data error: {0}")]
    Reference(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

//! File artifacts of a generation run.

pub mod csv;

use std::path::{Path, PathBuf};

use crate::errors::GenerationError;
use crate::model::GenerationReport;

pub use self::csv::{CsvArtifact, write_batch_csv};

/// File name of the JSON report inside a run directory.
pub const REPORT_FILE: &str = "generation_report.json";

/// Write `report` as pretty JSON into `dir`.
pub fn write_report_json(dir: &Path, report: &GenerationReport) -> Result<PathBuf, GenerationError> {
    let path = dir.join(REPORT_FILE);
    std::fs::write(&path, serde_json::to_vec_pretty(report)?)?;
    Ok(path)
}

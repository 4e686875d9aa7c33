//! Deterministic flight-booking dataset generator for airseed.
//!
//! The engine runs a strictly linear pipeline (allocate, entities, schedule,
//! favorites, finalize) and hands back an [`airseed_core::OutputBatch`] whose
//! six entity sets are referentially closed.

pub mod allocator;
pub mod context;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod favorites;
pub mod model;
pub mod output;
pub mod pricing;
pub mod reference;
pub mod schedule;

pub use engine::{GenerationEngine, GenerationOutput};
pub use errors::GenerationError;
pub use model::{GenerateOptions, GenerationReport, ScheduleWindow, TableReport};
pub use reference::ReferenceData;

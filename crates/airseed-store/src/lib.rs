//! Storage handoff for generated datasets.
//!
//! A [`DatasetStore`] receives the six entity batches of an
//! [`airseed_core::OutputBatch`] in foreign-key order inside one transaction.

pub mod adapter;
pub mod error;
pub mod mapper;
pub mod options;
pub mod sqlite;

pub use adapter::{DatasetStore, PersistReport, TablePersisted, persist_batch};
pub use error::{Result, StoreError};
pub use mapper::{Row, SqlValue};
pub use options::StoreOptions;
pub use sqlite::SqliteStore;

pub use airseed_core::OutputBatch;

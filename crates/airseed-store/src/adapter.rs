use async_trait::async_trait;
use tracing::{info, warn};

use airseed_core::{EntityKind, OutputBatch};

use crate::error::Result;
use crate::mapper::{Row, rows_for};

/// Storage collaborator receiving generated batches.
#[async_trait]
pub trait DatasetStore: Send {
    /// Returns the engine identifier (e.g. `sqlite`).
    fn engine(&self) -> &'static str;

    /// Create every table if missing. Idempotent.
    async fn create_schema(&mut self) -> Result<()>;

    async fn begin_transaction(&mut self) -> Result<()>;

    /// Insert `rows` into the table of `kind`, skipping rows whose key already
    /// exists. Returns the number of rows actually inserted.
    async fn bulk_insert_or_ignore(&mut self, kind: EntityKind, rows: &[Row]) -> Result<u64>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}

/// Rows handed over and inserted for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePersisted {
    pub kind: EntityKind,
    pub rows: u64,
    pub inserted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub tables: Vec<TablePersisted>,
}

impl PersistReport {
    pub fn inserted(&self, kind: EntityKind) -> u64 {
        self.tables
            .iter()
            .find(|table| table.kind == kind)
            .map(|table| table.inserted)
            .unwrap_or(0)
    }
}

/// Apply all six batches in dependency order inside one transaction.
///
/// Any failure after the transaction opens rolls it back, leaving the store
/// as it was.
pub async fn persist_batch<S>(store: &mut S, batch: &OutputBatch) -> Result<PersistReport>
where
    S: DatasetStore + ?Sized,
{
    store.create_schema().await?;
    store.begin_transaction().await?;

    let mut report = PersistReport::default();
    for kind in EntityKind::ORDERED {
        let rows = rows_for(batch, kind);
        match store.bulk_insert_or_ignore(kind, &rows).await {
            Ok(inserted) => {
                info!(
                    engine = store.engine(),
                    table = kind.table_name(),
                    rows = rows.len(),
                    inserted,
                    "batch persisted"
                );
                report.tables.push(TablePersisted {
                    kind,
                    rows: rows.len() as u64,
                    inserted,
                });
            }
            Err(err) => {
                warn!(
                    engine = store.engine(),
                    table = kind.table_name(),
                    error = %err,
                    "batch failed; rolling back"
                );
                if let Err(rollback) = store.rollback().await {
                    warn!(error = %rollback, "rollback failed");
                }
                return Err(err);
            }
        }
    }

    store.commit().await?;
    Ok(report)
}

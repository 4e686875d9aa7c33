use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, Transaction};
use tracing::debug;

use airseed_core::EntityKind;

use crate::adapter::DatasetStore;
use crate::error::{Result, StoreError};
use crate::mapper::{Row, SqlValue, columns};
use crate::options::StoreOptions;

mod queries;

/// Store backed by a SQLite database with foreign keys enforced.
pub struct SqliteStore {
    pool: SqlitePool,
    max_parameters: usize,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteStore {
    /// Create a store using a pre-configured pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_parameters: StoreOptions::default().max_parameters,
            tx: None,
        }
    }

    /// Open the database described by `options`, creating the file if needed.
    pub async fn connect(options: &StoreOptions) -> Result<Self> {
        let (connect, max_connections) = match &options.path {
            Some(path) => (
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true),
                options.max_connections.max(1),
            ),
            // every connection would get its own private in-memory database
            None => (SqliteConnectOptions::from_str("sqlite::memory:")?, 1),
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect.foreign_keys(true))
            .await?;
        debug!(path = ?options.path, max_connections, "sqlite store connected");

        Ok(Self {
            pool,
            max_parameters: options.max_parameters.max(1),
            tx: None,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DatasetStore for SqliteStore {
    fn engine(&self) -> &'static str {
        "sqlite"
    }

    async fn create_schema(&mut self) -> Result<()> {
        for statement in queries::SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn begin_transaction(&mut self) -> Result<()> {
        if self.tx.is_some() {
            return Err(StoreError::TransactionActive);
        }
        self.tx = Some(self.pool.begin().await?);
        Ok(())
    }

    async fn bulk_insert_or_ignore(&mut self, kind: EntityKind, rows: &[Row]) -> Result<u64> {
        let tx = self.tx.as_mut().ok_or(StoreError::NoTransaction)?;
        let columns = columns(kind);
        if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(StoreError::RowShape {
                table: kind.table_name(),
                expected: columns.len(),
                found: row.len(),
            });
        }

        let per_statement = (self.max_parameters / columns.len()).max(1);
        let prefix = queries::insert_or_ignore_prefix(kind.table_name(), columns);
        let mut inserted = 0_u64;
        for chunk in rows.chunks(per_statement) {
            let mut builder = QueryBuilder::<Sqlite>::new(prefix.as_str());
            builder.push_values(chunk, |mut values, row| {
                for value in row {
                    match value {
                        SqlValue::Text(text) => values.push_bind(text.clone()),
                        SqlValue::Int(number) => values.push_bind(*number),
                        SqlValue::Null => values.push_bind(Option::<String>::None),
                    };
                }
            });
            let result = builder.build().execute(&mut **tx).await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(StoreError::NoTransaction)?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(StoreError::NoTransaction)?;
        tx.rollback().await?;
        Ok(())
    }
}

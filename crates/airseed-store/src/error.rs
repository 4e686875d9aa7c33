use thiserror::Error;

/// Errors raised by dataset stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("no transaction is open")]
    NoTransaction,
    #[error("a transaction is already open")]
    TransactionActive,
    #[error("row for '{table}' has {found} values, expected {expected}")]
    RowShape {
        table: &'static str,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

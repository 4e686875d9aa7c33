use std::path::PathBuf;

/// Options that control how a store connects.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Database file; `None` keeps the database in memory.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
    /// Upper bound on bound parameters per insert statement.
    pub max_parameters: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 4,
            max_parameters: 999,
        }
    }
}

impl StoreOptions {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }
}

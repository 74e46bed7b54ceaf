//! Typed errors for the persistence and configuration layers. UI glue wraps
//! these in `anyhow` and only needs to tell duplicates apart from everything
//! else.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by the entity stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A UNIQUE constraint rejected the write.
    #[error("{field} already exists")]
    Duplicate { field: &'static str },

    /// An update or delete matched no row.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("failed to open database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// Whether the error is a uniqueness violation on a user-entered key.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}

/// Configuration errors with structured variants.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

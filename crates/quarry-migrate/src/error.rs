//! Error types for the migration system.

use std::path::PathBuf;

/// Errors that can occur during migration operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Query compilation or execution failed.
    #[error(transparent)]
    Core(#[from] quarry_core::Error),

    /// Required connection or path configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A discovered migration does not provide a usable up/down pair.
    #[error("Migration '{name}' is invalid: {reason}")]
    MigrationContract {
        /// Migration name (file stem).
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Migration file already exists.
    #[error("Migration file already exists: {0}")]
    MigrationExists(PathBuf),

    /// IO error (reading/writing migration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MigrateError {
    pub(crate) fn contract(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MigrationContract {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<quarry_core::CompileError> for MigrateError {
    fn from(err: quarry_core::CompileError) -> Self {
        Self::Core(err.into())
    }
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

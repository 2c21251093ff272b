//! Migration settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// Default database URL.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:database.sqlite3";

/// Default migrations directory.
pub const DEFAULT_MIGRATIONS_PATH: &str = "database/migrations";

/// Default ledger table.
pub const DEFAULT_TABLE: &str = "migrations";

/// Where migrations live and where their ledger is kept.
///
/// Loaded from JSON; missing keys take their defaults:
///
/// ```json
/// { "database_url": "sqlite:app.db", "paths": ["migrations"], "table": "migrations" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Connection string handed to the driver.
    pub database_url: String,
    /// Search paths, in priority order (later paths win on name clashes).
    pub paths: Vec<PathBuf>,
    /// Ledger table name.
    pub table: String,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            paths: vec![PathBuf::from(DEFAULT_MIGRATIONS_PATH)],
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl MigrateConfig {
    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// IO errors, or [`MigrateError::Serialization`] for malformed JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Checks that everything needed to run is present.
    ///
    /// # Errors
    ///
    /// [`MigrateError::Configuration`] naming the first missing setting.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(MigrateError::Configuration(
                "database URL is empty".to_string(),
            ));
        }
        if self.table.trim().is_empty() {
            return Err(MigrateError::Configuration(
                "ledger table name is empty".to_string(),
            ));
        }
        if self.paths.is_empty() {
            return Err(MigrateError::Configuration(
                "no migrations path configured".to_string(),
            ));
        }
        Ok(())
    }
}

//! Migration file generation.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use tracing::info;

use crate::discovery::MigrationPaths;
use crate::error::{MigrateError, Result};

/// Writes new `.sql` migration stubs into a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationWriter {
    dir: PathBuf,
}

impl MigrationWriter {
    /// Creates a writer targeting `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a writer targeting the first configured path.
    ///
    /// # Errors
    ///
    /// [`MigrateError::Configuration`] when no path is configured.
    pub fn from_paths(paths: &MigrationPaths) -> Result<Self> {
        paths
            .first()
            .map(Self::new)
            .ok_or_else(|| MigrateError::Configuration("no migrations path configured".to_string()))
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lowercase slug with runs of non-alphanumerics collapsed to `_`.
    ///
    /// # Errors
    ///
    /// [`MigrateError::Configuration`] when nothing usable remains.
    pub fn slug(name: &str) -> Result<String> {
        let separators = Regex::new(r"[^A-Za-z0-9]+")
            .map_err(|e| MigrateError::Configuration(e.to_string()))?;
        let slug = separators
            .replace_all(name, "_")
            .trim_matches('_')
            .to_lowercase();
        if slug.is_empty() {
            return Err(MigrateError::Configuration(format!(
                "invalid migration name '{name}'"
            )));
        }
        Ok(slug)
    }

    /// File name for `name` created at `now`: `YYYY_MM_DD_HHMMSS_<slug>.sql`.
    ///
    /// # Errors
    ///
    /// See [`MigrationWriter::slug`].
    pub fn file_name(name: &str, now: NaiveDateTime) -> Result<String> {
        Ok(format!(
            "{}_{}.sql",
            now.format("%Y_%m_%d_%H%M%S"),
            Self::slug(name)?
        ))
    }

    /// Contents of a fresh migration file.
    #[must_use]
    pub fn stub(name: &str) -> String {
        format!(
            "-- Migration: {name}\n\
             -- migrate:up\n\
             -- CREATE TABLE example (id INTEGER PRIMARY KEY);\n\
             \n\
             -- migrate:down\n\
             -- DROP TABLE example;\n"
        )
    }

    /// Writes a new migration stamped with the current local time.
    ///
    /// # Errors
    ///
    /// See [`MigrationWriter::write_at`].
    pub fn write(&self, name: &str) -> Result<PathBuf> {
        self.write_at(name, Local::now().naive_local())
    }

    /// Writes a new migration stamped with `now`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// [`MigrateError::MigrationExists`] if the file is already there, an
    /// invalid name, or IO errors.
    pub fn write_at(&self, name: &str, now: NaiveDateTime) -> Result<PathBuf> {
        let path = self.dir.join(Self::file_name(name, now)?);
        if path.exists() {
            return Err(MigrateError::MigrationExists(path));
        }
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, Self::stub(name))?;
        info!(path = %path.display(), "Created migration");
        Ok(path)
    }
}

//! Migration ledger.
//!
//! The ledger table records which migrations ran and in which batch. Every
//! statement goes through the query builder in the executor's own dialect.

use std::collections::HashSet;

use quarry_core::query::{Filter, QueryBuilder};
use quarry_core::schema::Schema;
use quarry_core::{Executor, Row, ToSqlValue};
use serde::Serialize;
use tracing::debug;

use crate::config::DEFAULT_TABLE;
use crate::error::Result;

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    /// Migration name (file stem).
    pub name: String,
    /// Batch the migration was applied in.
    pub batch: i64,
}

/// Whether a known or orphaned migration has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Migration name.
    pub name: String,
    /// Batch it ran in, `None` when pending.
    pub batch: Option<i64>,
}

impl MigrationStatus {
    /// Returns true when the migration has been applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.batch.is_some()
    }
}

/// Reads and writes the ledger table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRepository {
    table: String,
}

impl Default for MigrationRepository {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl MigrationRepository {
    /// Creates a repository over `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Ledger table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    fn query(&self, executor: &dyn Executor) -> QueryBuilder {
        QueryBuilder::new(self.table.as_str()).with_dialect(executor.dialect())
    }

    /// Creates the ledger table unless it exists.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn ensure_table(&self, executor: &mut dyn Executor) -> Result<()> {
        debug!(table = %self.table, "Ensuring migrations table");
        Schema::new(executor)
            .create_if_not_exists(&self.table, |t| {
                t.id();
                t.string("migration", 255).not_null();
                t.integer("batch").not_null();
            })
            .await?;
        Ok(())
    }

    /// Applied migrations, oldest batch first and in insertion order within
    /// a batch.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn get_ran(&self, executor: &mut dyn Executor) -> Result<Vec<MigrationRecord>> {
        let rows = self
            .query(executor)
            .select(["migration", "batch"])
            .order_by("batch", "asc")
            .order_by("id", "asc")
            .get(executor)
            .await?;
        Ok(rows.iter().map(record).collect())
    }

    /// Highest batch number, or 0 for an empty ledger.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn last_batch(&self, executor: &mut dyn Executor) -> Result<i64> {
        let max = self.query(executor).max(executor, "batch").await?;
        Ok(max.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// Names in `batch`, most recently applied first.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn names_in_batch(&self, executor: &mut dyn Executor, batch: i64) -> Result<Vec<String>> {
        let names = self
            .query(executor)
            .where_eq("batch", batch)
            .order_by("id", "desc")
            .pluck(executor, "migration")
            .await?;
        Ok(names
            .into_iter()
            .filter_map(|v| v.as_str().map(ToString::to_string))
            .collect())
    }

    /// Records `name` as applied in `batch`.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn log(&self, executor: &mut dyn Executor, name: &str, batch: i64) -> Result<()> {
        self.query(executor)
            .insert(
                executor,
                &[("migration", name.to_sql_value()), ("batch", batch.to_sql_value())],
            )
            .await?;
        Ok(())
    }

    /// Removes the record for `name`.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn delete(&self, executor: &mut dyn Executor, name: &str) -> Result<()> {
        self.query(executor)
            .where_eq("migration", name)
            .delete(executor)
            .await?;
        Ok(())
    }

    /// Status of every name in `known`, in that order, followed by ledger
    /// entries whose migration is no longer known.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn status(
        &self,
        executor: &mut dyn Executor,
        known: &[String],
    ) -> Result<Vec<MigrationStatus>> {
        let ran = self.get_ran(executor).await?;
        let known_set: HashSet<&str> = known.iter().map(String::as_str).collect();

        let mut status: Vec<MigrationStatus> = known
            .iter()
            .map(|name| MigrationStatus {
                name: name.clone(),
                batch: ran.iter().find(|r| &r.name == name).map(|r| r.batch),
            })
            .collect();
        status.extend(
            ran.into_iter()
                .filter(|r| !known_set.contains(r.name.as_str()))
                .map(|r| MigrationStatus {
                    name: r.name,
                    batch: Some(r.batch),
                }),
        );
        Ok(status)
    }
}

fn record(row: &Row) -> MigrationRecord {
    MigrationRecord {
        name: row
            .get("migration")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        batch: row.get("batch").and_then(|v| v.as_i64()).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_sqlite::SqliteExecutor;

    async fn ledger() -> (SqliteExecutor, MigrationRepository) {
        let mut db = SqliteExecutor::connect("sqlite::memory:").await.unwrap();
        let repo = MigrationRepository::default();
        repo.ensure_table(&mut db).await.unwrap();
        (db, repo)
    }

    #[tokio::test]
    async fn test_ensure_table_is_idempotent() {
        let (mut db, repo) = ledger().await;
        repo.ensure_table(&mut db).await.unwrap();
        assert_eq!(repo.last_batch(&mut db).await.unwrap(), 0);
        assert!(repo.get_ran(&mut db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batches_and_ordering() {
        let (mut db, repo) = ledger().await;
        repo.log(&mut db, "b_second", 1).await.unwrap();
        repo.log(&mut db, "a_first", 1).await.unwrap();
        repo.log(&mut db, "c_third", 2).await.unwrap();

        assert_eq!(repo.last_batch(&mut db).await.unwrap(), 2);
        let ran: Vec<String> = repo
            .get_ran(&mut db)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(ran, vec!["b_second", "a_first", "c_third"]);
        assert_eq!(
            repo.names_in_batch(&mut db, 1).await.unwrap(),
            vec!["a_first", "b_second"]
        );

        repo.delete(&mut db, "c_third").await.unwrap();
        assert_eq!(repo.last_batch(&mut db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_status_lists_orphans_last() {
        let (mut db, repo) = ledger().await;
        repo.log(&mut db, "001_gone", 1).await.unwrap();
        repo.log(&mut db, "002_users", 1).await.unwrap();

        let known = vec![String::from("002_users"), String::from("003_posts")];
        let status = repo.status(&mut db, &known).await.unwrap();
        assert_eq!(
            status,
            vec![
                MigrationStatus {
                    name: String::from("002_users"),
                    batch: Some(1)
                },
                MigrationStatus {
                    name: String::from("003_posts"),
                    batch: None
                },
                MigrationStatus {
                    name: String::from("001_gone"),
                    batch: Some(1)
                },
            ]
        );
    }

    #[test]
    fn test_status_serializes() {
        let status = MigrationStatus {
            name: String::from("001_users"),
            batch: None,
        };
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"name":"001_users","batch":null}"#
        );
    }
}

//! Applying and rolling back migrations.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use quarry_core::schema::Schema;
use quarry_core::Executor;
use tracing::{info, warn};

use crate::config::MigrateConfig;
use crate::discovery::{MigrationPaths, MigrationResolver};
use crate::error::Result;
use crate::migration::Migration;
use crate::repository::{MigrationRepository, MigrationStatus};

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Drives migrations against one executor.
///
/// Each migration runs in its own transaction together with its ledger
/// write. A failure rolls that transaction back and stops the run; earlier
/// migrations of the same batch stay applied.
///
/// There is no cross-process lock: two `migrate` runs against the same
/// ledger can race on batch numbers. Serialize them externally.
pub struct Migrator<E: Executor> {
    executor: E,
    repository: MigrationRepository,
    paths: MigrationPaths,
    resolver: Box<dyn MigrationResolver>,
}

impl<E: Executor> Migrator<E> {
    /// Creates a migrator.
    #[must_use]
    pub fn new(
        executor: E,
        repository: MigrationRepository,
        paths: MigrationPaths,
        resolver: impl MigrationResolver + 'static,
    ) -> Self {
        Self {
            executor,
            repository,
            paths,
            resolver: Box::new(resolver),
        }
    }

    /// Creates a migrator from the ledger table and paths in `config`.
    #[must_use]
    pub fn from_config(
        executor: E,
        config: &MigrateConfig,
        resolver: impl MigrationResolver + 'static,
    ) -> Self {
        Self::new(
            executor,
            MigrationRepository::new(config.table.as_str()),
            config.paths.iter().collect(),
            resolver,
        )
    }

    /// Underlying executor.
    pub fn executor(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Consumes the migrator and returns its executor.
    #[must_use]
    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Ledger repository.
    #[must_use]
    pub const fn repository(&self) -> &MigrationRepository {
        &self.repository
    }

    /// Search paths.
    #[must_use]
    pub const fn paths(&self) -> &MigrationPaths {
        &self.paths
    }

    /// Discovered migration files, sorted by name.
    ///
    /// # Errors
    ///
    /// IO errors while listing a directory.
    pub fn migration_files(&self) -> Result<BTreeMap<String, PathBuf>> {
        self.paths.discover(self.resolver.extension())
    }

    /// Applies every pending migration in one new batch.
    ///
    /// Returns the applied names in order. Nothing is written when no
    /// migration is pending.
    ///
    /// # Errors
    ///
    /// The first resolution, compilation or execution error. Migrations
    /// after the failing one are not attempted.
    pub async fn migrate(&mut self) -> Result<Vec<String>> {
        self.repository.ensure_table(&mut self.executor).await?;

        let ran: HashSet<String> = self
            .repository
            .get_ran(&mut self.executor)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();
        let pending: Vec<(String, PathBuf)> = self
            .migration_files()?
            .into_iter()
            .filter(|(name, _)| !ran.contains(name))
            .collect();

        if pending.is_empty() {
            info!("Nothing to migrate");
            return Ok(Vec::new());
        }

        let grammar = self.executor.dialect().grammar();
        if !grammar.capabilities().transactional_ddl {
            warn!(
                dialect = grammar.name(),
                "DDL is not transactional; a failing migration may leave partial changes"
            );
        }

        let batch = self.repository.last_batch(&mut self.executor).await? + 1;
        let mut applied = Vec::with_capacity(pending.len());
        for (name, path) in pending {
            let migration = self.resolver.resolve(&name, &path)?;
            info!(migration = %name, batch, "Migrating");
            self.run(&name, &migration, Direction::Up, batch).await?;
            info!(migration = %name, "Migrated");
            applied.push(name);
        }
        Ok(applied)
    }

    /// Rolls back the last batch.
    ///
    /// `steps = 0` rolls back the whole batch; otherwise only the `steps`
    /// most recently applied migrations of it. Ledger entries whose file is
    /// gone are skipped and left in place.
    ///
    /// # Errors
    ///
    /// The first resolution, compilation or execution error.
    pub async fn rollback(&mut self, steps: usize) -> Result<Vec<String>> {
        self.repository.ensure_table(&mut self.executor).await?;

        let last = self.repository.last_batch(&mut self.executor).await?;
        if last == 0 {
            info!("Nothing to rollback");
            return Ok(Vec::new());
        }

        let mut names = self
            .repository
            .names_in_batch(&mut self.executor, last)
            .await?;
        if steps > 0 {
            names.truncate(steps);
        }

        let files = self.migration_files()?;
        let mut rolled_back = Vec::with_capacity(names.len());
        for name in names {
            let Some(path) = files.get(&name) else {
                warn!(migration = %name, "Migration file not found, skipping rollback");
                continue;
            };
            let migration = self.resolver.resolve(&name, path)?;
            info!(migration = %name, batch = last, "Rolling back");
            self.run(&name, &migration, Direction::Down, last).await?;
            info!(migration = %name, "Rolled back");
            rolled_back.push(name);
        }
        Ok(rolled_back)
    }

    /// Status of every discovered migration, then orphaned ledger entries.
    ///
    /// # Errors
    ///
    /// IO, compilation or execution errors.
    pub async fn status(&mut self) -> Result<Vec<MigrationStatus>> {
        self.repository.ensure_table(&mut self.executor).await?;
        let names: Vec<String> = self.migration_files()?.into_keys().collect();
        self.repository.status(&mut self.executor, &names).await
    }

    async fn run(
        &mut self,
        name: &str,
        migration: &Arc<dyn Migration>,
        direction: Direction,
        batch: i64,
    ) -> Result<()> {
        self.executor.begin_transaction().await?;
        match self.step(name, migration.as_ref(), direction, batch).await {
            Ok(()) => {
                self.executor.commit().await?;
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = self.executor.rollback().await {
                    warn!(
                        migration = %name,
                        error = %rollback_err,
                        "Rollback after failed migration also failed"
                    );
                }
                Err(err)
            }
        }
    }

    async fn step(
        &mut self,
        name: &str,
        migration: &dyn Migration,
        direction: Direction,
        batch: i64,
    ) -> Result<()> {
        {
            let mut schema = Schema::new(&mut self.executor);
            match direction {
                Direction::Up => migration.up(&mut schema).await,
                Direction::Down => migration.down(&mut schema).await,
            }?;
        }
        match direction {
            Direction::Up => self.repository.log(&mut self.executor, name, batch).await,
            Direction::Down => self.repository.delete(&mut self.executor, name).await,
        }
    }
}

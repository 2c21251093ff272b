//! Dialect-specific DDL generation.
//!
//! A [`SchemaGrammar`] turns a [`Blueprint`] into ordered statements. The
//! ALTER ordering is shared and lives in the provided
//! [`SchemaGrammar::compile_alter`]; grammars only fill in the per-operation
//! hooks, returning [`CompileError::UnsupportedByDialect`] where they cannot
//! express a change.

mod mysql;
mod sqlite;

pub use mysql::MySqlGrammar;
pub use sqlite::SqliteGrammar;

use crate::dialect::quote_with;
use crate::error::CompileError;

use super::blueprint::{Blueprint, IndexDef};
use super::column::ColumnDef;
use super::foreign::ForeignKeyDef;

/// What a grammar can express after a table exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct GrammarCapabilities {
    /// Modify an existing column's type or modifiers.
    pub modify_column: bool,
    /// Add a foreign key to an existing table.
    pub add_foreign_key: bool,
    /// Drop a foreign key.
    pub drop_foreign_key: bool,
    /// Add or drop a primary key on an existing table.
    pub alter_primary_key: bool,
    /// DDL statements can be rolled back inside a transaction.
    pub transactional_ddl: bool,
}

/// Trait for dialect-specific schema SQL generation.
pub trait SchemaGrammar: Send + Sync + std::fmt::Debug {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Identifier quote character.
    fn quote_char(&self) -> char;

    /// Capabilities of this grammar.
    fn capabilities(&self) -> GrammarCapabilities;

    /// Maps a column to its SQL type. Total: every column maps to something.
    fn map_type(&self, column: &ColumnDef) -> String;

    /// Compiles a full column definition (name, type and modifiers).
    ///
    /// # Errors
    ///
    /// Fails on defaults without a SQL literal and on modifiers the dialect
    /// cannot express.
    fn compile_column(&self, column: &ColumnDef) -> Result<String, CompileError>;

    /// Compiles CREATE TABLE plus any follow-up statements.
    ///
    /// # Errors
    ///
    /// Fails on incomplete foreign keys.
    fn compile_create(&self, blueprint: &Blueprint) -> Result<Vec<String>, CompileError>;

    /// Quotes an identifier.
    fn wrap(&self, name: &str) -> String {
        quote_with(self.quote_char(), name)
    }

    /// Quotes and comma-joins identifiers.
    fn wrap_list(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|n| self.wrap(n))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Creates an `UnsupportedByDialect` error for this grammar.
    fn unsupported(&self, feature: impl Into<String>) -> CompileError
    where
        Self: Sized,
    {
        CompileError::UnsupportedByDialect {
            dialect: self.name(),
            feature: feature.into(),
        }
    }

    /// `DROP TABLE t`.
    fn compile_drop(&self, table: &str) -> Vec<String> {
        vec![format!("DROP TABLE {}", self.wrap(table))]
    }

    /// `DROP TABLE IF EXISTS t`.
    fn compile_drop_if_exists(&self, table: &str) -> Vec<String> {
        vec![format!("DROP TABLE IF EXISTS {}", self.wrap(table))]
    }

    /// Compiles the table rename recorded in the blueprint.
    ///
    /// # Errors
    ///
    /// [`CompileError::MissingRenameTarget`] when no rename was requested.
    fn compile_rename_table(&self, blueprint: &Blueprint) -> Result<Vec<String>, CompileError> {
        let to = blueprint
            .rename_table
            .as_deref()
            .ok_or_else(|| CompileError::MissingRenameTarget(blueprint.table.clone()))?;
        Ok(vec![self.rename_table(&blueprint.table, to)])
    }

    /// Statement renaming `from` to `to`.
    fn rename_table(&self, from: &str, to: &str) -> String;

    /// Compiles every change of the blueprint against an existing table.
    ///
    /// Order: rename table, rename columns, drop foreign keys, drop indexes,
    /// drop primary keys, drop columns, add or modify columns, add foreign
    /// keys, add indexes. Statements after a table rename target the new name.
    ///
    /// # Errors
    ///
    /// Fails when the grammar cannot express one of the changes. Nothing is
    /// returned in that case, so no partial ALTER reaches the executor.
    fn compile_alter(&self, blueprint: &Blueprint) -> Result<Vec<String>, CompileError> {
        if blueprint.is_rename_only() {
            return self.compile_rename_table(blueprint);
        }

        let mut statements = Vec::new();
        let mut table = blueprint.table.as_str();

        if let Some(to) = blueprint.rename_table.as_deref() {
            statements.push(self.rename_table(table, to));
            table = to;
        }
        for rename in &blueprint.rename_columns {
            statements.push(self.rename_column(table, &rename.from, &rename.to));
        }
        for name in &blueprint.drop_foreign_keys {
            statements.extend(self.drop_foreign(table, name)?);
        }
        for name in &blueprint.drop_indexes {
            statements.extend(self.drop_index(table, name)?);
        }
        for name in &blueprint.drop_primary_keys {
            statements.extend(self.drop_primary(table, name)?);
        }
        for name in &blueprint.drop_columns {
            statements.extend(self.drop_column(table, name)?);
        }
        for column in &blueprint.columns {
            if column.change {
                statements.extend(self.modify_column(table, column)?);
            } else {
                statements.extend(self.add_column(table, column)?);
            }
        }
        for fk in &blueprint.foreign_keys {
            statements.extend(self.add_foreign(table, fk)?);
        }
        for index in &blueprint.indexes {
            statements.extend(self.add_index(table, index)?);
        }

        Ok(statements)
    }

    /// `ALTER TABLE t RENAME COLUMN a TO b`.
    fn rename_column(&self, table: &str, from: &str, to: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.wrap(table),
            self.wrap(from),
            self.wrap(to)
        )
    }

    /// `ALTER TABLE t DROP COLUMN c`.
    ///
    /// # Errors
    ///
    /// Grammars without DROP COLUMN override this with an error.
    fn drop_column(&self, table: &str, column: &str) -> Result<Vec<String>, CompileError> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.wrap(table),
            self.wrap(column)
        )])
    }

    /// Drops a foreign key by constraint name.
    ///
    /// # Errors
    ///
    /// When the grammar cannot drop foreign keys.
    fn drop_foreign(&self, table: &str, name: &str) -> Result<Vec<String>, CompileError>;

    /// Drops an index by name.
    ///
    /// # Errors
    ///
    /// When the grammar cannot drop indexes.
    fn drop_index(&self, table: &str, name: &str) -> Result<Vec<String>, CompileError>;

    /// Drops the primary key.
    ///
    /// # Errors
    ///
    /// When the grammar cannot alter primary keys.
    fn drop_primary(&self, table: &str, name: &str) -> Result<Vec<String>, CompileError>;

    /// Adds a column to an existing table.
    ///
    /// # Errors
    ///
    /// When the column carries constraints the grammar cannot add later.
    fn add_column(&self, table: &str, column: &ColumnDef) -> Result<Vec<String>, CompileError>;

    /// Modifies an existing column.
    ///
    /// # Errors
    ///
    /// When the grammar cannot modify columns.
    fn modify_column(&self, table: &str, column: &ColumnDef) -> Result<Vec<String>, CompileError>;

    /// Adds a foreign key to an existing table.
    ///
    /// # Errors
    ///
    /// When the grammar cannot add foreign keys, or the key is incomplete.
    fn add_foreign(&self, table: &str, fk: &ForeignKeyDef) -> Result<Vec<String>, CompileError>;

    /// Adds an index to an existing table.
    ///
    /// # Errors
    ///
    /// When the grammar cannot add this kind of index.
    fn add_index(&self, table: &str, index: &IndexDef) -> Result<Vec<String>, CompileError>;
}

/// Numeric `(precision, scale)` suffix with the usual 8,2 defaults.
pub(crate) fn precision_suffix(column: &ColumnDef) -> String {
    format!(
        "({}, {})",
        column.options.precision.unwrap_or(8),
        column.options.scale.unwrap_or(2)
    )
}

/// Length of a string column, 255 when unset.
pub(crate) fn length_of(column: &ColumnDef) -> u32 {
    column.options.length.unwrap_or(255)
}

//! SQLite dialect implementation.

use super::Dialect;
use crate::schema::{SchemaGrammar, SqliteGrammar};

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"' // SQLite also accepts backticks, but double quotes are standard
    }

    fn grammar(&self) -> &'static dyn SchemaGrammar {
        &SqliteGrammar
    }
}

//! SQL dialect support.
//!
//! A dialect decides how identifiers are quoted in DML and which
//! [`SchemaGrammar`] compiles DDL for it.

mod mysql;
mod sqlite;

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::schema::SchemaGrammar;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync + std::fmt::Debug {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes a single identifier, doubling any embedded quote character.
    fn quote_identifier(&self, name: &str) -> String {
        quote_with(self.identifier_quote(), name)
    }

    /// Quotes a column reference.
    ///
    /// `table.column` is split on the first dot and each part is quoted on
    /// its own. `*` is left bare, including in `table.*`.
    fn wrap_column(&self, column: &str) -> String {
        match column.split_once('.') {
            Some((table, rest)) => {
                format!("{}.{}", self.wrap_segment(table), self.wrap_segment(rest))
            }
            None => self.wrap_segment(column),
        }
    }

    /// Quotes one segment of a column reference, leaving `*` bare.
    fn wrap_segment(&self, segment: &str) -> String {
        if segment == "*" {
            String::from("*")
        } else {
            self.quote_identifier(segment)
        }
    }

    /// Returns the DDL grammar for this dialect.
    fn grammar(&self) -> &'static dyn SchemaGrammar;
}

/// Wraps `name` in `quote`, doubling embedded quote characters.
#[must_use]
pub fn quote_with(quote: char, name: &str) -> String {
    let doubled: String = [quote, quote].iter().collect();
    let escaped = name.replace(quote, &doubled);
    format!("{quote}{escaped}{quote}")
}

//! MySQL dialect implementation.

use super::Dialect;
use crate::schema::{MySqlGrammar, SchemaGrammar};

/// MySQL dialect. Identifiers are quoted with backticks.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn grammar(&self) -> &'static dyn SchemaGrammar {
        &MySqlGrammar
    }
}

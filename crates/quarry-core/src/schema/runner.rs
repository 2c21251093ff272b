//! Schema runner: compiles blueprints and executes them.

use tracing::debug;

use crate::error::Result;
use crate::executor::Executor;
use crate::query::QueryBuilder;

use super::blueprint::Blueprint;
use super::grammar::SchemaGrammar;

/// Runs schema changes against an executor.
///
/// The grammar defaults to the one matching the executor's dialect.
///
/// # Example
///
/// ```rust,ignore
/// let mut schema = Schema::new(&mut executor);
/// schema
///     .create("users", |t| {
///         t.id();
///         t.string("email", 255).unique();
///         t.timestamps();
///     })
///     .await?;
/// ```
pub struct Schema<'a> {
    executor: &'a mut dyn Executor,
    grammar: &'static dyn SchemaGrammar,
}

impl<'a> Schema<'a> {
    /// Creates a runner using the executor's own grammar.
    pub fn new(executor: &'a mut dyn Executor) -> Self {
        let grammar = executor.dialect().grammar();
        Self { executor, grammar }
    }

    /// Creates a runner with an explicit grammar.
    pub fn with_grammar(executor: &'a mut dyn Executor, grammar: &'static dyn SchemaGrammar) -> Self {
        Self { executor, grammar }
    }

    /// Grammar used to compile blueprints.
    #[must_use]
    pub fn grammar(&self) -> &'static dyn SchemaGrammar {
        self.grammar
    }

    /// Underlying executor.
    pub fn executor(&mut self) -> &mut dyn Executor {
        &mut *self.executor
    }

    /// Query builder for `table` in the executor's dialect.
    #[must_use]
    pub fn query(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(table).with_dialect(self.executor.dialect())
    }

    /// Creates a table.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn create<F>(&mut self, table: &str, build: F) -> Result<()>
    where
        F: FnOnce(&mut Blueprint) + Send,
    {
        let mut blueprint = Blueprint::new(table);
        build(&mut blueprint);
        let statements = self.grammar.compile_create(&blueprint)?;
        self.run(statements).await
    }

    /// Creates a table unless it already exists.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn create_if_not_exists<F>(&mut self, table: &str, build: F) -> Result<()>
    where
        F: FnOnce(&mut Blueprint) + Send,
    {
        let mut blueprint = Blueprint::new(table);
        blueprint.if_not_exists();
        build(&mut blueprint);
        let statements = self.grammar.compile_create(&blueprint)?;
        self.run(statements).await
    }

    /// Alters an existing table.
    ///
    /// Nothing is executed when the grammar rejects any part of the change.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn table<F>(&mut self, table: &str, build: F) -> Result<()>
    where
        F: FnOnce(&mut Blueprint) + Send,
    {
        let mut blueprint = Blueprint::new(table);
        build(&mut blueprint);
        let statements = self.grammar.compile_alter(&blueprint)?;
        self.run(statements).await
    }

    /// Drops a table.
    ///
    /// # Errors
    ///
    /// Execution errors.
    pub async fn drop(&mut self, table: &str) -> Result<()> {
        let statements = self.grammar.compile_drop(table);
        self.run(statements).await
    }

    /// Drops a table if it exists.
    ///
    /// # Errors
    ///
    /// Execution errors.
    pub async fn drop_if_exists(&mut self, table: &str) -> Result<()> {
        let statements = self.grammar.compile_drop_if_exists(table);
        self.run(statements).await
    }

    /// Renames a table.
    ///
    /// # Errors
    ///
    /// Execution errors.
    pub async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let mut blueprint = Blueprint::new(from);
        blueprint.rename(to);
        let statements = self.grammar.compile_rename_table(&blueprint)?;
        self.run(statements).await
    }

    /// Runs a raw statement.
    ///
    /// # Errors
    ///
    /// Execution errors.
    pub async fn statement(&mut self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Running schema statement");
        self.executor.run_statement(sql, &[]).await
    }

    async fn run(&mut self, statements: Vec<String>) -> Result<()> {
        for sql in statements {
            self.statement(&sql).await?;
        }
        Ok(())
    }
}

//! The executor capability.
//!
//! Everything in this crate compiles SQL into `(String, Vec<SqlValue>)` and
//! hands it to an [`Executor`]. Drivers implement the trait; the compilers
//! never open connections themselves.

use async_trait::async_trait;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::value::SqlValue;

/// One result row: column names with their values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends a column.
    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.columns.push(column.into());
        self.values.push(value);
    }

    /// Builder form of [`Row::push`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: SqlValue) -> Self {
        self.push(column, value);
        self
    }

    /// Looks up a value by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Looks up a value by position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Column names in select order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in select order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Runs parameterized statements against a database.
///
/// Placeholders are positional `?`; the Nth placeholder binds the Nth value.
/// Transactions are flat: `begin_transaction` must be followed by exactly one
/// `commit` or `rollback`.
#[async_trait]
pub trait Executor: Send {
    /// Dialect used to quote identifiers and pick a schema grammar.
    fn dialect(&self) -> &'static dyn Dialect;

    /// Runs a query and returns every row.
    async fn select(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<Vec<Row>>;

    /// Runs a query and returns the first row, if any.
    async fn select_one(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<Option<Row>> {
        Ok(self.select(sql, bindings).await?.into_iter().next())
    }

    /// Runs a statement and returns the number of affected rows.
    async fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<u64>;

    /// Runs a statement whose affected row count is not needed, such as DDL.
    async fn run_statement(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<()> {
        self.execute(sql, bindings).await.map(|_| ())
    }

    /// Opens a transaction.
    async fn begin_transaction(&mut self) -> Result<()>;

    /// Commits the open transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Rolls back the open transaction.
    async fn rollback(&mut self) -> Result<()>;

    /// Id generated by the most recent INSERT, if the driver reports one.
    fn last_insert_id(&self) -> Option<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup_by_name_and_index() {
        let row = Row::new()
            .with("id", SqlValue::Int(1))
            .with("name", SqlValue::Text(String::from("ada")));
        assert_eq!(row.get("name"), Some(&SqlValue::Text(String::from("ada"))));
        assert_eq!(row.get_index(0), Some(&SqlValue::Int(1)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
        assert_eq!(row.columns(), ["id", "name"]);
    }

    #[test]
    fn test_row_first_column_wins_on_duplicates() {
        let row = Row::new()
            .with("id", SqlValue::Int(1))
            .with("id", SqlValue::Int(2));
        assert_eq!(row.get("id"), Some(&SqlValue::Int(1)));
    }

    #[derive(Debug, Default)]
    struct Recorder {
        executed: Vec<String>,
        bound: Vec<SqlValue>,
    }

    #[async_trait]
    impl Executor for Recorder {
        fn dialect(&self) -> &'static dyn Dialect {
            &crate::dialect::SqliteDialect
        }

        async fn select(&mut self, _sql: &str, _bindings: &[SqlValue]) -> Result<Vec<Row>> {
            Ok(vec![
                Row::new().with("n", SqlValue::Int(1)),
                Row::new().with("n", SqlValue::Int(2)),
            ])
        }

        async fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<u64> {
            self.executed.push(sql.to_string());
            self.bound.extend_from_slice(bindings);
            Ok(0)
        }

        async fn begin_transaction(&mut self) -> Result<()> {
            Ok(())
        }

        async fn commit(&mut self) -> Result<()> {
            Ok(())
        }

        async fn rollback(&mut self) -> Result<()> {
            Ok(())
        }

        fn last_insert_id(&self) -> Option<i64> {
            None
        }
    }

    #[test]
    fn test_default_methods() {
        let mut exec = Recorder::default();
        let first = tokio_test::block_on(exec.select_one("SELECT n FROM t", &[])).unwrap();
        assert_eq!(first.unwrap().get("n"), Some(&SqlValue::Int(1)));

        tokio_test::block_on(exec.run_statement("DROP TABLE t", &[])).unwrap();
        tokio_test::block_on(exec.run_statement(
            "DELETE FROM t WHERE n = ?",
            &[SqlValue::Int(2)],
        ))
        .unwrap();
        assert_eq!(exec.executed, vec!["DROP TABLE t", "DELETE FROM t WHERE n = ?"]);
        assert_eq!(exec.bound, vec![SqlValue::Int(2)]);
    }
}

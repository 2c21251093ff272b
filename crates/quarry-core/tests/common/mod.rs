#![allow(dead_code)]

use std::collections::VecDeque;

use async_trait::async_trait;
use quarry_core::{Dialect, Error, Executor, MySqlDialect, Result, Row, SqlValue};

/// Everything the scripted executor was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Select(String, Vec<SqlValue>),
    Execute(String, Vec<SqlValue>),
    Begin,
    Commit,
    Rollback,
}

/// In-memory executor that replays queued result sets and records calls.
#[derive(Debug)]
pub struct ScriptedExecutor {
    dialect: &'static dyn Dialect,
    results: VecDeque<Vec<Row>>,
    pub calls: Vec<Call>,
    pub fail_on: Option<String>,
    pub next_id: i64,
    last_id: Option<i64>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::with_dialect(&MySqlDialect)
    }

    pub fn with_dialect(dialect: &'static dyn Dialect) -> Self {
        Self {
            dialect,
            results: VecDeque::new(),
            calls: Vec::new(),
            fail_on: None,
            next_id: 1,
            last_id: None,
        }
    }

    /// Queues the rows returned by the next `select`.
    pub fn push_rows(&mut self, rows: Vec<Row>) {
        self.results.push_back(rows);
    }

    /// SQL text of every recorded statement.
    pub fn statements(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Select(sql, _) | Call::Execute(sql, _) => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    fn check(&self, sql: &str, bindings: &[SqlValue]) -> Result<()> {
        match &self.fail_on {
            Some(needle) if sql.contains(needle.as_str()) => {
                Err(Error::execution("scripted failure", sql, bindings))
            }
            _ => Ok(()),
        }
    }
}

pub fn row(pairs: &[(&str, SqlValue)]) -> Row {
    pairs
        .iter()
        .fold(Row::new(), |row, (c, v)| row.with(*c, v.clone()))
}

#[async_trait]
impl Executor for ScriptedExecutor {
    fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    async fn select(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<Vec<Row>> {
        self.calls
            .push(Call::Select(sql.to_string(), bindings.to_vec()));
        self.check(sql, bindings)?;
        Ok(self.results.pop_front().unwrap_or_default())
    }

    async fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<u64> {
        self.calls
            .push(Call::Execute(sql.to_string(), bindings.to_vec()));
        self.check(sql, bindings)?;
        if sql.starts_with("INSERT") {
            self.last_id = Some(self.next_id);
            self.next_id += 1;
        }
        Ok(1)
    }

    async fn begin_transaction(&mut self) -> Result<()> {
        self.calls.push(Call::Begin);
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.calls.push(Call::Commit);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.calls.push(Call::Rollback);
        Ok(())
    }

    fn last_insert_id(&self) -> Option<i64> {
        self.last_id
    }
}

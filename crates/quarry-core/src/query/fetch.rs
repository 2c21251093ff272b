//! Running compiled queries through an [`Executor`].

use crate::error::Result;
use crate::executor::{Executor, Row};
use crate::value::SqlValue;

use super::builder::{Aggregate, QueryBuilder, AGGREGATE_ALIAS};

/// One page of a simple (count-free) pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplePage {
    /// Rows on this page, at most `per_page`.
    pub data: Vec<Row>,
    /// Requested page size.
    pub per_page: u64,
    /// 1-based page number.
    pub current_page: u64,
    /// Next page number, when at least one more row exists.
    pub next_page: Option<u64>,
    /// Previous page number, when this is not the first page.
    pub prev_page: Option<u64>,
}

impl QueryBuilder {
    /// Runs the SELECT and returns every row.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn get(&self, executor: &mut dyn Executor) -> Result<Vec<Row>> {
        let (sql, bindings) = self.compile_select()?;
        executor.select(&sql, &bindings).await
    }

    /// Runs the SELECT with LIMIT 1 (unless a limit is set) and returns the
    /// first row.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn first(&self, executor: &mut dyn Executor) -> Result<Option<Row>> {
        let (sql, bindings) = self.compile_first()?;
        executor.select_one(&sql, &bindings).await
    }

    /// Returns one column of the first row.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn value(&self, executor: &mut dyn Executor, column: &str) -> Result<Option<SqlValue>> {
        let row = self.clone().select([column]).first(executor).await?;
        Ok(row.and_then(|r| r.get_index(0).cloned()))
    }

    /// Returns one column of every row.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn pluck(&self, executor: &mut dyn Executor, column: &str) -> Result<Vec<SqlValue>> {
        let rows = self.clone().select([column]).get(executor).await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.get_index(0).cloned())
            .collect())
    }

    async fn aggregate(
        &self,
        executor: &mut dyn Executor,
        function: Aggregate,
        column: &str,
    ) -> Result<Option<SqlValue>> {
        let (sql, bindings) = self.compile_aggregate(function, column)?;
        let row = executor.select_one(&sql, &bindings).await?;
        Ok(row
            .and_then(|r| r.get(AGGREGATE_ALIAS).cloned())
            .filter(|v| !v.is_null()))
    }

    /// `COUNT(*)` over the filtered rows. Returns 0 when no row comes back.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn count(&self, executor: &mut dyn Executor) -> Result<i64> {
        let value = self.aggregate(executor, Aggregate::Count, "*").await?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// `SUM(column)`, or `None` for an empty set.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn sum(&self, executor: &mut dyn Executor, column: &str) -> Result<Option<SqlValue>> {
        self.aggregate(executor, Aggregate::Sum, column).await
    }

    /// `AVG(column)`, or `None` for an empty set.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn avg(&self, executor: &mut dyn Executor, column: &str) -> Result<Option<SqlValue>> {
        self.aggregate(executor, Aggregate::Avg, column).await
    }

    /// `MIN(column)`, or `None` for an empty set.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn min(&self, executor: &mut dyn Executor, column: &str) -> Result<Option<SqlValue>> {
        self.aggregate(executor, Aggregate::Min, column).await
    }

    /// `MAX(column)`, or `None` for an empty set.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn max(&self, executor: &mut dyn Executor, column: &str) -> Result<Option<SqlValue>> {
        self.aggregate(executor, Aggregate::Max, column).await
    }

    /// Returns true when at least one row matches.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn exists(&self, executor: &mut dyn Executor) -> Result<bool> {
        let (sql, bindings) = self.compile_exists()?;
        Ok(executor.select_one(&sql, &bindings).await?.is_some())
    }

    /// Negation of [`QueryBuilder::exists`].
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn doesnt_exist(&self, executor: &mut dyn Executor) -> Result<bool> {
        Ok(!self.exists(executor).await?)
    }

    /// Fetches `per_page + 1` rows to learn whether a next page exists,
    /// without counting.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn simple_paginate(
        &self,
        executor: &mut dyn Executor,
        per_page: u64,
        page: u64,
    ) -> Result<SimplePage> {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let mut data = self
            .clone()
            .offset((page - 1).saturating_mul(per_page))
            .limit(per_page.saturating_add(1))
            .get(executor)
            .await?;

        let has_more = u64::try_from(data.len()).is_ok_and(|n| n > per_page);
        if has_more {
            data.pop();
        }

        Ok(SimplePage {
            data,
            per_page,
            current_page: page,
            next_page: has_more.then_some(page.saturating_add(1)),
            prev_page: (page > 1).then(|| page - 1),
        })
    }

    /// Inserts one row and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn insert(&self, executor: &mut dyn Executor, values: &[(&str, SqlValue)]) -> Result<u64> {
        let (sql, bindings) = self.compile_insert(values)?;
        executor.execute(&sql, &bindings).await
    }

    /// Inserts one row and returns the id the driver generated for it.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn insert_get_id(
        &self,
        executor: &mut dyn Executor,
        values: &[(&str, SqlValue)],
    ) -> Result<Option<i64>> {
        self.insert(executor, values).await?;
        Ok(executor.last_insert_id())
    }

    /// Updates the filtered rows and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn update(&self, executor: &mut dyn Executor, values: &[(&str, SqlValue)]) -> Result<u64> {
        let (sql, bindings) = self.compile_update(values)?;
        executor.execute(&sql, &bindings).await
    }

    /// Deletes the filtered rows and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Compilation or execution errors.
    pub async fn delete(&self, executor: &mut dyn Executor) -> Result<u64> {
        let (sql, bindings) = self.compile_delete()?;
        executor.execute(&sql, &bindings).await
    }
}

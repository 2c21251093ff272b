//! Query builder state and the pure SQL compilers.

use crate::dialect::{Dialect, MySqlDialect};
use crate::error::CompileError;
use crate::value::{SqlValue, ToSqlValue};

use super::join::{JoinClause, JoinKind};
use super::where_clause::{Connector, Filter, Operator, WhereGroup, WhereNode};

/// Column alias used by aggregate queries.
pub const AGGREGATE_ALIAS: &str = "_aggregate";

/// A selected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Column reference, quoted on compile.
    Column(String),
    /// Raw expression, emitted verbatim.
    Raw(String),
}

/// Aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// `COUNT`
    Count,
    /// `SUM`
    Sum,
    /// `AVG`
    Avg,
    /// `MIN`
    Min,
    /// `MAX`
    Max,
}

impl Aggregate {
    /// Returns the SQL function name.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

impl Direction {
    /// Parses a direction. Anything other than `desc` (any case) is ascending.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Order {
    Column { column: String, direction: Direction },
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Having {
    Basic {
        column: String,
        operator: Operator,
        value: SqlValue,
    },
    Raw {
        sql: String,
        bindings: Vec<SqlValue>,
    },
}

/// Fluent SELECT/INSERT/UPDATE/DELETE builder for one table.
///
/// Builder methods consume and return the builder. Compilation borrows it and
/// never changes it, so the same builder can be compiled any number of times
/// with identical output.
///
/// # Example
///
/// ```rust
/// use quarry_core::query::{Filter, QueryBuilder};
/// use quarry_core::SqlValue;
///
/// let (sql, bindings) = QueryBuilder::new("users")
///     .select(["id", "email"])
///     .where_eq("active", true)
///     .where_group(|g| g.where_op("age", ">", 18).or_where_null("age"))
///     .order_by("id", "desc")
///     .limit(10)
///     .compile_select()
///     .unwrap();
///
/// assert_eq!(
///     sql,
///     "SELECT `id`, `email` FROM `users` WHERE `active` = ? AND (`age` > ? OR `age` IS NULL) ORDER BY `id` DESC LIMIT 10"
/// );
/// assert_eq!(bindings, vec![SqlValue::Bool(true), SqlValue::Int(18)]);
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    columns: Vec<Selection>,
    distinct: bool,
    joins: Vec<JoinClause>,
    wheres: WhereGroup,
    groups: Vec<String>,
    havings: Vec<(Connector, Having)>,
    orders: Vec<Order>,
    limit: Option<u64>,
    offset: Option<u64>,
    dialect: &'static dyn Dialect,
}

impl QueryBuilder {
    /// Creates a builder for `table` using the MySQL dialect.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            wheres: WhereGroup::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            dialect: &MySqlDialect,
        }
    }

    /// Switches the dialect used for identifier quoting.
    #[must_use]
    pub fn with_dialect(mut self, dialect: &'static dyn Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Target table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Dialect used for quoting.
    #[must_use]
    pub fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    /// Current LIMIT.
    #[must_use]
    pub const fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// Current OFFSET.
    #[must_use]
    pub const fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Root WHERE group.
    #[must_use]
    pub const fn wheres(&self) -> &WhereGroup {
        &self.wheres
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Replaces the selected columns.
    #[must_use]
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns
            .into_iter()
            .map(|c| Selection::Column(c.into()))
            .collect();
        self
    }

    /// Appends a raw select expression.
    #[must_use]
    pub fn select_raw(mut self, expression: &str) -> Self {
        self.columns.push(Selection::Raw(expression.to_string()));
        self
    }

    /// Emits `SELECT DISTINCT`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ------------------------------------------------------------------
    // Joins
    // ------------------------------------------------------------------

    /// `INNER JOIN table ON first operator second`.
    #[must_use]
    pub fn join(self, table: &str, first: &str, operator: &str, second: &str) -> Self {
        self.join_with(JoinClause::new(JoinKind::Inner, table).on(first, operator, second))
    }

    /// `LEFT JOIN table ON first operator second`.
    #[must_use]
    pub fn left_join(self, table: &str, first: &str, operator: &str, second: &str) -> Self {
        self.join_with(JoinClause::new(JoinKind::Left, table).on(first, operator, second))
    }

    /// `RIGHT JOIN table ON first operator second`.
    #[must_use]
    pub fn right_join(self, table: &str, first: &str, operator: &str, second: &str) -> Self {
        self.join_with(JoinClause::new(JoinKind::Right, table).on(first, operator, second))
    }

    /// `CROSS JOIN table`.
    #[must_use]
    pub fn cross_join(self, table: &str) -> Self {
        self.join_with(JoinClause::new(JoinKind::Cross, table))
    }

    /// Appends a fully built join clause.
    #[must_use]
    pub fn join_with(mut self, join: JoinClause) -> Self {
        self.joins.push(join);
        self
    }

    // ------------------------------------------------------------------
    // Grouping
    // ------------------------------------------------------------------

    /// Appends GROUP BY columns.
    #[must_use]
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(columns.into_iter().map(Into::into));
        self
    }

    /// `HAVING column operator ?`.
    #[must_use]
    pub fn having(self, column: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.push_having(Connector::And, basic_having(column, operator, value))
    }

    /// OR form of [`QueryBuilder::having`].
    #[must_use]
    pub fn or_having(self, column: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.push_having(Connector::Or, basic_having(column, operator, value))
    }

    /// Raw HAVING fragment with its own bindings.
    #[must_use]
    pub fn having_raw(self, sql: &str, bindings: Vec<SqlValue>) -> Self {
        self.push_having(
            Connector::And,
            Having::Raw {
                sql: sql.to_string(),
                bindings,
            },
        )
    }

    /// OR form of [`QueryBuilder::having_raw`].
    #[must_use]
    pub fn or_having_raw(self, sql: &str, bindings: Vec<SqlValue>) -> Self {
        self.push_having(
            Connector::Or,
            Having::Raw {
                sql: sql.to_string(),
                bindings,
            },
        )
    }

    fn push_having(mut self, connector: Connector, having: Having) -> Self {
        self.havings.push((connector, having));
        self
    }

    // ------------------------------------------------------------------
    // Ordering and paging
    // ------------------------------------------------------------------

    /// Appends `column ASC|DESC`. Only `desc` (any case) sorts descending.
    #[must_use]
    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        self.orders.push(Order::Column {
            column: column.to_string(),
            direction: Direction::parse(direction),
        });
        self
    }

    /// Appends `column DESC`.
    #[must_use]
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, "desc")
    }

    /// Appends a raw ORDER BY expression.
    #[must_use]
    pub fn order_by_raw(mut self, expression: &str) -> Self {
        self.orders.push(Order::Raw(expression.to_string()));
        self
    }

    /// Sets LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets OFFSET.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Selects page `page` (1-based, 0 is treated as 1) of `per_page` rows.
    #[must_use]
    pub const fn for_page(self, page: u64, per_page: u64) -> Self {
        let page = if page == 0 { 1 } else { page };
        self.offset((page - 1).saturating_mul(per_page))
            .limit(per_page)
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    /// Compiles a SELECT statement.
    ///
    /// Bindings follow textual order: join values, then WHERE, then HAVING.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] for unknown operators, empty `IN` lists and
    /// operands that do not match their operator.
    pub fn compile_select(&self) -> Result<(String, Vec<SqlValue>), CompileError> {
        let d = self.dialect;
        let mut bindings = Vec::new();

        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.compile_columns());
        sql.push_str(" FROM ");
        sql.push_str(&d.wrap_column(&self.table));

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.compile(d, &mut bindings)?);
        }

        if let Some(wheres) = self.wheres.compile(d, &mut bindings)? {
            sql.push_str(" WHERE ");
            sql.push_str(&wheres);
        }

        if !self.groups.is_empty() {
            let cols: Vec<String> = self.groups.iter().map(|c| d.wrap_column(c)).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&cols.join(", "));
        }

        if !self.havings.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&self.compile_havings(&mut bindings)?);
        }

        if !self.orders.is_empty() {
            let parts: Vec<String> = self
                .orders
                .iter()
                .map(|order| match order {
                    Order::Column { column, direction } => {
                        format!("{} {}", d.wrap_column(column), direction.as_sql())
                    }
                    Order::Raw(expression) => expression.clone(),
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok((sql, bindings))
    }

    fn compile_columns(&self) -> String {
        if self.columns.is_empty() {
            return String::from("*");
        }
        self.columns
            .iter()
            .map(|c| match c {
                Selection::Column(name) => self.dialect.wrap_column(name),
                Selection::Raw(expression) => expression.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn compile_havings(&self, bindings: &mut Vec<SqlValue>) -> Result<String, CompileError> {
        let mut parts = Vec::with_capacity(self.havings.len());
        for (i, (connector, having)) in self.havings.iter().enumerate() {
            let fragment = match having {
                Having::Basic {
                    column,
                    operator,
                    value,
                } => {
                    operator.ensure_comparison(column)?;
                    bindings.push(value.clone());
                    format!(
                        "{} {} ?",
                        self.dialect.wrap_column(column),
                        operator.as_sql()
                    )
                }
                Having::Raw {
                    sql,
                    bindings: raw,
                } => {
                    bindings.extend(raw.iter().cloned());
                    sql.clone()
                }
            };
            if i == 0 {
                parts.push(fragment);
            } else {
                parts.push(format!("{} {fragment}", connector.as_sql()));
            }
        }
        Ok(parts.join(" "))
    }

    /// Compiles `SELECT FUNC(column) AS _aggregate` on a copy of the query.
    ///
    /// ORDER BY, LIMIT and OFFSET are cleared on the copy; the builder itself
    /// is untouched.
    ///
    /// # Errors
    ///
    /// See [`QueryBuilder::compile_select`].
    pub fn compile_aggregate(
        &self,
        function: Aggregate,
        column: &str,
    ) -> Result<(String, Vec<SqlValue>), CompileError> {
        let mut query = self.clone();
        query.columns = vec![Selection::Raw(format!(
            "{}({}) AS {AGGREGATE_ALIAS}",
            function.as_sql(),
            self.dialect.wrap_column(column)
        ))];
        query.orders.clear();
        query.limit = None;
        query.offset = None;
        query.compile_select()
    }

    /// Compiles the query with LIMIT 1 when no LIMIT was set.
    ///
    /// # Errors
    ///
    /// See [`QueryBuilder::compile_select`].
    pub fn compile_first(&self) -> Result<(String, Vec<SqlValue>), CompileError> {
        let mut query = self.clone();
        query.limit.get_or_insert(1);
        query.compile_select()
    }

    /// Compiles `SELECT 1 ... LIMIT 1` for existence checks.
    ///
    /// # Errors
    ///
    /// See [`QueryBuilder::compile_select`].
    pub fn compile_exists(&self) -> Result<(String, Vec<SqlValue>), CompileError> {
        let mut query = self.clone();
        query.columns = vec![Selection::Raw(String::from("1"))];
        query.limit = Some(1);
        query.compile_select()
    }

    /// Compiles `INSERT INTO table (cols) VALUES (?, ...)`.
    ///
    /// # Errors
    ///
    /// [`CompileError::EmptyValues`] when `values` is empty.
    pub fn compile_insert(
        &self,
        values: &[(&str, SqlValue)],
    ) -> Result<(String, Vec<SqlValue>), CompileError> {
        if values.is_empty() {
            return Err(CompileError::EmptyValues("insert"));
        }
        let d = self.dialect;
        let columns: Vec<String> = values.iter().map(|(c, _)| d.wrap_column(c)).collect();
        let placeholders = vec![SqlValue::placeholder(); values.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            d.wrap_column(&self.table),
            columns.join(", ")
        );
        Ok((sql, values.iter().map(|(_, v)| v.clone()).collect()))
    }

    /// Compiles `UPDATE table SET col = ?, ... [WHERE ...]`.
    ///
    /// SET bindings come before WHERE bindings.
    ///
    /// # Errors
    ///
    /// [`CompileError::EmptyValues`] when `values` is empty, or any WHERE
    /// compilation error.
    pub fn compile_update(
        &self,
        values: &[(&str, SqlValue)],
    ) -> Result<(String, Vec<SqlValue>), CompileError> {
        if values.is_empty() {
            return Err(CompileError::EmptyValues("update"));
        }
        let d = self.dialect;
        let sets: Vec<String> = values
            .iter()
            .map(|(c, _)| format!("{} = ?", d.wrap_column(c)))
            .collect();
        let mut bindings: Vec<SqlValue> = values.iter().map(|(_, v)| v.clone()).collect();
        let mut sql = format!("UPDATE {} SET {}", d.wrap_column(&self.table), sets.join(", "));
        if let Some(wheres) = self.wheres.compile(d, &mut bindings)? {
            sql.push_str(" WHERE ");
            sql.push_str(&wheres);
        }
        Ok((sql, bindings))
    }

    /// Compiles `DELETE FROM table [WHERE ...]`.
    ///
    /// # Errors
    ///
    /// Any WHERE compilation error.
    pub fn compile_delete(&self) -> Result<(String, Vec<SqlValue>), CompileError> {
        let d = self.dialect;
        let mut bindings = Vec::new();
        let mut sql = format!("DELETE FROM {}", d.wrap_column(&self.table));
        if let Some(wheres) = self.wheres.compile(d, &mut bindings)? {
            sql.push_str(" WHERE ");
            sql.push_str(&wheres);
        }
        Ok((sql, bindings))
    }

    /// SQL text of the SELECT statement.
    ///
    /// # Errors
    ///
    /// See [`QueryBuilder::compile_select`].
    pub fn to_sql(&self) -> Result<String, CompileError> {
        self.compile_select().map(|(sql, _)| sql)
    }

    /// Bindings of the SELECT statement.
    ///
    /// # Errors
    ///
    /// See [`QueryBuilder::compile_select`].
    pub fn bindings(&self) -> Result<Vec<SqlValue>, CompileError> {
        self.compile_select().map(|(_, bindings)| bindings)
    }
}

impl Filter for QueryBuilder {
    fn push_where(mut self, connector: Connector, node: WhereNode) -> Self {
        self.wheres.push(connector, node);
        self
    }
}

fn basic_having(column: &str, operator: &str, value: impl ToSqlValue) -> Having {
    Having::Basic {
        column: column.to_string(),
        operator: Operator::parse(operator),
        value: value.to_sql_value(),
    }
}

//! WHERE expression tree.
//!
//! A filter is a [`WhereGroup`]: an ordered list of `(Connector, WhereNode)`
//! items where each node is either a single [`Condition`] or another group.
//! The connector of the first emitted item is dropped, nested groups are
//! parenthesized and empty groups vanish.

use crate::dialect::Dialect;
use crate::error::CompileError;
use crate::value::{SqlValue, ToSqlValue};

/// Comparison operator of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<>` (also written `!=`)
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// `BETWEEN ? AND ?`
    Between,
    /// `NOT BETWEEN ? AND ?`
    NotBetween,
    /// Raw SQL fragment with its own bindings.
    Raw,
    /// Anything else. Rejected at compile time.
    Other(String),
}

impl Operator {
    /// Parses an operator, ignoring case and extra whitespace.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let normalized = input
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        match normalized.as_str() {
            "=" => Self::Eq,
            "<>" | "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "LIKE" => Self::Like,
            "NOT LIKE" => Self::NotLike,
            "IN" => Self::In,
            "NOT IN" => Self::NotIn,
            "IS NULL" => Self::IsNull,
            "IS NOT NULL" => Self::IsNotNull,
            "BETWEEN" => Self::Between,
            "NOT BETWEEN" => Self::NotBetween,
            "RAW" => Self::Raw,
            _ => Self::Other(input.to_string()),
        }
    }

    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub fn as_sql(&self) -> &str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::Raw => "RAW",
            Self::Other(s) => s,
        }
    }

    /// Returns true for operators that compare two scalars.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Ne
                | Self::Lt
                | Self::Le
                | Self::Gt
                | Self::Ge
                | Self::Like
                | Self::NotLike
        )
    }

    /// Checks that the operator is known and compares two scalars.
    ///
    /// # Errors
    ///
    /// [`CompileError::UnknownOperator`] for unparsed operators and
    /// [`CompileError::OperandMismatch`] for operators that need a list,
    /// range or no operand.
    pub fn ensure_comparison(&self, column: &str) -> Result<(), CompileError> {
        if let Self::Other(op) = self {
            return Err(CompileError::UnknownOperator(op.clone()));
        }
        if self.is_comparison() {
            Ok(())
        } else {
            Err(CompileError::OperandMismatch {
                column: column.to_string(),
                operator: self.as_sql().to_string(),
                expected: "a comparison operator",
            })
        }
    }
}

impl From<&str> for Operator {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand (`IS NULL`).
    None,
    /// Single bound value.
    Value(SqlValue),
    /// List of bound values (`IN`).
    List(Vec<SqlValue>),
    /// Inclusive range (`BETWEEN`).
    Range(SqlValue, SqlValue),
    /// Raw fragment and its bindings.
    Raw {
        /// SQL text, with `?` placeholders.
        sql: String,
        /// Values for the placeholders in `sql`.
        bindings: Vec<SqlValue>,
    },
}

/// A single `column operator operand` test.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column reference, possibly `table.column`. Empty for raw conditions.
    pub column: String,
    /// Operator.
    pub operator: Operator,
    /// Operand.
    pub operand: Operand,
}

impl Condition {
    /// Creates a condition.
    pub fn new(column: impl Into<String>, operator: Operator, operand: Operand) -> Self {
        Self {
            column: column.into(),
            operator,
            operand,
        }
    }

    /// Creates a raw condition.
    pub fn raw(sql: impl Into<String>, bindings: Vec<SqlValue>) -> Self {
        Self::new(
            String::new(),
            Operator::Raw,
            Operand::Raw {
                sql: sql.into(),
                bindings,
            },
        )
    }

    fn mismatch(&self, expected: &'static str) -> CompileError {
        CompileError::OperandMismatch {
            column: self.column.clone(),
            operator: self.operator.as_sql().to_string(),
            expected,
        }
    }

    /// Compiles the condition, appending its bindings.
    ///
    /// # Errors
    ///
    /// Fails on unknown operators, empty `IN` lists and operands that do not
    /// fit the operator.
    pub fn compile(
        &self,
        dialect: &dyn Dialect,
        bindings: &mut Vec<SqlValue>,
    ) -> Result<String, CompileError> {
        let op = &self.operator;
        match (op, &self.operand) {
            (Operator::Other(name), _) => Err(CompileError::UnknownOperator(name.clone())),
            (Operator::Raw, Operand::Raw { sql, bindings: raw }) => {
                bindings.extend(raw.iter().cloned());
                Ok(format!("({sql})"))
            }
            (Operator::Raw, _) => Err(self.mismatch("a raw fragment")),
            (Operator::IsNull | Operator::IsNotNull, Operand::None) => Ok(format!(
                "{} {}",
                dialect.wrap_column(&self.column),
                op.as_sql()
            )),
            (Operator::IsNull | Operator::IsNotNull, _) => Err(self.mismatch("no operand")),
            (Operator::In | Operator::NotIn, Operand::List(values)) => {
                if values.is_empty() {
                    return Err(CompileError::EmptyInList {
                        column: self.column.clone(),
                        operator: op.as_sql().to_string(),
                    });
                }
                let placeholders = vec![SqlValue::placeholder(); values.len()].join(", ");
                bindings.extend(values.iter().cloned());
                Ok(format!(
                    "{} {} ({placeholders})",
                    dialect.wrap_column(&self.column),
                    op.as_sql()
                ))
            }
            (Operator::In | Operator::NotIn, _) => Err(self.mismatch("a list of values")),
            (Operator::Between | Operator::NotBetween, Operand::Range(low, high)) => {
                bindings.push(low.clone());
                bindings.push(high.clone());
                Ok(format!(
                    "{} {} ? AND ?",
                    dialect.wrap_column(&self.column),
                    op.as_sql()
                ))
            }
            (Operator::Between | Operator::NotBetween, _) => {
                Err(self.mismatch("a range of two values"))
            }
            (_, Operand::Value(value)) => {
                bindings.push(value.clone());
                Ok(format!(
                    "{} {} ?",
                    dialect.wrap_column(&self.column),
                    op.as_sql()
                ))
            }
            (_, _) => Err(self.mismatch("a single value")),
        }
    }
}

/// Boolean connector between siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Connector {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A node in the WHERE tree.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereNode {
    /// A single test.
    Condition(Condition),
    /// A parenthesized group.
    Group(WhereGroup),
}

/// An ordered list of connected WHERE nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereGroup {
    items: Vec<(Connector, WhereNode)>,
}

impl WhereGroup {
    /// Creates an empty group.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns true when the group has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of direct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Direct items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[(Connector, WhereNode)] {
        &self.items
    }

    /// Appends a node.
    pub fn push(&mut self, connector: Connector, node: WhereNode) {
        self.items.push((connector, node));
    }

    /// Compiles the group without surrounding parentheses.
    ///
    /// Returns `None` when nothing is emitted, including when every nested
    /// group is empty.
    ///
    /// # Errors
    ///
    /// Propagates the first condition that fails to compile.
    pub fn compile(
        &self,
        dialect: &dyn Dialect,
        bindings: &mut Vec<SqlValue>,
    ) -> Result<Option<String>, CompileError> {
        let mut parts: Vec<String> = Vec::with_capacity(self.items.len());

        for (connector, node) in &self.items {
            let fragment = match node {
                WhereNode::Condition(condition) => condition.compile(dialect, bindings)?,
                WhereNode::Group(group) => match group.compile(dialect, bindings)? {
                    Some(inner) => format!("({inner})"),
                    None => continue,
                },
            };
            if parts.is_empty() {
                parts.push(fragment);
            } else {
                parts.push(format!("{} {fragment}", connector.as_sql()));
            }
        }

        if parts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(parts.join(" ")))
        }
    }
}

/// Fluent WHERE API shared by [`QueryBuilder`](super::QueryBuilder) and
/// [`WhereGroup`].
pub trait Filter: Sized {
    /// Appends a node with the given connector.
    #[must_use]
    fn push_where(self, connector: Connector, node: WhereNode) -> Self;

    /// Appends `column operator ?`.
    #[must_use]
    fn where_op(self, column: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.push_where(
            Connector::And,
            condition(column, operator, Operand::Value(value.to_sql_value())),
        )
    }

    /// OR form of [`Filter::where_op`].
    #[must_use]
    fn or_where_op(self, column: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.push_where(
            Connector::Or,
            condition(column, operator, Operand::Value(value.to_sql_value())),
        )
    }

    /// Appends `column = ?`.
    #[must_use]
    fn where_eq(self, column: &str, value: impl ToSqlValue) -> Self {
        self.where_op(column, "=", value)
    }

    /// OR form of [`Filter::where_eq`].
    #[must_use]
    fn or_where_eq(self, column: &str, value: impl ToSqlValue) -> Self {
        self.or_where_op(column, "=", value)
    }

    /// Appends `column IN (?, ...)`.
    #[must_use]
    fn where_in<V: ToSqlValue>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.push_where(Connector::And, list(column, Operator::In, values))
    }

    /// OR form of [`Filter::where_in`].
    #[must_use]
    fn or_where_in<V: ToSqlValue>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.push_where(Connector::Or, list(column, Operator::In, values))
    }

    /// Appends `column NOT IN (?, ...)`.
    #[must_use]
    fn where_not_in<V: ToSqlValue>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.push_where(Connector::And, list(column, Operator::NotIn, values))
    }

    /// OR form of [`Filter::where_not_in`].
    #[must_use]
    fn or_where_not_in<V: ToSqlValue>(
        self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.push_where(Connector::Or, list(column, Operator::NotIn, values))
    }

    /// Appends `column IS NULL`.
    #[must_use]
    fn where_null(self, column: &str) -> Self {
        self.push_where(
            Connector::And,
            WhereNode::Condition(Condition::new(column, Operator::IsNull, Operand::None)),
        )
    }

    /// OR form of [`Filter::where_null`].
    #[must_use]
    fn or_where_null(self, column: &str) -> Self {
        self.push_where(
            Connector::Or,
            WhereNode::Condition(Condition::new(column, Operator::IsNull, Operand::None)),
        )
    }

    /// Appends `column IS NOT NULL`.
    #[must_use]
    fn where_not_null(self, column: &str) -> Self {
        self.push_where(
            Connector::And,
            WhereNode::Condition(Condition::new(column, Operator::IsNotNull, Operand::None)),
        )
    }

    /// OR form of [`Filter::where_not_null`].
    #[must_use]
    fn or_where_not_null(self, column: &str) -> Self {
        self.push_where(
            Connector::Or,
            WhereNode::Condition(Condition::new(column, Operator::IsNotNull, Operand::None)),
        )
    }

    /// Appends `column BETWEEN ? AND ?`.
    #[must_use]
    fn where_between(self, column: &str, low: impl ToSqlValue, high: impl ToSqlValue) -> Self {
        self.push_where(Connector::And, range(column, Operator::Between, low, high))
    }

    /// OR form of [`Filter::where_between`].
    #[must_use]
    fn or_where_between(self, column: &str, low: impl ToSqlValue, high: impl ToSqlValue) -> Self {
        self.push_where(Connector::Or, range(column, Operator::Between, low, high))
    }

    /// Appends `column NOT BETWEEN ? AND ?`.
    #[must_use]
    fn where_not_between(self, column: &str, low: impl ToSqlValue, high: impl ToSqlValue) -> Self {
        self.push_where(Connector::And, range(column, Operator::NotBetween, low, high))
    }

    /// OR form of [`Filter::where_not_between`].
    #[must_use]
    fn or_where_not_between(
        self,
        column: &str,
        low: impl ToSqlValue,
        high: impl ToSqlValue,
    ) -> Self {
        self.push_where(Connector::Or, range(column, Operator::NotBetween, low, high))
    }

    /// Appends a raw fragment, emitted as `(sql)`.
    #[must_use]
    fn where_raw(self, sql: &str, bindings: Vec<SqlValue>) -> Self {
        self.push_where(Connector::And, WhereNode::Condition(Condition::raw(sql, bindings)))
    }

    /// OR form of [`Filter::where_raw`].
    #[must_use]
    fn or_where_raw(self, sql: &str, bindings: Vec<SqlValue>) -> Self {
        self.push_where(Connector::Or, WhereNode::Condition(Condition::raw(sql, bindings)))
    }

    /// Appends a prebuilt group.
    #[must_use]
    fn where_nested(self, group: WhereGroup) -> Self {
        self.push_where(Connector::And, WhereNode::Group(group))
    }

    /// OR form of [`Filter::where_nested`].
    #[must_use]
    fn or_where_nested(self, group: WhereGroup) -> Self {
        self.push_where(Connector::Or, WhereNode::Group(group))
    }

    /// Builds a nested group with a fresh sub-builder and appends it.
    #[must_use]
    fn where_group<F>(self, build: F) -> Self
    where
        F: FnOnce(WhereGroup) -> WhereGroup,
    {
        self.where_nested(build(WhereGroup::new()))
    }

    /// OR form of [`Filter::where_group`].
    #[must_use]
    fn or_where_group<F>(self, build: F) -> Self
    where
        F: FnOnce(WhereGroup) -> WhereGroup,
    {
        self.or_where_nested(build(WhereGroup::new()))
    }
}

impl Filter for WhereGroup {
    fn push_where(mut self, connector: Connector, node: WhereNode) -> Self {
        self.push(connector, node);
        self
    }
}

fn condition(column: &str, operator: &str, operand: Operand) -> WhereNode {
    WhereNode::Condition(Condition::new(column, Operator::parse(operator), operand))
}

fn list<V: ToSqlValue>(
    column: &str,
    operator: Operator,
    values: impl IntoIterator<Item = V>,
) -> WhereNode {
    let values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
    WhereNode::Condition(Condition::new(column, operator, Operand::List(values)))
}

fn range(
    column: &str,
    operator: Operator,
    low: impl ToSqlValue,
    high: impl ToSqlValue,
) -> WhereNode {
    WhereNode::Condition(Condition::new(
        column,
        operator,
        Operand::Range(low.to_sql_value(), high.to_sql_value()),
    ))
}

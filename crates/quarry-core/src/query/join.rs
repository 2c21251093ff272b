//! JOIN clauses.

use crate::dialect::Dialect;
use crate::error::CompileError;
use crate::value::{SqlValue, ToSqlValue};

use super::where_clause::{Condition, Operand, Operator};

/// Kind of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
    /// `CROSS JOIN`, never has an ON clause.
    Cross,
}

impl JoinKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// One ON condition.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// `first operator second`, both columns.
    Columns {
        /// Left column.
        first: String,
        /// Operator.
        operator: Operator,
        /// Right column.
        second: String,
    },
    /// `column operator ?`, with a bound value.
    Value(Condition),
}

/// A join against another table.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    kind: JoinKind,
    table: String,
    conditions: Vec<JoinCondition>,
}

impl JoinClause {
    /// Creates a join with no conditions.
    pub fn new(kind: JoinKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            conditions: Vec::new(),
        }
    }

    /// Adds `first operator second` comparing two columns.
    #[must_use]
    pub fn on(mut self, first: &str, operator: &str, second: &str) -> Self {
        self.conditions.push(JoinCondition::Columns {
            first: first.to_string(),
            operator: Operator::parse(operator),
            second: second.to_string(),
        });
        self
    }

    /// Adds `column operator ?` comparing a column with a value.
    #[must_use]
    pub fn where_op(mut self, column: &str, operator: &str, value: impl ToSqlValue) -> Self {
        self.conditions.push(JoinCondition::Value(Condition::new(
            column,
            Operator::parse(operator),
            Operand::Value(value.to_sql_value()),
        )));
        self
    }

    /// Join kind.
    #[must_use]
    pub const fn kind(&self) -> JoinKind {
        self.kind
    }

    /// Joined table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Compiles the clause, appending value bindings in ON order.
    ///
    /// # Errors
    ///
    /// Fails when an ON condition uses an operator that does not compare two
    /// scalars.
    pub fn compile(
        &self,
        dialect: &dyn Dialect,
        bindings: &mut Vec<SqlValue>,
    ) -> Result<String, CompileError> {
        let mut sql = format!("{} {}", self.kind.as_sql(), dialect.wrap_column(&self.table));
        if self.kind == JoinKind::Cross || self.conditions.is_empty() {
            return Ok(sql);
        }

        let mut parts = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            match condition {
                JoinCondition::Columns {
                    first,
                    operator,
                    second,
                } => {
                    operator.ensure_comparison(first)?;
                    parts.push(format!(
                        "{} {} {}",
                        dialect.wrap_column(first),
                        operator.as_sql(),
                        dialect.wrap_column(second)
                    ));
                }
                JoinCondition::Value(condition) => {
                    condition.operator.ensure_comparison(&condition.column)?;
                    parts.push(condition.compile(dialect, bindings)?);
                }
            }
        }

        sql.push_str(" ON ");
        sql.push_str(&parts.join(" AND "));
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySqlDialect;

    #[test]
    fn test_on_conditions_joined_with_and() {
        let join = JoinClause::new(JoinKind::Left, "posts")
            .on("posts.user_id", "=", "users.id")
            .where_op("posts.published", "=", true);
        let mut bindings = Vec::new();
        let sql = join.compile(&MySqlDialect, &mut bindings).unwrap();
        assert_eq!(
            sql,
            "LEFT JOIN `posts` ON `posts`.`user_id` = `users`.`id` AND `posts`.`published` = ?"
        );
        assert_eq!(bindings, vec![SqlValue::Bool(true)]);
    }

    #[test]
    fn test_cross_join_has_no_on() {
        let join = JoinClause::new(JoinKind::Cross, "colors").on("a", "=", "b");
        let sql = join.compile(&MySqlDialect, &mut Vec::new()).unwrap();
        assert_eq!(sql, "CROSS JOIN `colors`");
    }

    #[test]
    fn test_non_comparison_on_operator_is_rejected() {
        let join = JoinClause::new(JoinKind::Inner, "t").on("a", "in", "b");
        assert!(join.compile(&MySqlDialect, &mut Vec::new()).is_err());
    }
}

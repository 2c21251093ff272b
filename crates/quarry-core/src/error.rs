//! Error types for query and schema compilation and execution.

use crate::value::SqlValue;

/// Errors raised while turning a builder or blueprint into SQL.
///
/// Compilation is pure, so these never carry a database cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The operator string is not one the compiler understands.
    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),

    /// An `IN` / `NOT IN` condition was given an empty list.
    #[error("Empty value list for {operator} on column '{column}'")]
    EmptyInList {
        /// Column the condition applies to.
        column: String,
        /// `IN` or `NOT IN`.
        operator: String,
    },

    /// The operand does not fit the operator (e.g. `BETWEEN` without a range).
    #[error("Operator {operator} on column '{column}' expects {expected}")]
    OperandMismatch {
        /// Column the condition applies to.
        column: String,
        /// Operator as written in SQL.
        operator: String,
        /// Human readable description of the expected operand.
        expected: &'static str,
    },

    /// INSERT or UPDATE was compiled with no values.
    #[error("No values given for {0}")]
    EmptyValues(&'static str),

    /// A foreign key is missing its referenced table or column.
    #[error("Foreign key on '{table}.{column}' has no referenced table or column")]
    IncompleteForeignKey {
        /// Table owning the foreign key.
        table: String,
        /// Local column.
        column: String,
    },

    /// The blueprint was asked for a rename statement without a target.
    #[error("Table '{0}' has no rename target")]
    MissingRenameTarget(String),

    /// A column default has no SQL literal form (NaN or infinite floats).
    #[error("Default value {0} has no SQL literal")]
    InvalidDefault(String),

    /// The dialect cannot express the requested schema change.
    #[error("{dialect} does not support {feature}")]
    UnsupportedByDialect {
        /// Dialect name.
        dialect: &'static str,
        /// Description of the unsupported change.
        feature: String,
    },
}

/// Errors returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// SQL could not be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The executor rejected a statement.
    #[error("{message} (SQL: {sql})")]
    Execution {
        /// Driver message.
        message: String,
        /// Statement text that failed.
        sql: String,
        /// Bindings that were sent with the statement.
        bindings: Vec<SqlValue>,
        /// Underlying driver error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Builds an execution error for a failed statement.
    pub fn execution(
        message: impl Into<String>,
        sql: impl Into<String>,
        bindings: &[SqlValue],
    ) -> Self {
        Self::Execution {
            message: message.into(),
            sql: sql.into(),
            bindings: bindings.to_vec(),
            source: None,
        }
    }

    /// Attaches the underlying driver error.
    #[must_use]
    pub fn with_source(self, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        match self {
            Self::Execution {
                message,
                sql,
                bindings,
                ..
            } => Self::Execution {
                message,
                sql,
                bindings,
                source: Some(Box::new(err)),
            },
            other => other,
        }
    }

    /// Returns the SQL text for execution errors.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Execution { sql, .. } => Some(sql),
            Self::Compile(_) => None,
        }
    }
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

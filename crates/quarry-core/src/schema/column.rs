//! Column definitions.

use crate::error::CompileError;

/// Logical column type. Each grammar maps it to a concrete SQL type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing primary key.
    Id,
    /// Variable-length string (`length`).
    String,
    /// Fixed-length string (`length`).
    Char,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// 24-bit integer.
    MediumInteger,
    /// 16-bit integer.
    SmallInteger,
    /// 8-bit integer.
    TinyInteger,
    /// Boolean.
    Boolean,
    /// Text.
    Text,
    /// Medium text.
    MediumText,
    /// Long text.
    LongText,
    /// JSON document.
    Json,
    /// Fixed-point number (`precision`, `scale`).
    Decimal,
    /// Double precision float (`precision`, `scale`).
    Double,
    /// Single precision float (`precision`, `scale`).
    Float,
    /// Timestamp.
    Timestamp,
    /// Date and time.
    DateTime,
    /// Date.
    Date,
    /// Time of day.
    Time,
    /// Year.
    Year,
    /// UUID stored as text.
    Uuid,
    /// Binary data.
    Binary,
    /// Any other type, emitted uppercased.
    Custom(String),
}

/// Size options of a column type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Length of string types.
    pub length: Option<u32>,
    /// Total digits of numeric types.
    pub precision: Option<u32>,
    /// Digits after the decimal point.
    pub scale: Option<u32>,
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default, emitted as `1` / `0`.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default, emitted single-quoted.
    String(String),
    /// Raw SQL expression (e.g. `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl DefaultValue {
    /// Returns the SQL literal for the default.
    ///
    /// # Errors
    ///
    /// [`CompileError::InvalidDefault`] for NaN and infinite floats.
    pub fn to_sql(&self) -> Result<String, CompileError> {
        Ok(match self {
            Self::Null => String::from("NULL"),
            Self::Boolean(b) => String::from(if *b { "1" } else { "0" }),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) if f.is_finite() => f.to_string(),
            Self::Float(f) => return Err(CompileError::InvalidDefault(f.to_string())),
            Self::String(s) => quote_string(s),
            Self::Expression(expr) => expr.clone(),
        })
    }
}

/// Single-quotes a string literal, doubling embedded quotes.
#[must_use]
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for DefaultValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Constraint and attribute modifiers of a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnModifiers {
    /// `Some(false)` emits NOT NULL, `Some(true)` allows NULL explicitly.
    pub nullable: Option<bool>,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Column-level UNIQUE.
    pub unique: bool,
    /// Column-level PRIMARY KEY.
    pub primary: bool,
    /// Auto-increment.
    pub auto_increment: bool,
    /// Unsigned numeric type.
    pub unsigned: bool,
    /// Column comment.
    pub comment: Option<String>,
}

/// One column of a blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Logical type.
    pub column_type: ColumnType,
    /// Column name.
    pub name: String,
    /// Size options.
    pub options: ColumnOptions,
    /// Modifiers.
    pub modifiers: ColumnModifiers,
    /// Modify an existing column instead of adding one.
    pub change: bool,
}

impl ColumnDef {
    /// Creates a column with no modifiers.
    pub fn new(column_type: ColumnType, name: impl Into<String>) -> Self {
        Self {
            column_type,
            name: name.into(),
            options: ColumnOptions::default(),
            modifiers: ColumnModifiers::default(),
            change: false,
        }
    }

    /// Allows or forbids NULL.
    pub fn nullable(&mut self, value: bool) -> &mut Self {
        self.modifiers.nullable = Some(value);
        self
    }

    /// Forbids NULL.
    pub fn not_null(&mut self) -> &mut Self {
        self.nullable(false)
    }

    /// Sets the default value.
    pub fn default(&mut self, value: impl Into<DefaultValue>) -> &mut Self {
        self.modifiers.default = Some(value.into());
        self
    }

    /// Sets a raw default expression such as `CURRENT_TIMESTAMP`.
    pub fn default_raw(&mut self, expression: &str) -> &mut Self {
        self.modifiers.default = Some(DefaultValue::Expression(expression.to_string()));
        self
    }

    /// Adds a column-level UNIQUE constraint.
    pub fn unique(&mut self) -> &mut Self {
        self.modifiers.unique = true;
        self
    }

    /// Marks the column as the primary key.
    pub fn primary(&mut self) -> &mut Self {
        self.modifiers.primary = true;
        self
    }

    /// Marks the column as auto-incrementing.
    pub fn auto_increment(&mut self) -> &mut Self {
        self.modifiers.auto_increment = true;
        self
    }

    /// Marks a numeric column as unsigned.
    pub fn unsigned(&mut self) -> &mut Self {
        self.modifiers.unsigned = true;
        self
    }

    /// Attaches a comment.
    pub fn comment(&mut self, comment: &str) -> &mut Self {
        self.modifiers.comment = Some(comment.to_string());
        self
    }

    /// Turns the definition into a modification of an existing column.
    pub fn change(&mut self) -> &mut Self {
        self.change = true;
        self
    }
}

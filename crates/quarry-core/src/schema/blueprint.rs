//! Table blueprints.
//!
//! A [`Blueprint`] records every change requested for one table. Grammars
//! read it and emit CREATE or ALTER statements; the blueprint itself never
//! produces SQL.

use super::column::{ColumnDef, ColumnOptions, ColumnType};
use super::foreign::ForeignKeyDef;

/// Kind of table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Plain index.
    Index,
    /// Unique index.
    Unique,
    /// Primary key.
    Primary,
}

impl IndexKind {
    /// Suffix used in derived index names.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Unique => "unique",
            Self::Primary => "primary",
        }
    }
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// Index kind.
    pub kind: IndexKind,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Explicit name.
    pub name: Option<String>,
}

impl IndexDef {
    /// Overrides the derived name.
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    /// Explicit name, or `<table>_<col1>_<col2>_<kind>`.
    #[must_use]
    pub fn resolved_name(&self, table: &str) -> String {
        self.name.clone().unwrap_or_else(|| {
            let mut parts = Vec::with_capacity(self.columns.len() + 2);
            parts.push(table.to_string());
            parts.extend(self.columns.iter().cloned());
            parts.push(self.kind.suffix().to_string());
            parts.join("_").replace(['-', '.'], "_").to_lowercase()
        })
    }
}

/// A column rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumn {
    /// Current name.
    pub from: String,
    /// New name.
    pub to: String,
}

/// Requested changes for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    /// Table name.
    pub table: String,
    /// Columns to add or change.
    pub columns: Vec<ColumnDef>,
    /// Foreign keys to add.
    pub foreign_keys: Vec<ForeignKeyDef>,
    /// Indexes to add.
    pub indexes: Vec<IndexDef>,
    /// Columns to drop.
    pub drop_columns: Vec<String>,
    /// Index names to drop.
    pub drop_indexes: Vec<String>,
    /// Foreign key names to drop.
    pub drop_foreign_keys: Vec<String>,
    /// Primary keys to drop.
    pub drop_primary_keys: Vec<String>,
    /// Column renames.
    pub rename_columns: Vec<RenameColumn>,
    /// New table name.
    pub rename_table: Option<String>,
    /// Emit `IF NOT EXISTS` on CREATE.
    pub if_not_exists: bool,
}

impl Blueprint {
    /// Creates an empty blueprint.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            drop_columns: Vec::new(),
            drop_indexes: Vec::new(),
            drop_foreign_keys: Vec::new(),
            drop_primary_keys: Vec::new(),
            rename_columns: Vec::new(),
            rename_table: None,
            if_not_exists: false,
        }
    }

    /// Appends a column of any type.
    pub fn add_column(&mut self, column_type: ColumnType, name: &str) -> &mut ColumnDef {
        self.push_column(ColumnDef::new(column_type, name))
    }

    fn push_column(&mut self, column: ColumnDef) -> &mut ColumnDef {
        self.columns.push(column);
        let last = self.columns.len() - 1;
        &mut self.columns[last]
    }

    fn sized(&mut self, column_type: ColumnType, name: &str, options: ColumnOptions) -> &mut ColumnDef {
        let mut column = ColumnDef::new(column_type, name);
        column.options = options;
        self.push_column(column)
    }

    // ----------------------- Columns -----------------------

    /// Auto-incrementing, non-null primary key.
    pub fn id(&mut self) -> &mut ColumnDef {
        self.id_named("id")
    }

    /// [`Blueprint::id`] with a custom column name.
    pub fn id_named(&mut self, name: &str) -> &mut ColumnDef {
        let column = self.add_column(ColumnType::Id, name);
        column.modifiers.primary = true;
        column.modifiers.auto_increment = true;
        column.modifiers.nullable = Some(false);
        column
    }

    /// Variable-length string.
    pub fn string(&mut self, name: &str, length: u32) -> &mut ColumnDef {
        let options = ColumnOptions {
            length: Some(length),
            ..ColumnOptions::default()
        };
        self.sized(ColumnType::String, name, options)
    }

    /// Fixed-length string.
    pub fn char(&mut self, name: &str, length: u32) -> &mut ColumnDef {
        let options = ColumnOptions {
            length: Some(length),
            ..ColumnOptions::default()
        };
        self.sized(ColumnType::Char, name, options)
    }

    /// 32-bit integer.
    pub fn integer(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Integer, name)
    }

    /// 64-bit integer.
    pub fn big_integer(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::BigInteger, name)
    }

    /// 24-bit integer.
    pub fn medium_integer(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::MediumInteger, name)
    }

    /// 16-bit integer.
    pub fn small_integer(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::SmallInteger, name)
    }

    /// 8-bit integer.
    pub fn tiny_integer(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::TinyInteger, name)
    }

    /// Boolean.
    pub fn boolean(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Boolean, name)
    }

    /// Text.
    pub fn text(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Text, name)
    }

    /// Medium text.
    pub fn medium_text(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::MediumText, name)
    }

    /// Long text.
    pub fn long_text(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::LongText, name)
    }

    /// JSON document.
    pub fn json(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Json, name)
    }

    /// Fixed-point number.
    pub fn decimal(&mut self, name: &str, precision: u32, scale: u32) -> &mut ColumnDef {
        self.sized(ColumnType::Decimal, name, numeric(precision, scale))
    }

    /// Double precision float.
    pub fn double(&mut self, name: &str, precision: u32, scale: u32) -> &mut ColumnDef {
        self.sized(ColumnType::Double, name, numeric(precision, scale))
    }

    /// Single precision float.
    pub fn float(&mut self, name: &str, precision: u32, scale: u32) -> &mut ColumnDef {
        self.sized(ColumnType::Float, name, numeric(precision, scale))
    }

    /// Timestamp.
    pub fn timestamp(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Timestamp, name)
    }

    /// Date and time.
    pub fn datetime(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::DateTime, name)
    }

    /// Date.
    pub fn date(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Date, name)
    }

    /// Time of day.
    pub fn time(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Time, name)
    }

    /// Year.
    pub fn year(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Year, name)
    }

    /// UUID.
    pub fn uuid(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Uuid, name)
    }

    /// Binary data.
    pub fn binary(&mut self, name: &str) -> &mut ColumnDef {
        self.add_column(ColumnType::Binary, name)
    }

    /// Nullable `created_at` and `updated_at` timestamps.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at").nullable(true);
        self.timestamp("updated_at").nullable(true);
    }

    /// Nullable `deleted_at` timestamp.
    pub fn soft_deletes(&mut self) -> &mut ColumnDef {
        let column = self.timestamp("deleted_at");
        column.nullable(true);
        column
    }

    // ----------------------- Indexes -----------------------

    fn push_index(&mut self, kind: IndexKind, columns: &[&str]) -> &mut IndexDef {
        self.indexes.push(IndexDef {
            kind,
            columns: columns.iter().map(ToString::to_string).collect(),
            name: None,
        });
        let last = self.indexes.len() - 1;
        &mut self.indexes[last]
    }

    /// Plain index.
    pub fn index(&mut self, columns: &[&str]) -> &mut IndexDef {
        self.push_index(IndexKind::Index, columns)
    }

    /// Unique index.
    pub fn unique(&mut self, columns: &[&str]) -> &mut IndexDef {
        self.push_index(IndexKind::Unique, columns)
    }

    /// Table-level (possibly composite) primary key.
    pub fn primary(&mut self, columns: &[&str]) -> &mut IndexDef {
        self.push_index(IndexKind::Primary, columns)
    }

    /// Foreign key on `column`.
    pub fn foreign(&mut self, column: &str) -> &mut ForeignKeyDef {
        self.foreign_keys.push(ForeignKeyDef::new(column));
        let last = self.foreign_keys.len() - 1;
        &mut self.foreign_keys[last]
    }

    // ----------------------- Drops -----------------------

    /// Drops a column.
    pub fn drop_column(&mut self, name: &str) {
        self.drop_columns.push(name.to_string());
    }

    /// Drops an index by name.
    pub fn drop_index(&mut self, name: &str) {
        self.drop_indexes.push(name.to_string());
    }

    /// Drops a unique index by name.
    pub fn drop_unique(&mut self, name: &str) {
        self.drop_indexes.push(name.to_string());
    }

    /// Drops the primary key.
    pub fn drop_primary(&mut self) {
        self.drop_primary_keys.push(String::from("PRIMARY"));
    }

    /// Drops a foreign key by constraint name.
    pub fn drop_foreign(&mut self, name: &str) {
        self.drop_foreign_keys.push(name.to_string());
    }

    // ----------------------- Renames -----------------------

    /// Renames a column.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        self.rename_columns.push(RenameColumn {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    /// Renames the table.
    pub fn rename(&mut self, to: &str) {
        self.rename_table = Some(to.to_string());
    }

    /// Emits `CREATE TABLE IF NOT EXISTS`.
    pub fn if_not_exists(&mut self) {
        self.if_not_exists = true;
    }

    /// True when the only requested change is a table rename.
    #[must_use]
    pub fn is_rename_only(&self) -> bool {
        self.rename_table.is_some()
            && self.columns.is_empty()
            && self.foreign_keys.is_empty()
            && self.indexes.is_empty()
            && self.drop_columns.is_empty()
            && self.drop_indexes.is_empty()
            && self.drop_foreign_keys.is_empty()
            && self.drop_primary_keys.is_empty()
            && self.rename_columns.is_empty()
    }
}

const fn numeric(precision: u32, scale: u32) -> ColumnOptions {
    ColumnOptions {
        length: None,
        precision: Some(precision),
        scale: Some(scale),
    }
}

//! MySQL schema grammar.

use super::{length_of, precision_suffix, GrammarCapabilities, SchemaGrammar};
use crate::error::CompileError;
use crate::schema::blueprint::{Blueprint, IndexDef, IndexKind};
use crate::schema::column::{quote_string, ColumnDef, ColumnType};
use crate::schema::foreign::ForeignKeyDef;

/// Table options appended to every CREATE TABLE.
const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";

/// MySQL grammar. Supports every blueprint operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlGrammar;

impl MySqlGrammar {
    /// Creates a new MySQL grammar.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn foreign_clause(&self, table: &str, fk: &ForeignKeyDef) -> Result<String, CompileError> {
        let (on, references) = fk.target(table)?;
        Ok(format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}){}",
            self.wrap(&fk.constraint_name(table)),
            self.wrap(&fk.column),
            self.wrap(on),
            self.wrap(references),
            fk.actions_sql()
        ))
    }

    fn inline_index(&self, table: &str, index: &IndexDef) -> String {
        let columns = self.wrap_list(&index.columns);
        match index.kind {
            IndexKind::Primary => format!("PRIMARY KEY ({columns})"),
            IndexKind::Unique => format!(
                "UNIQUE KEY {} ({columns})",
                self.wrap(&index.resolved_name(table))
            ),
            IndexKind::Index => {
                format!("KEY {} ({columns})", self.wrap(&index.resolved_name(table)))
            }
        }
    }
}

impl SchemaGrammar for MySqlGrammar {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn capabilities(&self) -> GrammarCapabilities {
        GrammarCapabilities {
            modify_column: true,
            add_foreign_key: true,
            drop_foreign_key: true,
            alter_primary_key: true,
            transactional_ddl: false,
        }
    }

    fn map_type(&self, column: &ColumnDef) -> String {
        match &column.column_type {
            ColumnType::Id => String::from("BIGINT UNSIGNED"),
            ColumnType::String => format!("VARCHAR({})", length_of(column)),
            ColumnType::Char => format!("CHAR({})", length_of(column)),
            ColumnType::Integer => String::from("INT"),
            ColumnType::BigInteger => String::from("BIGINT"),
            ColumnType::MediumInteger => String::from("MEDIUMINT"),
            ColumnType::SmallInteger => String::from("SMALLINT"),
            ColumnType::TinyInteger => String::from("TINYINT"),
            ColumnType::Boolean => String::from("TINYINT(1)"),
            ColumnType::Text => String::from("TEXT"),
            ColumnType::MediumText => String::from("MEDIUMTEXT"),
            ColumnType::LongText => String::from("LONGTEXT"),
            ColumnType::Json => String::from("JSON"),
            ColumnType::Decimal => format!("DECIMAL{}", precision_suffix(column)),
            ColumnType::Double => format!("DOUBLE{}", precision_suffix(column)),
            ColumnType::Float => format!("FLOAT{}", precision_suffix(column)),
            ColumnType::Timestamp => String::from("TIMESTAMP"),
            ColumnType::DateTime => String::from("DATETIME"),
            ColumnType::Date => String::from("DATE"),
            ColumnType::Time => String::from("TIME"),
            ColumnType::Year => String::from("YEAR"),
            ColumnType::Uuid => String::from("CHAR(36)"),
            ColumnType::Binary => String::from("BLOB"),
            ColumnType::Custom(name) => name.to_uppercase(),
        }
    }

    fn compile_column(&self, column: &ColumnDef) -> Result<String, CompileError> {
        let m = &column.modifiers;
        let mut sql = format!("{} {}", self.wrap(&column.name), self.map_type(column));

        // BIGINT UNSIGNED already carries it
        if m.unsigned && column.column_type != ColumnType::Id {
            sql.push_str(" UNSIGNED");
        }
        match m.nullable {
            Some(false) => sql.push_str(" NOT NULL"),
            Some(true) => sql.push_str(" NULL"),
            None => {}
        }
        if let Some(default) = &m.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default.to_sql()?);
        }
        if m.auto_increment {
            sql.push_str(" AUTO_INCREMENT");
        }
        if m.unique {
            sql.push_str(" UNIQUE");
        }
        if m.primary {
            sql.push_str(" PRIMARY KEY");
        }
        if let Some(comment) = &m.comment {
            sql.push_str(" COMMENT ");
            sql.push_str(&quote_string(comment));
        }
        Ok(sql)
    }

    fn compile_create(&self, blueprint: &Blueprint) -> Result<Vec<String>, CompileError> {
        let table = blueprint.table.as_str();
        let mut parts: Vec<String> = blueprint
            .columns
            .iter()
            .map(|c| self.compile_column(c))
            .collect::<Result<_, CompileError>>()?;
        for fk in &blueprint.foreign_keys {
            parts.push(self.foreign_clause(table, fk)?);
        }
        for index in &blueprint.indexes {
            parts.push(self.inline_index(table, index));
        }

        let create = if blueprint.if_not_exists {
            "CREATE TABLE IF NOT EXISTS"
        } else {
            "CREATE TABLE"
        };
        Ok(vec![format!(
            "{create} {} ({}) {TABLE_OPTIONS}",
            self.wrap(table),
            parts.join(", ")
        )])
    }

    fn rename_table(&self, from: &str, to: &str) -> String {
        format!("RENAME TABLE {} TO {}", self.wrap(from), self.wrap(to))
    }

    fn drop_foreign(&self, table: &str, name: &str) -> Result<Vec<String>, CompileError> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.wrap(table),
            self.wrap(name)
        )])
    }

    fn drop_index(&self, table: &str, name: &str) -> Result<Vec<String>, CompileError> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP INDEX {}",
            self.wrap(table),
            self.wrap(name)
        )])
    }

    fn drop_primary(&self, table: &str, _name: &str) -> Result<Vec<String>, CompileError> {
        Ok(vec![format!("ALTER TABLE {} DROP PRIMARY KEY", self.wrap(table))])
    }

    fn add_column(&self, table: &str, column: &ColumnDef) -> Result<Vec<String>, CompileError> {
        Ok(vec![format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.wrap(table),
            self.compile_column(column)?
        )])
    }

    fn modify_column(&self, table: &str, column: &ColumnDef) -> Result<Vec<String>, CompileError> {
        Ok(vec![format!(
            "ALTER TABLE {} MODIFY COLUMN {}",
            self.wrap(table),
            self.compile_column(column)?
        )])
    }

    fn add_foreign(&self, table: &str, fk: &ForeignKeyDef) -> Result<Vec<String>, CompileError> {
        Ok(vec![format!(
            "ALTER TABLE {} ADD {}",
            self.wrap(table),
            self.foreign_clause(table, fk)?
        )])
    }

    fn add_index(&self, table: &str, index: &IndexDef) -> Result<Vec<String>, CompileError> {
        let columns = self.wrap_list(&index.columns);
        let sql = match index.kind {
            IndexKind::Primary => format!(
                "ALTER TABLE {} ADD PRIMARY KEY ({columns})",
                self.wrap(table)
            ),
            IndexKind::Unique => format!(
                "ALTER TABLE {} ADD UNIQUE {} ({columns})",
                self.wrap(table),
                self.wrap(&index.resolved_name(table))
            ),
            IndexKind::Index => format!(
                "ALTER TABLE {} ADD INDEX {} ({columns})",
                self.wrap(table),
                self.wrap(&index.resolved_name(table))
            ),
        };
        Ok(vec![sql])
    }
}

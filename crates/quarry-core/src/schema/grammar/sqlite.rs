//! SQLite schema grammar.
//!
//! SQLite's ALTER TABLE only renames tables and columns, adds columns and
//! drops columns. Everything else is rejected with
//! [`CompileError::UnsupportedByDialect`] rather than skipped.

use super::{GrammarCapabilities, SchemaGrammar};
use crate::error::CompileError;
use crate::schema::blueprint::{Blueprint, IndexDef, IndexKind};
use crate::schema::column::{ColumnDef, ColumnType};
use crate::schema::foreign::ForeignKeyDef;

/// SQLite grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteGrammar;

impl SqliteGrammar {
    /// Creates a new SQLite grammar.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn create_index(&self, table: &str, index: &IndexDef, if_not_exists: bool) -> String {
        let unique = if index.kind == IndexKind::Unique {
            "UNIQUE "
        } else {
            ""
        };
        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        format!(
            "CREATE {unique}INDEX {guard}{} ON {} ({})",
            self.wrap(&index.resolved_name(table)),
            self.wrap(table),
            self.wrap_list(&index.columns)
        )
    }
}

impl SchemaGrammar for SqliteGrammar {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn capabilities(&self) -> GrammarCapabilities {
        GrammarCapabilities {
            modify_column: false,
            add_foreign_key: false,
            drop_foreign_key: false,
            alter_primary_key: false,
            transactional_ddl: true,
        }
    }

    fn map_type(&self, column: &ColumnDef) -> String {
        match &column.column_type {
            ColumnType::Id
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::MediumInteger
            | ColumnType::SmallInteger
            | ColumnType::TinyInteger
            | ColumnType::Boolean => String::from("INTEGER"),
            ColumnType::Decimal | ColumnType::Double | ColumnType::Float => String::from("REAL"),
            ColumnType::Binary => String::from("BLOB"),
            ColumnType::Custom(name) => name.to_uppercase(),
            ColumnType::String
            | ColumnType::Char
            | ColumnType::Text
            | ColumnType::MediumText
            | ColumnType::LongText
            | ColumnType::Json
            | ColumnType::Timestamp
            | ColumnType::DateTime
            | ColumnType::Date
            | ColumnType::Time
            | ColumnType::Year
            | ColumnType::Uuid => String::from("TEXT"),
        }
    }

    fn compile_column(&self, column: &ColumnDef) -> Result<String, CompileError> {
        let m = &column.modifiers;
        let sql_type = self.map_type(column);
        if m.auto_increment && !(m.primary && sql_type == "INTEGER") {
            return Err(self.unsupported(format!(
                "auto-increment on column '{}' unless it is an INTEGER PRIMARY KEY",
                column.name
            )));
        }
        let mut sql = format!("{} {sql_type}", self.wrap(&column.name));

        if m.nullable == Some(false) {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &m.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default.to_sql()?);
        }
        if m.unique {
            sql.push_str(" UNIQUE");
        }
        if m.primary {
            sql.push_str(" PRIMARY KEY");
            if m.auto_increment {
                sql.push_str(" AUTOINCREMENT");
            }
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
        for index in &blueprint.indexes {
            if index.kind == IndexKind::Primary {
                parts.push(format!("PRIMARY KEY ({})", self.wrap_list(&index.columns)));
            }
        }
        for fk in &blueprint.foreign_keys {
            let (on, references) = fk.target(table)?;
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({}){}",
                self.wrap(&fk.column),
                self.wrap(on),
                self.wrap(references),
                fk.actions_sql()
            ));
        }

        let create = if blueprint.if_not_exists {
            "CREATE TABLE IF NOT EXISTS"
        } else {
            "CREATE TABLE"
        };
        let mut statements = vec![format!(
            "{create} {} ({})",
            self.wrap(table),
            parts.join(", ")
        )];
        statements.extend(
            blueprint
                .indexes
                .iter()
                .filter(|index| index.kind != IndexKind::Primary)
                .map(|index| self.create_index(table, index, blueprint.if_not_exists)),
        );
        Ok(statements)
    }

    fn rename_table(&self, from: &str, to: &str) -> String {
        format!("ALTER TABLE {} RENAME TO {}", self.wrap(from), self.wrap(to))
    }

    fn drop_foreign(&self, _table: &str, name: &str) -> Result<Vec<String>, CompileError> {
        Err(self.unsupported(format!("dropping foreign key '{name}'")))
    }

    fn drop_index(&self, _table: &str, name: &str) -> Result<Vec<String>, CompileError> {
        Ok(vec![format!("DROP INDEX {}", self.wrap(name))])
    }

    fn drop_primary(&self, table: &str, _name: &str) -> Result<Vec<String>, CompileError> {
        Err(self.unsupported(format!("dropping the primary key of '{table}'")))
    }

    fn add_column(&self, table: &str, column: &ColumnDef) -> Result<Vec<String>, CompileError> {
        if column.modifiers.primary {
            return Err(self.unsupported(format!(
                "adding primary key column '{}' to an existing table",
                column.name
            )));
        }

        // ADD COLUMN cannot carry UNIQUE, so it becomes an index
        let mut plain = column.clone();
        plain.modifiers.unique = false;
        let mut statements = vec![format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.wrap(table),
            self.compile_column(&plain)?
        )];
        if column.modifiers.unique {
            let index = IndexDef {
                kind: IndexKind::Unique,
                columns: vec![column.name.clone()],
                name: None,
            };
            statements.push(self.create_index(table, &index, false));
        }
        Ok(statements)
    }

    fn modify_column(&self, _table: &str, column: &ColumnDef) -> Result<Vec<String>, CompileError> {
        Err(self.unsupported(format!("modifying column '{}'", column.name)))
    }

    fn add_foreign(&self, table: &str, fk: &ForeignKeyDef) -> Result<Vec<String>, CompileError> {
        Err(self.unsupported(format!(
            "adding foreign key '{}' to an existing table",
            fk.constraint_name(table)
        )))
    }

    fn add_index(&self, table: &str, index: &IndexDef) -> Result<Vec<String>, CompileError> {
        if index.kind == IndexKind::Primary {
            return Err(self.unsupported(format!(
                "adding a primary key to existing table '{table}'"
            )));
        }
        Ok(vec![self.create_index(table, index, false)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_with_indexes_after_table() {
        let mut bp = Blueprint::new("users");
        bp.id();
        bp.string("email", 255).not_null();
        bp.boolean("admin").default(false);
        bp.unique(&["email"]);
        bp.index(&["admin"]);

        let sql = SqliteGrammar.compile_create(&bp).unwrap();
        assert_eq!(
            sql,
            vec![
                "CREATE TABLE \"users\" (\
                 \"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
                 \"email\" TEXT NOT NULL, \
                 \"admin\" INTEGER DEFAULT 0)",
                "CREATE UNIQUE INDEX \"users_email_unique\" ON \"users\" (\"email\")",
                "CREATE INDEX \"users_admin_index\" ON \"users\" (\"admin\")",
            ]
        );
    }

    #[test]
    fn test_create_inlines_composite_primary_and_foreign_keys() {
        let mut bp = Blueprint::new("role_user");
        bp.integer("role_id");
        bp.integer("user_id");
        bp.primary(&["role_id", "user_id"]);
        bp.foreign("user_id").references("id").on("users").cascade_on_delete();

        let sql = SqliteGrammar.compile_create(&bp).unwrap();
        assert_eq!(
            sql,
            vec![
                "CREATE TABLE \"role_user\" (\
                 \"role_id\" INTEGER, \
                 \"user_id\" INTEGER, \
                 PRIMARY KEY (\"role_id\", \"user_id\"), \
                 FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\") ON DELETE CASCADE)"
            ]
        );
    }

    #[test]
    fn test_if_not_exists_guards_indexes_too() {
        let mut bp = Blueprint::new("t");
        bp.if_not_exists();
        bp.integer("a");
        bp.index(&["a"]);
        let sql = SqliteGrammar.compile_create(&bp).unwrap();
        assert_eq!(sql[0], "CREATE TABLE IF NOT EXISTS \"t\" (\"a\" INTEGER)");
        assert_eq!(sql[1], "CREATE INDEX IF NOT EXISTS \"t_a_index\" ON \"t\" (\"a\")");
    }

    #[test]
    fn test_type_mapping() {
        let g = SqliteGrammar;
        let mut bp = Blueprint::new("t");
        bp.decimal("price", 8, 2);
        bp.json("meta");
        bp.binary("data");
        bp.tiny_integer("flag");
        assert_eq!(g.map_type(&bp.columns[0]), "REAL");
        assert_eq!(g.map_type(&bp.columns[1]), "TEXT");
        assert_eq!(g.map_type(&bp.columns[2]), "BLOB");
        assert_eq!(g.map_type(&bp.columns[3]), "INTEGER");
    }

    #[test]
    fn test_alter_supported_operations() {
        let mut bp = Blueprint::new("users");
        bp.rename("members");
        bp.rename_column("name", "full_name");
        bp.drop_index("users_email_unique");
        bp.drop_column("legacy");
        bp.string("nickname", 50).unique();

        let sql = SqliteGrammar.compile_alter(&bp).unwrap();
        assert_eq!(
            sql,
            vec![
                "ALTER TABLE \"users\" RENAME TO \"members\"",
                "ALTER TABLE \"members\" RENAME COLUMN \"name\" TO \"full_name\"",
                "DROP INDEX \"users_email_unique\"",
                "ALTER TABLE \"members\" DROP COLUMN \"legacy\"",
                "ALTER TABLE \"members\" ADD COLUMN \"nickname\" TEXT",
                "CREATE UNIQUE INDEX \"members_nickname_unique\" ON \"members\" (\"nickname\")",
            ]
        );
    }

    #[test]
    fn test_auto_increment_needs_integer_primary_key() {
        let mut bp = Blueprint::new("codes");
        bp.string("code", 36).primary().auto_increment();
        assert_eq!(
            SqliteGrammar.compile_create(&bp).unwrap_err(),
            CompileError::UnsupportedByDialect {
                dialect: "sqlite",
                feature: String::from(
                    "auto-increment on column 'code' unless it is an INTEGER PRIMARY KEY"
                ),
            }
        );

        let mut bp = Blueprint::new("counters");
        bp.integer("seq").auto_increment();
        assert!(matches!(
            SqliteGrammar.compile_create(&bp),
            Err(CompileError::UnsupportedByDialect { .. })
        ));

        let mut bp = Blueprint::new("counters");
        bp.big_integer("seq").auto_increment();
        assert!(SqliteGrammar.compile_alter(&bp).is_err());
    }

    #[test]
    fn test_non_finite_default_fails_create() {
        let mut bp = Blueprint::new("readings");
        bp.double("value", 8, 2).default(f64::NAN);
        assert_eq!(
            SqliteGrammar.compile_create(&bp).unwrap_err(),
            CompileError::InvalidDefault(String::from("NaN"))
        );
    }

    #[test]
    fn test_alter_rejects_column_change() {
        let mut bp = Blueprint::new("users");
        bp.string("email", 100).change();
        let err = SqliteGrammar.compile_alter(&bp).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedByDialect {
                dialect: "sqlite",
                feature: String::from("modifying column 'email'"),
            }
        );
    }

    #[test]
    fn test_alter_rejects_foreign_keys_and_primary_keys() {
        let mut add_fk = Blueprint::new("posts");
        add_fk.foreign("user_id").references("id").on("users");
        assert!(SqliteGrammar.compile_alter(&add_fk).is_err());

        let mut drop_fk = Blueprint::new("posts");
        drop_fk.drop_foreign("posts_user_id_foreign");
        assert!(SqliteGrammar.compile_alter(&drop_fk).is_err());

        let mut drop_pk = Blueprint::new("posts");
        drop_pk.drop_primary();
        assert!(SqliteGrammar.compile_alter(&drop_pk).is_err());

        let mut add_pk = Blueprint::new("posts");
        add_pk.primary(&["id"]);
        assert!(SqliteGrammar.compile_alter(&add_pk).is_err());
    }

    #[test]
    fn test_rejection_is_all_or_nothing() {
        let mut bp = Blueprint::new("users");
        bp.string("nickname", 50);
        bp.integer("age").change();
        assert!(SqliteGrammar.compile_alter(&bp).is_err());
    }

    #[test]
    fn test_rename_only() {
        let mut bp = Blueprint::new("a");
        bp.rename("b");
        assert_eq!(
            SqliteGrammar.compile_alter(&bp).unwrap(),
            vec!["ALTER TABLE \"a\" RENAME TO \"b\""]
        );
    }
}

//! Schema runner against a scripted executor.

mod common;
use common::*;

use quarry_core::schema::{Blueprint, MySqlGrammar, Schema, SchemaGrammar};
use quarry_core::{CompileError, Error, SqliteDialect};

#[test]
fn users_blueprint_round_trip() {
    let mut users = Blueprint::new("users");
    users.id();
    users.string("name", 255);
    users.timestamps();

    let sql = MySqlGrammar.compile_create(&users).unwrap();
    assert_eq!(sql.len(), 1);
    assert!(sql[0].contains("CREATE TABLE"));
    assert!(sql[0].contains("`users`"));
    assert!(sql[0].contains("`id` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY"));
}

#[test]
fn compiling_twice_gives_identical_names() {
    let mut bp = Blueprint::new("posts");
    bp.integer("user_id");
    bp.index(&["user_id"]);
    bp.foreign("user_id").references("id").on("users");
    assert_eq!(
        MySqlGrammar.compile_create(&bp).unwrap(),
        MySqlGrammar.compile_create(&bp).unwrap()
    );
}

#[tokio::test]
async fn create_uses_executor_grammar() {
    let mut exec = ScriptedExecutor::with_dialect(&SqliteDialect);
    {
        let mut schema = Schema::new(&mut exec);
        assert_eq!(schema.grammar().name(), "sqlite");
        schema
            .create("users", |t| {
                t.id();
                t.string("email", 255).unique();
            })
            .await
            .unwrap();
        schema.drop_if_exists("legacy").await.unwrap();
        schema.rename("users", "members").await.unwrap();
    }

    assert_eq!(
        exec.statements(),
        vec![
            "CREATE TABLE \"users\" (\"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \"email\" TEXT UNIQUE)",
            "DROP TABLE IF EXISTS \"legacy\"",
            "ALTER TABLE \"users\" RENAME TO \"members\"",
        ]
    );
}

#[tokio::test]
async fn rejected_alter_executes_nothing() {
    let mut exec = ScriptedExecutor::with_dialect(&SqliteDialect);
    let result = Schema::new(&mut exec)
        .table("users", |t| {
            t.string("nickname", 40);
            t.string("email", 100).change();
        })
        .await;

    assert!(matches!(
        result,
        Err(Error::Compile(CompileError::UnsupportedByDialect {
            dialect: "sqlite",
            ..
        }))
    ));
    assert!(exec.calls.is_empty());
}

#[tokio::test]
async fn explicit_grammar_overrides_dialect() {
    let mut exec = ScriptedExecutor::with_dialect(&SqliteDialect);
    Schema::with_grammar(&mut exec, &MySqlGrammar)
        .table("users", |t| {
            t.string("email", 100).change();
        })
        .await
        .unwrap();
    assert_eq!(
        exec.statements(),
        vec!["ALTER TABLE `users` MODIFY COLUMN `email` VARCHAR(100)"]
    );
}

#[tokio::test]
async fn query_uses_executor_dialect() {
    let mut exec = ScriptedExecutor::with_dialect(&SqliteDialect);
    let schema = Schema::new(&mut exec);
    assert_eq!(
        schema.query("users").to_sql().unwrap(),
        "SELECT * FROM \"users\""
    );
}

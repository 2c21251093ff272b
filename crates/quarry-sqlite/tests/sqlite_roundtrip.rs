//! Query builder and schema runner against in-memory SQLite.

use quarry_core::query::{Filter, QueryBuilder};
use quarry_core::schema::Schema;
use quarry_core::{CompileError, Error, Executor, SqlValue, SqliteDialect, ToSqlValue};
use quarry_sqlite::SqliteExecutor;

async fn with_users() -> SqliteExecutor {
    let mut db = SqliteExecutor::connect("sqlite::memory:").await.unwrap();
    Schema::new(&mut db)
        .create("users", |t| {
            t.id();
            t.string("name", 100);
            t.integer("age").nullable(true);
            t.string("email", 255).unique();
            t.timestamps();
        })
        .await
        .unwrap();
    db
}

fn users() -> QueryBuilder {
    QueryBuilder::new("users").with_dialect(&SqliteDialect)
}

async fn seed(db: &mut SqliteExecutor) {
    for (name, age) in [("ada", 36_i64), ("grace", 45), ("linus", 21)] {
        users()
            .insert(
                &mut *db,
                &[
                    ("name", name.to_sql_value()),
                    ("age", age.to_sql_value()),
                    ("email", format!("{name}@example.com").to_sql_value()),
                ],
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn insert_and_fetch() {
    let mut db = with_users().await;
    let id = users()
        .insert_get_id(
            &mut db,
            &[
                ("name", "John".to_sql_value()),
                ("email", "john@example.com".to_sql_value()),
            ],
        )
        .await
        .unwrap();
    assert_eq!(id, Some(1));

    let row = users().where_eq("id", 1).first(&mut db).await.unwrap().unwrap();
    assert_eq!(row.get("name"), Some(&"John".to_sql_value()));
    assert_eq!(row.get("age"), Some(&SqlValue::Null));
}

#[tokio::test]
async fn filters_and_aggregates() {
    let mut db = with_users().await;
    seed(&mut db).await;

    let adults = users()
        .where_group(|g| g.where_op("age", ">", 30).or_where_eq("name", "linus"))
        .order_by("age", "asc")
        .pluck(&mut db, "name")
        .await
        .unwrap();
    assert_eq!(
        adults,
        vec![
            "linus".to_sql_value(),
            "ada".to_sql_value(),
            "grace".to_sql_value()
        ]
    );

    assert_eq!(users().where_in("age", [21, 45]).count(&mut db).await.unwrap(), 2);
    assert_eq!(
        users().max(&mut db, "age").await.unwrap(),
        Some(SqlValue::Int(45))
    );
    assert_eq!(users().where_between("age", 30, 40).count(&mut db).await.unwrap(), 1);
    assert!(users().where_null("created_at").exists(&mut db).await.unwrap());
    assert!(users().where_eq("name", "nobody").doesnt_exist(&mut db).await.unwrap());
}

#[tokio::test]
async fn update_and_delete() {
    let mut db = with_users().await;
    seed(&mut db).await;

    let changed = users()
        .where_op("age", "<", 40)
        .update(&mut db, &[("age", 50_i64.to_sql_value())])
        .await
        .unwrap();
    assert_eq!(changed, 2);

    let removed = users().where_eq("age", 50).delete(&mut db).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(users().count(&mut db).await.unwrap(), 1);
}

#[tokio::test]
async fn pagination() {
    let mut db = with_users().await;
    seed(&mut db).await;

    let first = users()
        .order_by("id", "asc")
        .simple_paginate(&mut db, 2, 1)
        .await
        .unwrap();
    assert_eq!(first.data.len(), 2);
    assert_eq!(first.next_page, Some(2));

    let second = users()
        .order_by("id", "asc")
        .simple_paginate(&mut db, 2, 2)
        .await
        .unwrap();
    assert_eq!(second.data.len(), 1);
    assert_eq!(second.next_page, None);
    assert_eq!(second.prev_page, Some(1));
}

#[tokio::test]
async fn unique_index_is_enforced() {
    let mut db = with_users().await;
    let row = [
        ("name", "a".to_sql_value()),
        ("email", "dup@example.com".to_sql_value()),
    ];
    users().insert(&mut db, &row).await.unwrap();
    let err = users().insert(&mut db, &row).await.unwrap_err();
    assert!(matches!(err, Error::Execution { .. }));
}

#[tokio::test]
async fn alter_table_in_place() {
    let mut db = with_users().await;
    seed(&mut db).await;

    {
        let mut schema = Schema::new(&mut db);
        schema
            .table("users", |t| {
                t.rename_column("name", "full_name");
                t.string("nickname", 40).nullable(true);
            })
            .await
            .unwrap();
        schema.rename("users", "members").await.unwrap();
    }

    let names = QueryBuilder::new("members")
        .with_dialect(&SqliteDialect)
        .where_null("nickname")
        .pluck(&mut db, "full_name")
        .await
        .unwrap();
    assert_eq!(names.len(), 3);
}

#[tokio::test]
async fn unsupported_alter_leaves_table_untouched() {
    let mut db = with_users().await;
    let result = Schema::new(&mut db)
        .table("users", |t| {
            t.string("nickname", 40).nullable(true);
            t.string("email", 100).change();
        })
        .await;
    assert!(matches!(
        result,
        Err(Error::Compile(CompileError::UnsupportedByDialect { .. }))
    ));

    // nickname was never added
    let err = users().select(["nickname"]).get(&mut db).await.unwrap_err();
    assert!(err.to_string().contains("nickname"));
}

#[tokio::test]
async fn transaction_rollback_undoes_ddl() {
    let mut db = SqliteExecutor::connect("sqlite::memory:").await.unwrap();
    db.begin_transaction().await.unwrap();
    Schema::new(&mut db)
        .create("scratch", |t| {
            t.id();
        })
        .await
        .unwrap();
    db.rollback().await.unwrap();

    let tables = QueryBuilder::new("sqlite_master")
        .with_dialect(&SqliteDialect)
        .where_eq("name", "scratch")
        .count(&mut db)
        .await
        .unwrap();
    assert_eq!(tables, 0);
}

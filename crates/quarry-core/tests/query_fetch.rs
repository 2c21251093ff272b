//! Fetching through an executor.

mod common;
use common::*;

use quarry_core::query::{Filter, QueryBuilder};
use quarry_core::{SqlValue, ToSqlValue};

#[tokio::test]
async fn count_does_not_touch_the_builder() {
    let mut exec = ScriptedExecutor::new();
    exec.push_rows(vec![row(&[("_aggregate", SqlValue::Int(3))])]);

    let query = QueryBuilder::new("users")
        .where_eq("active", true)
        .order_by("id", "desc")
        .limit(10);
    let before = query.compile_select().unwrap();

    assert_eq!(query.count(&mut exec).await.unwrap(), 3);
    assert_eq!(query.compile_select().unwrap(), before);
    assert_eq!(
        exec.calls[0],
        Call::Select(
            String::from("SELECT COUNT(*) AS _aggregate FROM `users` WHERE `active` = ?"),
            vec![SqlValue::Bool(true)]
        )
    );
}

#[tokio::test]
async fn count_defaults_to_zero() {
    let mut exec = ScriptedExecutor::new();
    assert_eq!(QueryBuilder::new("users").count(&mut exec).await.unwrap(), 0);
}

#[tokio::test]
async fn first_and_exists_leave_original_sql() {
    let mut exec = ScriptedExecutor::new();
    exec.push_rows(vec![row(&[("id", SqlValue::Int(1))])]);
    exec.push_rows(vec![]);

    let query = QueryBuilder::new("users").where_eq("email", "a@b.c");
    let first = query.first(&mut exec).await.unwrap();
    assert_eq!(first.unwrap().get("id"), Some(&SqlValue::Int(1)));
    assert!(!query.exists(&mut exec).await.unwrap());

    assert_eq!(
        query.to_sql().unwrap(),
        "SELECT * FROM `users` WHERE `email` = ?"
    );
    assert_eq!(
        exec.statements(),
        vec![
            "SELECT * FROM `users` WHERE `email` = ? LIMIT 1",
            "SELECT 1 FROM `users` WHERE `email` = ? LIMIT 1",
        ]
    );
}

#[tokio::test]
async fn doesnt_exist_negates() {
    let mut exec = ScriptedExecutor::new();
    exec.push_rows(vec![row(&[("1", SqlValue::Int(1))])]);
    let query = QueryBuilder::new("jobs");
    assert!(!query.doesnt_exist(&mut exec).await.unwrap());
}

#[tokio::test]
async fn aggregates_return_none_for_null() {
    let mut exec = ScriptedExecutor::new();
    exec.push_rows(vec![row(&[("_aggregate", SqlValue::Null)])]);
    exec.push_rows(vec![row(&[("_aggregate", SqlValue::Float(2.5))])]);

    let query = QueryBuilder::new("orders");
    assert_eq!(query.sum(&mut exec, "total").await.unwrap(), None);
    assert_eq!(
        query.avg(&mut exec, "total").await.unwrap(),
        Some(SqlValue::Float(2.5))
    );
    assert_eq!(
        exec.statements()[1],
        "SELECT AVG(`total`) AS _aggregate FROM `orders`"
    );
}

#[tokio::test]
async fn min_max_use_their_functions() {
    let mut exec = ScriptedExecutor::new();
    let query = QueryBuilder::new("orders");
    query.min(&mut exec, "total").await.unwrap();
    query.max(&mut exec, "orders.total").await.unwrap();
    assert_eq!(
        exec.statements(),
        vec![
            "SELECT MIN(`total`) AS _aggregate FROM `orders`",
            "SELECT MAX(`orders`.`total`) AS _aggregate FROM `orders`",
        ]
    );
}

#[tokio::test]
async fn simple_paginate_detects_next_page() {
    let mut exec = ScriptedExecutor::new();
    exec.push_rows(
        (1..=3)
            .map(|i| row(&[("id", SqlValue::Int(i))]))
            .collect(),
    );

    let page = QueryBuilder::new("posts")
        .simple_paginate(&mut exec, 2, 2)
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.per_page, 2);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.next_page, Some(3));
    assert_eq!(page.prev_page, Some(1));
    assert_eq!(
        exec.statements(),
        vec!["SELECT * FROM `posts` LIMIT 3 OFFSET 2"]
    );
}

#[tokio::test]
async fn simple_paginate_saturates_at_the_integer_limit() {
    let mut exec = ScriptedExecutor::new();
    exec.push_rows(vec![row(&[("id", SqlValue::Int(1))])]);
    exec.push_rows(vec![
        row(&[("id", SqlValue::Int(1))]),
        row(&[("id", SqlValue::Int(2))]),
    ]);

    let query = QueryBuilder::new("posts");
    let wide = query.simple_paginate(&mut exec, u64::MAX, 1).await.unwrap();
    let last = query.simple_paginate(&mut exec, 1, u64::MAX).await.unwrap();

    assert_eq!(wide.data.len(), 1);
    assert_eq!(wide.next_page, None);
    assert_eq!(last.data.len(), 1);
    assert_eq!(last.next_page, Some(u64::MAX));
    assert_eq!(last.prev_page, Some(u64::MAX - 1));
    assert_eq!(
        exec.statements(),
        vec![
            format!("SELECT * FROM `posts` LIMIT {} OFFSET 0", u64::MAX),
            format!("SELECT * FROM `posts` LIMIT 2 OFFSET {}", u64::MAX - 1),
        ]
    );
}

#[tokio::test]
async fn simple_paginate_last_page() {
    let mut exec = ScriptedExecutor::new();
    exec.push_rows(vec![row(&[("id", SqlValue::Int(1))])]);

    let page = QueryBuilder::new("posts")
        .simple_paginate(&mut exec, 5, 0)
        .await
        .unwrap();

    assert_eq!(page.current_page, 1);
    assert_eq!(page.next_page, None);
    assert_eq!(page.prev_page, None);
}

#[tokio::test]
async fn value_and_pluck_select_one_column() {
    let mut exec = ScriptedExecutor::new();
    exec.push_rows(vec![row(&[("email", "a@x".to_sql_value())])]);
    exec.push_rows(vec![
        row(&[("email", "a@x".to_sql_value())]),
        row(&[("email", "b@x".to_sql_value())]),
    ]);

    let query = QueryBuilder::new("users").where_eq("active", true);
    let value = query.value(&mut exec, "email").await.unwrap();
    let emails = query.pluck(&mut exec, "email").await.unwrap();

    assert_eq!(value, Some("a@x".to_sql_value()));
    assert_eq!(emails.len(), 2);
    assert_eq!(
        exec.statements(),
        vec![
            "SELECT `email` FROM `users` WHERE `active` = ? LIMIT 1",
            "SELECT `email` FROM `users` WHERE `active` = ?",
        ]
    );
}

#[tokio::test]
async fn insert_update_delete_run_through_execute() {
    let mut exec = ScriptedExecutor::new();
    let users = QueryBuilder::new("users");

    let id = users
        .insert_get_id(&mut exec, &[("name", "John".to_sql_value())])
        .await
        .unwrap();
    assert_eq!(id, Some(1));

    users
        .clone()
        .where_eq("id", 1)
        .update(&mut exec, &[("name", "Jane".to_sql_value())])
        .await
        .unwrap();
    users.clone().where_eq("id", 1).delete(&mut exec).await.unwrap();

    assert_eq!(
        exec.calls,
        vec![
            Call::Execute(
                String::from("INSERT INTO `users` (`name`) VALUES (?)"),
                vec!["John".to_sql_value()]
            ),
            Call::Execute(
                String::from("UPDATE `users` SET `name` = ? WHERE `id` = ?"),
                vec!["Jane".to_sql_value(), SqlValue::Int(1)]
            ),
            Call::Execute(
                String::from("DELETE FROM `users` WHERE `id` = ?"),
                vec![SqlValue::Int(1)]
            ),
        ]
    );
}

#[tokio::test]
async fn compile_errors_reach_no_executor() {
    let mut exec = ScriptedExecutor::new();
    let result = QueryBuilder::new("users")
        .where_in("id", Vec::<i64>::new())
        .get(&mut exec)
        .await;
    assert!(result.is_err());
    assert!(exec.calls.is_empty());
}

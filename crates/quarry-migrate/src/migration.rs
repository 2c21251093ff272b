//! The migration contract.

use async_trait::async_trait;
use quarry_core::schema::Schema;

/// One reversible schema change.
///
/// A migration is identified by the stem of the file it was discovered from;
/// the implementation only supplies the two directions. Each call runs inside
/// its own transaction together with the ledger write.
///
/// ```rust,ignore
/// struct CreateUsers;
///
/// #[async_trait]
/// impl Migration for CreateUsers {
///     async fn up(&self, schema: &mut Schema<'_>) -> quarry_core::Result<()> {
///         schema
///             .create("users", |t| {
///                 t.id();
///                 t.string("email", 255).unique();
///             })
///             .await
///     }
///
///     async fn down(&self, schema: &mut Schema<'_>) -> quarry_core::Result<()> {
///         schema.drop_if_exists("users").await
///     }
/// }
/// ```
#[async_trait]
pub trait Migration: Send + Sync {
    /// Applies the change.
    async fn up(&self, schema: &mut Schema<'_>) -> quarry_core::Result<()>;

    /// Reverts the change.
    async fn down(&self, schema: &mut Schema<'_>) -> quarry_core::Result<()>;
}

/// A migration made of raw SQL statements, as read from a `.sql` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlMigration {
    /// Statements run by `up`, in order.
    pub up: Vec<String>,
    /// Statements run by `down`, in order.
    pub down: Vec<String>,
}

impl SqlMigration {
    /// Creates a migration from its two statement lists.
    #[must_use]
    pub const fn new(up: Vec<String>, down: Vec<String>) -> Self {
        Self { up, down }
    }
}

#[async_trait]
impl Migration for SqlMigration {
    async fn up(&self, schema: &mut Schema<'_>) -> quarry_core::Result<()> {
        for sql in &self.up {
            schema.statement(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, schema: &mut Schema<'_>) -> quarry_core::Result<()> {
        for sql in &self.down {
            schema.statement(sql).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::query::QueryBuilder;
    use quarry_core::{Executor, SqlValue};
    use quarry_sqlite::SqliteExecutor;

    #[test]
    fn test_sql_migration_runs_statements_in_order() {
        tokio_test::block_on(async {
            let mut db = SqliteExecutor::connect("sqlite::memory:").await.unwrap();
            let migration = SqlMigration::new(
                vec![
                    String::from("CREATE TABLE t (v INTEGER)"),
                    String::from("INSERT INTO t (v) VALUES (1)"),
                ],
                vec![String::from("DROP TABLE t")],
            );

            migration.up(&mut Schema::new(&mut db)).await.unwrap();
            let total = QueryBuilder::new("t")
                .with_dialect(db.dialect())
                .sum(&mut db, "v")
                .await
                .unwrap();
            assert_eq!(total, Some(SqlValue::Int(1)));

            migration.down(&mut Schema::new(&mut db)).await.unwrap();
            assert!(db.select("SELECT * FROM t", &[]).await.is_err());
        });
    }
}

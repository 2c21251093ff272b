//! [`Executor`] over a single sqlx SQLite connection.

use async_trait::async_trait;
use quarry_core::{Dialect, Error, Executor, Result, Row, SqlValue, SqliteDialect};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Row as _, Sqlite, TypeInfo, ValueRef};
use tracing::debug;

/// Runs quarry SQL on one SQLite connection.
///
/// A single connection is held (not a pool) so that transactions and
/// `sqlite::memory:` databases behave as expected.
#[derive(Debug)]
pub struct SqliteExecutor {
    conn: SqliteConnection,
    last_insert_id: Option<i64>,
}

impl SqliteExecutor {
    /// Opens a connection, e.g. `sqlite::memory:` or `sqlite:app.db?mode=rwc`.
    ///
    /// # Errors
    ///
    /// Returns the driver error when the database cannot be opened.
    pub async fn connect(url: &str) -> std::result::Result<Self, sqlx::Error> {
        let conn = SqliteConnection::connect(url).await?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already open connection.
    #[must_use]
    pub const fn from_connection(conn: SqliteConnection) -> Self {
        Self {
            conn,
            last_insert_id: None,
        }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub fn into_inner(self) -> SqliteConnection {
        self.conn
    }

    async fn raw(&mut self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Running transaction statement");
        sqlx::query(sql)
            .execute(&mut self.conn)
            .await
            .map_err(|e| driver_error(e, sql, &[]))?;
        Ok(())
    }
}

#[async_trait]
impl Executor for SqliteExecutor {
    fn dialect(&self) -> &'static dyn Dialect {
        &SqliteDialect
    }

    async fn select(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<Vec<Row>> {
        debug!(sql = %sql, bindings = bindings.len(), "Running select");
        let rows = bind_all(sqlx::query(sql), bindings)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| driver_error(e, sql, bindings))?;

        rows.iter()
            .map(decode_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| driver_error(e, sql, bindings))
    }

    async fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<u64> {
        debug!(sql = %sql, bindings = bindings.len(), "Running statement");
        let result = bind_all(sqlx::query(sql), bindings)
            .execute(&mut self.conn)
            .await
            .map_err(|e| driver_error(e, sql, bindings))?;

        if result.last_insert_rowid() != 0 {
            self.last_insert_id = Some(result.last_insert_rowid());
        }
        Ok(result.rows_affected())
    }

    async fn begin_transaction(&mut self) -> Result<()> {
        self.raw("BEGIN").await
    }

    async fn commit(&mut self) -> Result<()> {
        self.raw("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.raw("ROLLBACK").await
    }

    fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }
}

fn driver_error(err: sqlx::Error, sql: &str, bindings: &[SqlValue]) -> Error {
    Error::execution(err.to_string(), sql, bindings).with_source(err)
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    bindings: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in bindings {
        query = match value {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Blob(b) => query.bind(b.clone()),
        };
    }
    query
}

/// Decodes by the value's storage class, not the declared column type.
fn decode_row(row: &SqliteRow) -> std::result::Result<Row, sqlx::Error> {
    let mut out = Row::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get(index)?),
                "REAL" | "NUMERIC" => SqlValue::Float(row.try_get(index)?),
                "BLOB" => SqlValue::Blob(row.try_get(index)?),
                _ => SqlValue::Text(row.try_get(index)?),
            }
        };
        out.push(column.name(), value);
    }
    Ok(out)
}

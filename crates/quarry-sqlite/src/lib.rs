//! # quarry-sqlite
//!
//! SQLite driver for `quarry-core`.
//!
//! [`SqliteExecutor`] runs compiled queries and schema statements on a single
//! sqlx connection and reports the SQLite dialect, so
//! [`Schema`](quarry_core::schema::Schema) picks the SQLite grammar on its own.
//!
//! ```rust,no_run
//! use quarry_core::query::{Filter, QueryBuilder};
//! use quarry_core::schema::Schema;
//! use quarry_core::ToSqlValue;
//! use quarry_sqlite::SqliteExecutor;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut db = SqliteExecutor::connect("sqlite::memory:").await?;
//! Schema::new(&mut db)
//!     .create("users", |t| {
//!         t.id();
//!         t.string("email", 255).unique();
//!     })
//!     .await?;
//!
//! let users = QueryBuilder::new("users").with_dialect(&quarry_core::SqliteDialect);
//! users.insert(&mut db, &[("email", "a@example.com".to_sql_value())]).await?;
//! let found = users.where_eq("email", "a@example.com").exists(&mut db).await?;
//! assert!(found);
//! # Ok(())
//! # }
//! ```

mod executor;

pub use executor::SqliteExecutor;

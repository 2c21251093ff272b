//! # quarry-core
//!
//! Parameterized query compiler and dialect-aware schema grammars.
//!
//! ## Query builder
//!
//! [`QueryBuilder`](query::QueryBuilder) compiles SELECT, INSERT, UPDATE and
//! DELETE statements into SQL text with positional `?` placeholders and the
//! matching [`SqlValue`] bindings. Values are never interpolated.
//!
//! ```rust
//! use quarry_core::query::{Filter, QueryBuilder};
//! use quarry_core::SqliteDialect;
//!
//! let (sql, bindings) = QueryBuilder::new("posts")
//!     .with_dialect(&SqliteDialect)
//!     .select(["posts.id", "posts.title"])
//!     .join("users", "users.id", "=", "posts.user_id")
//!     .where_in("users.role", ["admin", "editor"])
//!     .order_by_desc("posts.id")
//!     .compile_select()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT \"posts\".\"id\", \"posts\".\"title\" FROM \"posts\" \
//!      INNER JOIN \"users\" ON \"users\".\"id\" = \"posts\".\"user_id\" \
//!      WHERE \"users\".\"role\" IN (?, ?) ORDER BY \"posts\".\"id\" DESC"
//! );
//! assert_eq!(bindings.len(), 2);
//! ```
//!
//! ## Schema
//!
//! [`Blueprint`](schema::Blueprint) records table changes and a
//! [`SchemaGrammar`](schema::SchemaGrammar) compiles them. MySQL supports
//! every operation; SQLite rejects what its ALTER TABLE cannot express.
//!
//! ```rust
//! use quarry_core::schema::{Blueprint, MySqlGrammar, SchemaGrammar};
//!
//! let mut users = Blueprint::new("users");
//! users.id();
//! users.string("email", 255).unique();
//!
//! let sql = MySqlGrammar.compile_create(&users).unwrap();
//! assert!(sql[0].starts_with("CREATE TABLE `users`"));
//! ```
//!
//! ## Executors
//!
//! Nothing here opens a connection. Fetching methods and the
//! [`Schema`](schema::Schema) runner take an [`Executor`], implemented by
//! driver crates such as `quarry-sqlite`.

pub mod dialect;
pub mod error;
pub mod executor;
pub mod query;
pub mod schema;
pub mod value;

pub use dialect::{Dialect, MySqlDialect, SqliteDialect};
pub use error::{CompileError, Error, Result};
pub use executor::{Executor, Row};
pub use value::{SqlValue, ToSqlValue};

/// Common imports.
pub mod prelude {
    pub use crate::dialect::{Dialect, MySqlDialect, SqliteDialect};
    pub use crate::error::{CompileError, Error, Result};
    pub use crate::executor::{Executor, Row};
    pub use crate::query::{Filter, JoinClause, QueryBuilder, SimplePage, WhereGroup};
    pub use crate::schema::{Blueprint, ForeignKeyAction, Schema, SchemaGrammar};
    pub use crate::value::{SqlValue, ToSqlValue};
}

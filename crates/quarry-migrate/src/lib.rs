//! Batch-tracked database migrations.
//!
//! Migrations are discovered by file name in one or more directories, applied
//! in lexical order, and recorded in a ledger table together with the batch
//! they ran in. Rolling back always undoes (part of) the most recent batch.
//!
//! # Architecture
//!
//! - **Repository** - Reads and writes the ledger table
//! - **Discovery** - Finds migration files and resolves them into [`Migration`]s
//! - **Migrator** - Applies and rolls back migrations, one transaction each
//! - **Writer** - Creates new timestamped migration files
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry_migrate::prelude::*;
//! use quarry_sqlite::SqliteExecutor;
//!
//! struct CreateUsers;
//!
//! #[async_trait::async_trait]
//! impl Migration for CreateUsers {
//!     async fn up(&self, schema: &mut Schema<'_>) -> quarry_core::Result<()> {
//!         schema.create("users", |t| { t.id(); t.string("email", 255); }).await
//!     }
//!
//!     async fn down(&self, schema: &mut Schema<'_>) -> quarry_core::Result<()> {
//!         schema.drop_if_exists("users").await
//!     }
//! }
//!
//! // migrations/2024_01_01_000000_create_users.rs marks the position.
//! let registry = MigrationRegistry::new()
//!     .with("2024_01_01_000000_create_users", CreateUsers);
//! let db = SqliteExecutor::connect("sqlite:app.db").await?;
//! let mut migrator = Migrator::new(
//!     db,
//!     MigrationRepository::default(),
//!     MigrationPaths::new().with_path("migrations"),
//!     registry,
//! );
//! let applied = migrator.migrate().await?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Create database/migrations/<timestamp>_create_posts.sql
//! quarry-migrate make:migration CreatePosts
//!
//! # Apply pending migrations
//! quarry-migrate migrate
//!
//! # Show migration status
//! quarry-migrate migrate:status
//!
//! # Roll back the last batch, or only its newest migration
//! quarry-migrate migrate:rollback
//! quarry-migrate migrate:rollback --step 1
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod migration;
pub mod migrator;
pub mod repository;
pub mod writer;

pub use config::MigrateConfig;
pub use discovery::{MigrationPaths, MigrationRegistry, MigrationResolver, SqlFileResolver};
pub use error::{MigrateError, Result};
pub use migration::{Migration, SqlMigration};
pub use migrator::Migrator;
pub use repository::{MigrationRecord, MigrationRepository, MigrationStatus};
pub use writer::MigrationWriter;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::MigrateConfig;
    pub use crate::discovery::{
        split_sql_statements, MigrationPaths, MigrationRegistry, MigrationResolver,
        SqlFileResolver,
    };
    pub use crate::error::{MigrateError, Result};
    pub use crate::migration::{Migration, SqlMigration};
    pub use crate::migrator::Migrator;
    pub use crate::repository::{MigrationRecord, MigrationRepository, MigrationStatus};
    pub use crate::writer::MigrationWriter;
    pub use quarry_core::schema::{Blueprint, Schema};
}

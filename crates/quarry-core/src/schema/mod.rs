//! Schema definition and DDL compilation.
//!
//! A [`Blueprint`] collects the changes for one table, a [`SchemaGrammar`]
//! compiles it for a dialect, and [`Schema`] runs the result through an
//! executor.

mod blueprint;
mod column;
mod foreign;
mod grammar;
mod runner;

pub use blueprint::{Blueprint, IndexDef, IndexKind, RenameColumn};
pub use column::{quote_string, ColumnDef, ColumnModifiers, ColumnOptions, ColumnType, DefaultValue};
pub use foreign::{ForeignKeyAction, ForeignKeyDef};
pub use grammar::{GrammarCapabilities, MySqlGrammar, SchemaGrammar, SqliteGrammar};
pub use runner::Schema;

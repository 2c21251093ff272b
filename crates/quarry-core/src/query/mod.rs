//! Query building and compilation.
//!
//! [`QueryBuilder`] collects a table, columns, joins, a WHERE tree, grouping,
//! ordering and paging. The `compile_*` methods turn it into SQL with `?`
//! placeholders plus the ordered bindings; the async methods hand the result
//! to an [`Executor`](crate::Executor).

mod builder;
mod fetch;
mod join;
mod where_clause;

pub use builder::{Aggregate, Direction, QueryBuilder, Selection, AGGREGATE_ALIAS};
pub use fetch::SimplePage;
pub use join::{JoinClause, JoinCondition, JoinKind};
pub use where_clause::{Condition, Connector, Filter, Operand, Operator, WhereGroup, WhereNode};

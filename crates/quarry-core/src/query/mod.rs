//! Fluent query building.
//!
//! Start a query with [`crate::Connection::table`], chain clause methods,
//! then either compile it ([`QueryBuilder::to_sql`],
//! [`QueryBuilder::bindings`]) or run it with one of the async terminal
//! methods.
//!
//! ```rust
//! use quarry_core::{Connection, ConnectionConfig, Operator};
//!
//! let conn = Connection::new(ConnectionConfig::sqlite(":memory:"));
//! let query = conn
//!     .table("users")
//!     .where_eq("active", true)
//!     .or_where_op("logins", Operator::Gt, 10);
//!
//! assert_eq!(query.to_sql(), "SELECT * FROM users WHERE active = ? OR logins > ?");
//! ```

mod aggregate;
mod builder;
mod clause;

pub use aggregate::Aggregate;
pub use builder::QueryBuilder;
pub use clause::{Boolean, Having, Join, JoinKind, Operator, OrderDirection, Where, WhereKind};

//! # quarry-core
//!
//! Connection handling and a fluent, parameter-safe SQL query builder for
//! MySQL, PostgreSQL and SQLite.
//!
//! This crate provides:
//! - [`ConnectionConfig`]: connection settings from code, JSON or `DB_*`
//!   environment variables
//! - [`Connection`]: a lazily dialled handle with transactions and a query log
//! - [`QueryBuilder`]: clause accumulation compiled to SQL plus bindings
//!
//! ## SQL Injection Prevention
//!
//! Every value travels as a bound parameter:
//!
//! ```rust
//! use quarry_core::{Connection, ConnectionConfig, SqlValue};
//!
//! let conn = Connection::new(ConnectionConfig::sqlite(":memory:"));
//! let query = conn.table("users").where_eq("name", "'; DROP TABLE users; --");
//!
//! assert_eq!(query.to_sql(), "SELECT * FROM users WHERE name = ?");
//! assert_eq!(
//!     query.bindings(),
//!     vec![SqlValue::Text("'; DROP TABLE users; --".into())]
//! );
//! ```

pub mod config;
pub mod connection;
mod driver;
pub mod error;
pub mod query;
pub mod value;

pub use config::{ConnectionConfig, Driver};
pub use connection::{Connection, LoggedQuery, Row};
pub use error::{Error, Result};
pub use query::{Aggregate, Operator, OrderDirection, QueryBuilder};
pub use value::{SqlValue, ToSqlValue, DATETIME_FORMAT};

/// Builds a [`Row`] from `key => value` pairs, converting each value with
/// [`ToSqlValue`].
///
/// ```rust
/// use quarry_core::{row, SqlValue};
///
/// let row = row! { "name" => "widget", "qty" => 3 };
/// assert_eq!(row["qty"], SqlValue::Int(3));
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::Row::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::Row::new();
        $(
            row.insert(
                ::std::string::String::from($key),
                $crate::ToSqlValue::to_sql_value($value),
            );
        )+
        row
    }};
}

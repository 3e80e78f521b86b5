//! Engine-specific connections.
//!
//! Each engine gets a typed sqlx connection so that values are bound and
//! decoded with the engine's own type system: timestamps travel as
//! timestamps, JSON as JSON, and every column type the schema grammars emit
//! can be read back.

mod mysql;
mod postgres;
mod sqlite;

use sqlx::mysql::MySqlConnection;
use sqlx::postgres::PgConnection;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Column as _, Connection as _};

use crate::config::Driver;
use crate::connection::Row;
use crate::error::{Error, Result};
use crate::value::SqlValue;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Executed {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// An open connection to one of the supported engines.
#[derive(Debug)]
pub(crate) enum DriverConnection {
    Sqlite(SqliteConnection),
    Postgres(PgConnection),
    Mysql(MySqlConnection),
}

impl DriverConnection {
    pub(crate) async fn open(driver: Driver, url: &str) -> std::result::Result<Self, sqlx::Error> {
        Ok(match driver {
            Driver::Sqlite => Self::Sqlite(SqliteConnection::connect(url).await?),
            Driver::Postgres => Self::Postgres(PgConnection::connect(url).await?),
            Driver::Mysql => Self::Mysql(MySqlConnection::connect(url).await?),
        })
    }

    pub(crate) async fn fetch_all(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<Vec<Row>> {
        match self {
            Self::Sqlite(conn) => sqlite::fetch_all(conn, sql, bindings).await,
            Self::Postgres(conn) => postgres::fetch_all(conn, sql, bindings).await,
            Self::Mysql(conn) => mysql::fetch_all(conn, sql, bindings).await,
        }
    }

    pub(crate) async fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<Executed> {
        match self {
            Self::Sqlite(conn) => sqlite::execute(conn, sql, bindings).await,
            Self::Postgres(conn) => postgres::execute(conn, sql, bindings).await,
            Self::Mysql(conn) => mysql::execute(conn, sql, bindings).await,
        }
    }

    /// Runs SQL text without preparing it.
    pub(crate) async fn execute_raw(&mut self, sql: &str) -> Result<()> {
        let raw = sqlx::raw_sql(sql);
        let result = match self {
            Self::Sqlite(conn) => raw.execute(&mut *conn).await.map(|_| ()),
            Self::Postgres(conn) => raw.execute(&mut *conn).await.map(|_| ()),
            Self::Mysql(conn) => raw.execute(&mut *conn).await.map(|_| ()),
        };
        result.map_err(|source| execution_error(sql, source))
    }
}

pub(crate) fn execution_error(sql: &str, source: sqlx::Error) -> Error {
    Error::Execution {
        sql: sql.to_string(),
        source,
    }
}

/// Decodes every column of `row` with the engine's value decoder.
fn decode_row<R: sqlx::Row>(
    row: &R,
    decode_value: fn(&R, usize) -> std::result::Result<SqlValue, sqlx::Error>,
) -> Result<Row> {
    let mut decoded = Row::with_capacity(row.len());
    for column in row.columns() {
        let value = decode_value(row, column.ordinal()).map_err(|source| Error::Decode {
            column: column.name().to_string(),
            source,
        })?;
        decoded.insert(column.name().to_string(), value);
    }
    Ok(decoded)
}

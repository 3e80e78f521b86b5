//! SQLite binding and decoding.
//!
//! SQLite is dynamically typed, so values are decoded by their storage
//! class rather than the declared column type. Timestamps are stored as
//! `YYYY-MM-DD HH:MM:SS` text.

use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{Row as _, TypeInfo as _, ValueRef as _};

use super::{decode_row, execution_error, Executed};
use crate::connection::Row;
use crate::error::Result;
use crate::value::{SqlValue, DATETIME_FORMAT};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

pub(super) async fn fetch_all(
    conn: &mut SqliteConnection,
    sql: &str,
    bindings: &[SqlValue],
) -> Result<Vec<Row>> {
    let rows = bind_all(sqlx::query(sql), bindings)
        .fetch_all(&mut *conn)
        .await
        .map_err(|source| execution_error(sql, source))?;
    rows.iter().map(|row| decode_row(row, decode_value)).collect()
}

pub(super) async fn execute(
    conn: &mut SqliteConnection,
    sql: &str,
    bindings: &[SqlValue],
) -> Result<Executed> {
    let result = bind_all(sqlx::query(sql), bindings)
        .execute(&mut *conn)
        .await
        .map_err(|source| execution_error(sql, source))?;
    Ok(Executed {
        rows_affected: result.rows_affected(),
        last_insert_id: Some(result.last_insert_rowid()),
    })
}

fn bind_all<'q>(mut query: SqliteQuery<'q>, bindings: &[SqlValue]) -> SqliteQuery<'q> {
    for value in bindings {
        query = match value {
            SqlValue::Null => query.bind(Option::<i64>::None),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Blob(b) => query.bind(b.clone()),
            SqlValue::Json(v) => query.bind(v.to_string()),
            SqlValue::DateTime(dt) => query.bind(dt.format(DATETIME_FORMAT).to_string()),
        };
    }
    query
}

fn decode_value(row: &SqliteRow, index: usize) -> std::result::Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_string();
    Ok(match storage.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked(index)?),
        "REAL" => SqlValue::Float(row.try_get_unchecked(index)?),
        "BLOB" => SqlValue::Blob(row.try_get_unchecked(index)?),
        _ => SqlValue::Text(row.try_get_unchecked(index)?),
    })
}

//! MySQL binding and decoding.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::types::Decimal;
use sqlx::{Row as _, TypeInfo as _, ValueRef as _};

use super::{decode_row, execution_error, Executed};
use crate::connection::Row;
use crate::error::Result;
use crate::value::SqlValue;

type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

pub(super) async fn fetch_all(
    conn: &mut MySqlConnection,
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
    conn: &mut MySqlConnection,
    sql: &str,
    bindings: &[SqlValue],
) -> Result<Executed> {
    let result = bind_all(sqlx::query(sql), bindings)
        .execute(&mut *conn)
        .await
        .map_err(|source| execution_error(sql, source))?;
    // Zero means the table has no AUTO_INCREMENT column.
    let last_insert_id = i64::try_from(result.last_insert_id())
        .ok()
        .filter(|id| *id != 0);
    Ok(Executed {
        rows_affected: result.rows_affected(),
        last_insert_id,
    })
}

fn bind_all<'q>(mut query: MySqlQuery<'q>, bindings: &[SqlValue]) -> MySqlQuery<'q> {
    for value in bindings {
        query = match value {
            SqlValue::Null => query.bind(Option::<String>::None),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Blob(b) => query.bind(b.clone()),
            SqlValue::Json(v) => query.bind(v.to_string()),
            SqlValue::DateTime(dt) => query.bind(*dt),
        };
    }
    query
}

fn decode_value(row: &MySqlRow, index: usize) -> std::result::Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let type_name = raw.type_info().name().to_string();
    Ok(match type_name.as_str() {
        "NULL" => SqlValue::Null,
        "BOOLEAN" => SqlValue::Bool(row.try_get(index)?),
        "BIGINT UNSIGNED" => {
            let value: u64 = row.try_get_unchecked(index)?;
            i64::try_from(value).map_or_else(|_| SqlValue::Text(value.to_string()), SqlValue::Int)
        }
        "TINYINT" | "TINYINT UNSIGNED" | "SMALLINT" | "SMALLINT UNSIGNED" | "MEDIUMINT"
        | "MEDIUMINT UNSIGNED" | "INT" | "INT UNSIGNED" | "BIGINT" | "YEAR" => {
            SqlValue::Int(row.try_get_unchecked(index)?)
        }
        "FLOAT" => SqlValue::Float(f64::from(row.try_get_unchecked::<f32, _>(index)?)),
        "DOUBLE" => SqlValue::Float(row.try_get_unchecked(index)?),
        // Kept as text to preserve precision.
        "DECIMAL" => SqlValue::Text(row.try_get::<Decimal, _>(index)?.to_string()),
        "JSON" => SqlValue::Json(row.try_get(index)?),
        "DATETIME" | "TIMESTAMP" => SqlValue::DateTime(row.try_get_unchecked::<NaiveDateTime, _>(index)?),
        "DATE" => SqlValue::Text(row.try_get::<NaiveDate, _>(index)?.format("%Y-%m-%d").to_string()),
        "TIME" => SqlValue::Text(row.try_get::<NaiveTime, _>(index)?.format("%H:%M:%S").to_string()),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => SqlValue::Blob(row.try_get_unchecked(index)?),
        _ => SqlValue::Text(row.try_get_unchecked(index)?),
    })
}

//! PostgreSQL binding and decoding.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgConnection, PgRow, PgTypeInfo, Postgres};
use sqlx::query::Query;
use sqlx::types::{Decimal, Uuid};
use sqlx::{Row as _, Type, TypeInfo as _, ValueRef as _};

use super::{decode_row, execution_error, Executed};
use crate::connection::Row;
use crate::error::Result;
use crate::value::SqlValue;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// A NULL parameter with no declared type, so the server infers it from
/// the surrounding expression.
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> std::result::Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

pub(super) async fn fetch_all(
    conn: &mut PgConnection,
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
    conn: &mut PgConnection,
    sql: &str,
    bindings: &[SqlValue],
) -> Result<Executed> {
    let result = bind_all(sqlx::query(sql), bindings)
        .execute(&mut *conn)
        .await
        .map_err(|source| execution_error(sql, source))?;
    // Generated keys come back through `RETURNING`.
    Ok(Executed {
        rows_affected: result.rows_affected(),
        last_insert_id: None,
    })
}

fn bind_all<'q>(mut query: PgQuery<'q>, bindings: &[SqlValue]) -> PgQuery<'q> {
    for value in bindings {
        query = match value {
            SqlValue::Null => query.bind(UntypedNull),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Blob(b) => query.bind(b.clone()),
            SqlValue::Json(v) => query.bind(v.clone()),
            SqlValue::DateTime(dt) => query.bind(*dt),
        };
    }
    query
}

fn decode_value(row: &PgRow, index: usize) -> std::result::Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let type_name = raw.type_info().name().to_string();
    Ok(match type_name.as_str() {
        "BOOL" => SqlValue::Bool(row.try_get(index)?),
        "INT2" => SqlValue::Int(i64::from(row.try_get::<i16, _>(index)?)),
        "INT4" => SqlValue::Int(i64::from(row.try_get::<i32, _>(index)?)),
        "INT8" => SqlValue::Int(row.try_get(index)?),
        "FLOAT4" => SqlValue::Float(f64::from(row.try_get::<f32, _>(index)?)),
        "FLOAT8" => SqlValue::Float(row.try_get(index)?),
        // Kept as text to preserve precision.
        "NUMERIC" => SqlValue::Text(row.try_get::<Decimal, _>(index)?.to_string()),
        "BYTEA" => SqlValue::Blob(row.try_get(index)?),
        "UUID" => SqlValue::Text(row.try_get::<Uuid, _>(index)?.to_string()),
        "JSON" | "JSONB" => SqlValue::Json(row.try_get(index)?),
        "TIMESTAMP" => SqlValue::DateTime(row.try_get::<NaiveDateTime, _>(index)?),
        "TIMESTAMPTZ" => SqlValue::DateTime(row.try_get::<DateTime<Utc>, _>(index)?.naive_utc()),
        "DATE" => SqlValue::Text(row.try_get::<NaiveDate, _>(index)?.format("%Y-%m-%d").to_string()),
        "TIME" => SqlValue::Text(row.try_get::<NaiveTime, _>(index)?.format("%H:%M:%S").to_string()),
        "VOID" => SqlValue::Null,
        // Text-like types, including domains such as `sql_identifier`.
        _ => SqlValue::Text(row.try_get_unchecked(index)?),
    })
}

//! Fluent query builder.
//!
//! A [`QueryBuilder`] accumulates the clauses of a single statement and
//! compiles them into SQL text plus an ordered list of bound values. Clause
//! methods consume and return the builder; terminal methods borrow it, so a
//! builder can be compiled or executed any number of times.

use indexmap::IndexSet;

use super::aggregate::Aggregate;
use super::clause::{Boolean, Having, Join, JoinKind, Operator, OrderDirection, Where, WhereKind};
use crate::config::Driver;
use crate::connection::{Connection, Row};
use crate::error::{Error, Result};
use crate::value::{SqlValue, ToSqlValue};

/// Accumulates SQL text and bindings, writing the dialect's placeholder for
/// every bound value.
struct SqlWriter {
    driver: Driver,
    sql: String,
    bindings: Vec<SqlValue>,
}

impl SqlWriter {
    fn new(driver: Driver) -> Self {
        Self {
            driver,
            sql: String::new(),
            bindings: Vec::new(),
        }
    }

    fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    fn bind(&mut self, value: SqlValue) {
        self.bindings.push(value);
        let placeholder = self.driver.placeholder(self.bindings.len());
        self.sql.push_str(&placeholder);
    }

    fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.bindings)
    }
}

/// A fluent builder for a single SQL statement against one table.
///
/// # Example
///
/// ```ignore
/// let rows = conn
///     .table("users")
///     .select(&["id", "name"])
///     .where_eq("active", true)
///     .or_where_op("logins", Operator::Gt, 10)
///     .order_by_desc("created_at")
///     .limit(10)
///     .get()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<'c> {
    conn: &'c Connection,
    table: String,
    columns: Vec<String>,
    distinct: bool,
    joins: Vec<Join>,
    wheres: Vec<Where>,
    groups: Vec<String>,
    havings: Vec<Having>,
    orders: Vec<(String, OrderDirection)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'c> QueryBuilder<'c> {
    /// Creates an empty builder for `table`.
    #[must_use]
    pub fn new(conn: &'c Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
            columns: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            wheres: Vec::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Returns a fresh builder for the same connection and table.
    #[must_use]
    pub fn new_query(&self) -> Self {
        Self::new(self.conn, &self.table)
    }

    /// Returns the connection this builder executes through.
    #[must_use]
    pub const fn connection(&self) -> &'c Connection {
        self.conn
    }

    /// Returns the target table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn driver(&self) -> Driver {
        self.conn.driver()
    }

    /// Prepares a filter value. Engines without a native boolean compare
    /// against `0`/`1`.
    fn filter_value(&self, value: SqlValue) -> SqlValue {
        match self.driver() {
            Driver::Mysql | Driver::Sqlite => value.normalize_bool(),
            Driver::Postgres => value,
        }
    }

    // Select list

    /// Replaces the select list.
    #[must_use]
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Appends to the select list.
    #[must_use]
    pub fn add_select(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| (*c).to_string()));
        self
    }

    /// Makes the query return distinct rows.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // WHERE clauses

    fn push_where(mut self, boolean: Boolean, kind: WhereKind) -> Self {
        self.wheres.push(Where { boolean, kind });
        self
    }

    fn basic(self, boolean: Boolean, column: &str, operator: Operator, value: SqlValue) -> Self {
        let value = self.filter_value(value);
        self.push_where(
            boolean,
            WhereKind::Basic {
                column: column.to_string(),
                operator,
                value,
            },
        )
    }

    fn in_list<I, V>(self, boolean: Boolean, column: &str, values: I, negated: bool) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        let values = values
            .into_iter()
            .map(|v| self.filter_value(v.to_sql_value()))
            .collect();
        self.push_where(
            boolean,
            WhereKind::In {
                column: column.to_string(),
                values,
                negated,
            },
        )
    }

    fn null(self, boolean: Boolean, column: &str, negated: bool) -> Self {
        self.push_where(
            boolean,
            WhereKind::Null {
                column: column.to_string(),
                negated,
            },
        )
    }

    fn between(
        self,
        boolean: Boolean,
        column: &str,
        low: SqlValue,
        high: SqlValue,
        negated: bool,
    ) -> Self {
        let low = self.filter_value(low);
        let high = self.filter_value(high);
        self.push_where(
            boolean,
            WhereKind::Between {
                column: column.to_string(),
                low,
                high,
                negated,
            },
        )
    }

    /// Adds `AND column = value`.
    #[must_use]
    pub fn where_eq(self, column: &str, value: impl ToSqlValue) -> Self {
        self.basic(Boolean::And, column, Operator::Eq, value.to_sql_value())
    }

    /// Adds `AND column <op> value`.
    #[must_use]
    pub fn where_op(self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        self.basic(Boolean::And, column, operator, value.to_sql_value())
    }

    /// Adds `OR column = value`.
    #[must_use]
    pub fn or_where_eq(self, column: &str, value: impl ToSqlValue) -> Self {
        self.basic(Boolean::Or, column, Operator::Eq, value.to_sql_value())
    }

    /// Adds `OR column <op> value`.
    #[must_use]
    pub fn or_where_op(self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        self.basic(Boolean::Or, column, operator, value.to_sql_value())
    }

    /// Adds `AND column IN (values)`. An empty list matches nothing.
    #[must_use]
    pub fn where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.in_list(Boolean::And, column, values, false)
    }

    /// Adds `OR column IN (values)`.
    #[must_use]
    pub fn or_where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.in_list(Boolean::Or, column, values, false)
    }

    /// Adds `AND column NOT IN (values)`. An empty list matches everything.
    #[must_use]
    pub fn where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.in_list(Boolean::And, column, values, true)
    }

    /// Adds `OR column NOT IN (values)`.
    #[must_use]
    pub fn or_where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.in_list(Boolean::Or, column, values, true)
    }

    /// Adds `AND column IS NULL`.
    #[must_use]
    pub fn where_null(self, column: &str) -> Self {
        self.null(Boolean::And, column, false)
    }

    /// Adds `OR column IS NULL`.
    #[must_use]
    pub fn or_where_null(self, column: &str) -> Self {
        self.null(Boolean::Or, column, false)
    }

    /// Adds `AND column IS NOT NULL`.
    #[must_use]
    pub fn where_not_null(self, column: &str) -> Self {
        self.null(Boolean::And, column, true)
    }

    /// Adds `OR column IS NOT NULL`.
    #[must_use]
    pub fn or_where_not_null(self, column: &str) -> Self {
        self.null(Boolean::Or, column, true)
    }

    /// Adds `AND column BETWEEN low AND high`.
    #[must_use]
    pub fn where_between(self, column: &str, low: impl ToSqlValue, high: impl ToSqlValue) -> Self {
        self.between(
            Boolean::And,
            column,
            low.to_sql_value(),
            high.to_sql_value(),
            false,
        )
    }

    /// Adds `OR column BETWEEN low AND high`.
    #[must_use]
    pub fn or_where_between(
        self,
        column: &str,
        low: impl ToSqlValue,
        high: impl ToSqlValue,
    ) -> Self {
        self.between(
            Boolean::Or,
            column,
            low.to_sql_value(),
            high.to_sql_value(),
            false,
        )
    }

    /// Adds `AND column NOT BETWEEN low AND high`.
    #[must_use]
    pub fn where_not_between(
        self,
        column: &str,
        low: impl ToSqlValue,
        high: impl ToSqlValue,
    ) -> Self {
        self.between(
            Boolean::And,
            column,
            low.to_sql_value(),
            high.to_sql_value(),
            true,
        )
    }

    /// Adds `OR column NOT BETWEEN low AND high`.
    #[must_use]
    pub fn or_where_not_between(
        self,
        column: &str,
        low: impl ToSqlValue,
        high: impl ToSqlValue,
    ) -> Self {
        self.between(
            Boolean::Or,
            column,
            low.to_sql_value(),
            high.to_sql_value(),
            true,
        )
    }

    // Joins

    fn push_join(mut self, kind: JoinKind, table: &str, on: Option<(&str, Operator, &str)>) -> Self {
        self.joins.push(Join {
            kind,
            table: table.to_string(),
            on: on.map(|(first, op, second)| (first.to_string(), op, second.to_string())),
        });
        self
    }

    /// Adds an INNER JOIN.
    #[must_use]
    pub fn join(self, table: &str, first: &str, operator: Operator, second: &str) -> Self {
        self.push_join(JoinKind::Inner, table, Some((first, operator, second)))
    }

    /// Adds a LEFT JOIN.
    #[must_use]
    pub fn left_join(self, table: &str, first: &str, operator: Operator, second: &str) -> Self {
        self.push_join(JoinKind::Left, table, Some((first, operator, second)))
    }

    /// Adds a RIGHT JOIN.
    #[must_use]
    pub fn right_join(self, table: &str, first: &str, operator: Operator, second: &str) -> Self {
        self.push_join(JoinKind::Right, table, Some((first, operator, second)))
    }

    /// Adds a CROSS JOIN.
    #[must_use]
    pub fn cross_join(self, table: &str) -> Self {
        self.push_join(JoinKind::Cross, table, None)
    }

    // Grouping, ordering and paging

    /// Appends GROUP BY columns.
    #[must_use]
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.groups.extend(columns.iter().map(|c| (*c).to_string()));
        self
    }

    /// Adds `AND column <op> value` to the HAVING clause.
    #[must_use]
    pub fn having(mut self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        let value = self.filter_value(value.to_sql_value());
        self.havings.push(Having {
            boolean: Boolean::And,
            column: column.to_string(),
            operator,
            value,
        });
        self
    }

    /// Adds `OR column <op> value` to the HAVING clause.
    #[must_use]
    pub fn or_having(mut self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        let value = self.filter_value(value.to_sql_value());
        self.havings.push(Having {
            boolean: Boolean::Or,
            column: column.to_string(),
            operator,
            value,
        });
        self
    }

    /// Appends an ORDER BY column.
    #[must_use]
    pub fn order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.orders.push((column.to_string(), direction));
        self
    }

    /// Appends a descending ORDER BY column.
    #[must_use]
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, OrderDirection::Desc)
    }

    /// Sets the LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the OFFSET.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets LIMIT/OFFSET for a 1-based page of `per_page` rows.
    #[must_use]
    pub const fn for_page(self, page: u64, per_page: u64) -> Self {
        self.offset(page.saturating_sub(1) * per_page).limit(per_page)
    }

    // Compilation

    fn write_joins(&self, w: &mut SqlWriter) {
        for join in &self.joins {
            w.push(" ");
            w.push(&join.to_sql());
        }
    }

    fn write_wheres(&self, w: &mut SqlWriter) {
        for (i, clause) in self.wheres.iter().enumerate() {
            if i == 0 {
                w.push(" WHERE ");
            } else {
                w.push(" ");
                w.push(clause.boolean.as_sql());
                w.push(" ");
            }
            match &clause.kind {
                WhereKind::Basic {
                    column,
                    operator,
                    value,
                } => {
                    w.push(&format!("{column} {operator} "));
                    w.bind(value.clone());
                }
                WhereKind::In {
                    values, negated, ..
                } if values.is_empty() => {
                    w.push(if *negated { "1 = 1" } else { "0 = 1" });
                }
                WhereKind::In {
                    column,
                    values,
                    negated,
                } => {
                    w.push(column);
                    w.push(if *negated { " NOT IN (" } else { " IN (" });
                    for (j, value) in values.iter().enumerate() {
                        if j > 0 {
                            w.push(", ");
                        }
                        w.bind(value.clone());
                    }
                    w.push(")");
                }
                WhereKind::Null { column, negated } => {
                    w.push(column);
                    w.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
                }
                WhereKind::Between {
                    column,
                    low,
                    high,
                    negated,
                } => {
                    w.push(column);
                    w.push(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                    w.bind(low.clone());
                    w.push(" AND ");
                    w.bind(high.clone());
                }
            }
        }
    }

    fn write_groups_and_havings(&self, w: &mut SqlWriter) {
        if !self.groups.is_empty() {
            w.push(" GROUP BY ");
            w.push(&self.groups.join(", "));
        }
        for (i, having) in self.havings.iter().enumerate() {
            if i == 0 {
                w.push(" HAVING ");
            } else {
                w.push(" ");
                w.push(having.boolean.as_sql());
                w.push(" ");
            }
            w.push(&format!("{} {} ", having.column, having.operator));
            w.bind(having.value.clone());
        }
    }

    fn write_orders_and_paging(&self, w: &mut SqlWriter) {
        if !self.orders.is_empty() {
            let orders: Vec<String> = self
                .orders
                .iter()
                .map(|(column, direction)| format!("{column} {}", direction.as_sql()))
                .collect();
            w.push(" ORDER BY ");
            w.push(&orders.join(", "));
        }
        match (self.limit, self.offset) {
            (Some(limit), _) => w.push(&format!(" LIMIT {limit}")),
            // MySQL and SQLite only accept OFFSET after a LIMIT
            (None, Some(_)) => match self.driver() {
                Driver::Mysql => w.push(" LIMIT 18446744073709551615"),
                Driver::Sqlite => w.push(" LIMIT -1"),
                Driver::Postgres => {}
            },
            (None, None) => {}
        }
        if let Some(offset) = self.offset {
            w.push(&format!(" OFFSET {offset}"));
        }
    }

    /// Compiles the SELECT statement and its bindings.
    #[must_use]
    pub fn compile_select(&self) -> (String, Vec<SqlValue>) {
        let mut w = SqlWriter::new(self.driver());
        w.push("SELECT ");
        if self.distinct {
            w.push("DISTINCT ");
        }
        if self.columns.is_empty() {
            w.push("*");
        } else {
            w.push(&self.columns.join(", "));
        }
        w.push(" FROM ");
        w.push(&self.table);
        self.write_joins(&mut w);
        self.write_wheres(&mut w);
        self.write_groups_and_havings(&mut w);
        self.write_orders_and_paging(&mut w);
        w.finish()
    }

    /// Returns the SELECT statement this builder compiles to.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.compile_select().0
    }

    /// Returns the values bound by the SELECT statement, in placeholder order.
    #[must_use]
    pub fn bindings(&self) -> Vec<SqlValue> {
        self.compile_select().1
    }

    /// Compiles an aggregate query. The select list, ordering and paging
    /// are ignored.
    #[must_use]
    pub fn compile_aggregate(&self, aggregate: &Aggregate) -> (String, Vec<SqlValue>) {
        let expression = match (self.driver(), aggregate.is_numeric()) {
            (Driver::Postgres, true) => {
                format!("CAST({} AS DOUBLE PRECISION)", aggregate.expression())
            }
            (Driver::Mysql, true) => format!("CAST({} AS DOUBLE)", aggregate.expression()),
            _ => aggregate.expression(),
        };
        let mut w = SqlWriter::new(self.driver());
        w.push(&format!(
            "SELECT {expression} AS {} FROM {}",
            Aggregate::ALIAS,
            self.table
        ));
        self.write_joins(&mut w);
        self.write_wheres(&mut w);
        self.write_groups_and_havings(&mut w);
        w.finish()
    }

    /// Compiles a (multi-row) INSERT. The column list is every key of every
    /// row, in first-seen order; a row missing a column inserts NULL there.
    #[must_use]
    pub fn compile_insert(&self, rows: &[Row]) -> (String, Vec<SqlValue>) {
        let mut w = SqlWriter::new(self.driver());
        let columns: Vec<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect::<IndexSet<&str>>()
            .into_iter()
            .collect();

        if columns.is_empty() {
            w.push(&match self.driver() {
                Driver::Mysql => format!("INSERT INTO {} () VALUES ()", self.table),
                Driver::Postgres | Driver::Sqlite => {
                    format!("INSERT INTO {} DEFAULT VALUES", self.table)
                }
            });
            return w.finish();
        }

        w.push(&format!(
            "INSERT INTO {} ({}) VALUES ",
            self.table,
            columns.join(", ")
        ));
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push("(");
            for (j, column) in columns.iter().enumerate() {
                if j > 0 {
                    w.push(", ");
                }
                w.bind(row.get(*column).cloned().unwrap_or(SqlValue::Null));
            }
            w.push(")");
        }
        w.finish()
    }

    /// Compiles an UPDATE restricted by the accumulated WHERE clauses.
    #[must_use]
    pub fn compile_update(&self, values: &Row) -> (String, Vec<SqlValue>) {
        let mut w = SqlWriter::new(self.driver());
        w.push(&format!("UPDATE {} SET ", self.table));
        for (i, (column, value)) in values.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push(&format!("{column} = "));
            w.bind(value.clone());
        }
        self.write_wheres(&mut w);
        w.finish()
    }

    /// Compiles a DELETE restricted by the accumulated WHERE clauses.
    #[must_use]
    pub fn compile_delete(&self) -> (String, Vec<SqlValue>) {
        let mut w = SqlWriter::new(self.driver());
        w.push(&format!("DELETE FROM {}", self.table));
        self.write_wheres(&mut w);
        w.finish()
    }

    /// Compiles a statement that empties the table.
    #[must_use]
    pub fn compile_truncate(&self) -> String {
        match self.driver() {
            Driver::Mysql => format!("TRUNCATE TABLE {}", self.table),
            Driver::Postgres => format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", self.table),
            Driver::Sqlite => format!("DELETE FROM {}", self.table),
        }
    }

    // Execution

    /// Returns every matching row.
    pub async fn get(&self) -> Result<Vec<Row>> {
        let (sql, bindings) = self.compile_select();
        self.conn.select(&sql, &bindings).await
    }

    /// Returns the first matching row.
    pub async fn first(&self) -> Result<Option<Row>> {
        let rows = self.clone().limit(1).get().await?;
        Ok(rows.into_iter().next())
    }

    /// Returns the row whose `id` equals `id`.
    pub async fn find(&self, id: impl ToSqlValue) -> Result<Option<Row>> {
        self.clone().where_eq("id", id).first().await
    }

    /// Returns the values of a single column.
    pub async fn pluck(&self, column: &str) -> Result<Vec<SqlValue>> {
        let rows = self.clone().select(&[column]).get().await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_values().next())
            .collect())
    }

    /// Returns whether any row matches.
    pub async fn exists(&self) -> Result<bool> {
        Ok(self.first().await?.is_some())
    }

    /// Runs an aggregate and returns its raw value.
    pub async fn aggregate(&self, aggregate: &Aggregate) -> Result<SqlValue> {
        let (sql, bindings) = self.compile_aggregate(aggregate);
        let rows = self.conn.select(&sql, &bindings).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_values().next())
            .unwrap_or(SqlValue::Null))
    }

    /// Counts the matching rows.
    pub async fn count(&self) -> Result<i64> {
        let value = self.aggregate(&Aggregate::count_all()).await?;
        Ok(value.as_i64().unwrap_or(0))
    }

    /// Counts the distinct non-null values of a column.
    pub async fn count_distinct(&self, column: &str) -> Result<i64> {
        let value = self.aggregate(&Aggregate::count_distinct(column)).await?;
        Ok(value.as_i64().unwrap_or(0))
    }

    /// Sums a column. `None` when no row matches.
    pub async fn sum(&self, column: &str) -> Result<Option<f64>> {
        Ok(self.aggregate(&Aggregate::sum(column)).await?.as_f64())
    }

    /// Averages a column. `None` when no row matches.
    pub async fn avg(&self, column: &str) -> Result<Option<f64>> {
        Ok(self.aggregate(&Aggregate::avg(column)).await?.as_f64())
    }

    /// Returns the smallest value of a column.
    pub async fn min(&self, column: &str) -> Result<SqlValue> {
        self.aggregate(&Aggregate::min(column)).await
    }

    /// Returns the largest value of a column.
    pub async fn max(&self, column: &str) -> Result<SqlValue> {
        self.aggregate(&Aggregate::max(column)).await
    }

    /// Inserts a row and returns the number of inserted rows.
    /// An empty row inserts nothing.
    pub async fn insert(&self, values: &Row) -> Result<u64> {
        self.insert_many(std::slice::from_ref(values)).await
    }

    /// Inserts several rows in one statement.
    pub async fn insert_many(&self, rows: &[Row]) -> Result<u64> {
        if rows.iter().all(Row::is_empty) {
            return Ok(0);
        }
        let (sql, bindings) = self.compile_insert(rows);
        self.conn.execute(&sql, &bindings).await
    }

    /// Inserts a row and returns the generated `id`.
    pub async fn insert_get_id(&self, values: &Row) -> Result<i64> {
        self.insert_get_id_with_key(values, "id").await
    }

    /// Inserts a row and returns the generated value of `key`.
    pub async fn insert_get_id_with_key(&self, values: &Row, key: &str) -> Result<i64> {
        let (mut sql, bindings) = self.compile_insert(std::slice::from_ref(values));
        let id = match self.driver() {
            Driver::Postgres => {
                sql.push_str(&format!(" RETURNING {key}"));
                let rows = self.conn.select(&sql, &bindings).await?;
                rows.first()
                    .and_then(|row| row.get(key))
                    .and_then(SqlValue::as_i64)
            }
            Driver::Mysql | Driver::Sqlite => {
                self.conn.insert_returning_id(&sql, &bindings).await?
            }
        };
        id.ok_or_else(|| Error::MissingInsertId(self.table.clone()))
    }

    /// Updates the matching rows and returns how many were affected.
    pub async fn update(&self, values: &Row) -> Result<u64> {
        if values.is_empty() {
            return Ok(0);
        }
        let (sql, bindings) = self.compile_update(values);
        self.conn.execute(&sql, &bindings).await
    }

    /// Deletes the matching rows and returns how many were affected.
    pub async fn delete(&self) -> Result<u64> {
        let (sql, bindings) = self.compile_delete();
        self.conn.execute(&sql, &bindings).await
    }

    /// Removes every row from the table.
    pub async fn truncate(&self) -> Result<()> {
        let sql = self.compile_truncate();
        self.conn.execute(&sql, &[]).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::row;

    fn sqlite() -> Connection {
        Connection::new(ConnectionConfig::sqlite(":memory:"))
    }

    fn postgres() -> Connection {
        Connection::new(ConnectionConfig::new(Driver::Postgres, "app"))
    }

    fn mysql() -> Connection {
        Connection::new(ConnectionConfig::new(Driver::Mysql, "app"))
    }

    #[test]
    fn test_select_all() {
        let conn = sqlite();
        assert_eq!(conn.table("users").to_sql(), "SELECT * FROM users");
    }

    #[test]
    fn test_select_columns_and_distinct() {
        let conn = sqlite();
        let query = conn
            .table("users")
            .select(&["id", "name"])
            .add_select(&["email"])
            .distinct();
        assert_eq!(query.to_sql(), "SELECT DISTINCT id, name, email FROM users");
    }

    #[test]
    fn test_connectors_follow_call_order() {
        let conn = sqlite();
        let query = conn
            .table("users")
            .where_eq("a", 1)
            .or_where_eq("b", 2)
            .where_eq("c", 3);
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM users WHERE a = ? OR b = ? AND c = ?"
        );
        assert_eq!(
            query.bindings(),
            vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
        );
    }

    #[test]
    fn test_bindings_follow_call_order() {
        let conn = sqlite();
        let query = conn
            .table("orders")
            .join("users", "users.id", Operator::Eq, "orders.user_id")
            .where_op("total", Operator::Gt, 100)
            .where_in("status", ["paid", "shipped"])
            .or_where_between("placed_at", "2024-01-01", "2024-12-31")
            .group_by(&["users.id"])
            .having("COUNT(*)", Operator::Gte, 2);
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM orders INNER JOIN users ON users.id = orders.user_id \
             WHERE total > ? AND status IN (?, ?) OR placed_at BETWEEN ? AND ? \
             GROUP BY users.id HAVING COUNT(*) >= ?"
        );
        assert_eq!(
            query.bindings(),
            vec![
                SqlValue::Int(100),
                SqlValue::Text("paid".into()),
                SqlValue::Text("shipped".into()),
                SqlValue::Text("2024-01-01".into()),
                SqlValue::Text("2024-12-31".into()),
                SqlValue::Int(2),
            ]
        );
    }

    #[test]
    fn test_postgres_numbered_placeholders() {
        let conn = postgres();
        let query = conn
            .table("users")
            .where_eq("a", 1)
            .where_in("b", [2, 3])
            .or_having("c", Operator::Lt, 4);
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM users WHERE a = $1 AND b IN ($2, $3) HAVING c < $4"
        );

        let (sql, bindings) = query.compile_update(&row! { "name" => "x", "age" => 3 });
        assert_eq!(
            sql,
            "UPDATE users SET name = $1, age = $2 WHERE a = $3 AND b IN ($4, $5)"
        );
        assert_eq!(bindings.len(), 5);
    }

    #[test]
    fn test_boolean_filters_are_normalized() {
        let conn = sqlite();
        let query = conn
            .table("users")
            .where_eq("active", true)
            .where_in("flag", [false]);
        assert_eq!(query.bindings(), vec![SqlValue::Int(1), SqlValue::Int(0)]);

        let (_, bindings) = query.compile_insert(&[row! { "active" => true }]);
        assert_eq!(bindings, vec![SqlValue::Bool(true)]);

        let conn = mysql();
        let query = conn.table("users").having("active", Operator::Eq, false);
        assert_eq!(query.bindings(), vec![SqlValue::Int(0)]);
    }

    #[test]
    fn test_postgres_keeps_native_booleans() {
        let conn = postgres();
        let query = conn
            .table("users")
            .where_eq("active", true)
            .where_in("flag", [false])
            .or_where_between("beta", false, true)
            .having("verified", Operator::Eq, true);
        assert_eq!(
            query.bindings(),
            vec![
                SqlValue::Bool(true),
                SqlValue::Bool(false),
                SqlValue::Bool(false),
                SqlValue::Bool(true),
                SqlValue::Bool(true),
            ]
        );
    }

    #[test]
    fn test_empty_in_lists() {
        let conn = sqlite();
        let none = conn.table("users").where_in("id", Vec::<i64>::new());
        assert_eq!(none.to_sql(), "SELECT * FROM users WHERE 0 = 1");
        assert!(none.bindings().is_empty());

        let all = conn.table("users").where_not_in("id", Vec::<i64>::new());
        assert_eq!(all.to_sql(), "SELECT * FROM users WHERE 1 = 1");
    }

    #[test]
    fn test_null_and_not_between() {
        let conn = sqlite();
        let query = conn
            .table("users")
            .where_null("deleted_at")
            .or_where_not_null("banned_at")
            .where_not_between("age", 18, 65)
            .or_where_not_in("id", [7]);
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM users WHERE deleted_at IS NULL OR banned_at IS NOT NULL \
             AND age NOT BETWEEN ? AND ? OR id NOT IN (?)"
        );
    }

    #[test]
    fn test_joins() {
        let conn = sqlite();
        let query = conn
            .table("users")
            .left_join("posts", "users.id", Operator::Eq, "posts.user_id")
            .right_join("teams", "users.team_id", Operator::Eq, "teams.id")
            .cross_join("sizes");
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM users LEFT JOIN posts ON users.id = posts.user_id \
             RIGHT JOIN teams ON users.team_id = teams.id CROSS JOIN sizes"
        );
        assert!(query.bindings().is_empty());
    }

    #[test]
    fn test_order_limit_offset() {
        let conn = sqlite();
        let query = conn
            .table("users")
            .order_by("name", OrderDirection::Asc)
            .order_by_desc("id")
            .for_page(3, 15);
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM users ORDER BY name ASC, id DESC LIMIT 15 OFFSET 30"
        );
    }

    #[test]
    fn test_offset_without_limit() {
        assert_eq!(
            sqlite().table("t").offset(5).to_sql(),
            "SELECT * FROM t LIMIT -1 OFFSET 5"
        );
        assert_eq!(
            mysql().table("t").offset(5).to_sql(),
            "SELECT * FROM t LIMIT 18446744073709551615 OFFSET 5"
        );
        assert_eq!(postgres().table("t").offset(5).to_sql(), "SELECT * FROM t OFFSET 5");
    }

    #[test]
    fn test_aggregate_ignores_select_list_and_ordering() {
        let conn = sqlite();
        let query = conn
            .table("users")
            .select(&["name"])
            .where_eq("active", 1)
            .order_by_desc("id")
            .limit(5);
        let (sql, bindings) = query.compile_aggregate(&Aggregate::count_all());
        assert_eq!(sql, "SELECT COUNT(*) AS aggregate FROM users WHERE active = ?");
        assert_eq!(bindings, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_numeric_aggregates_are_cast_on_server_dialects() {
        let (sql, _) = postgres()
            .table("orders")
            .compile_aggregate(&Aggregate::sum("total"));
        assert_eq!(
            sql,
            "SELECT CAST(SUM(total) AS DOUBLE PRECISION) AS aggregate FROM orders"
        );
        let (sql, _) = sqlite().table("orders").compile_aggregate(&Aggregate::avg("total"));
        assert_eq!(sql, "SELECT AVG(total) AS aggregate FROM orders");
    }

    #[test]
    fn test_compile_insert_many() {
        let conn = sqlite();
        let (sql, bindings) = conn.table("users").compile_insert(&[
            row! { "name" => "a", "age" => 1 },
            row! { "name" => "b" },
        ]);
        assert_eq!(sql, "INSERT INTO users (name, age) VALUES (?, ?), (?, ?)");
        assert_eq!(
            bindings,
            vec![
                SqlValue::Text("a".into()),
                SqlValue::Int(1),
                SqlValue::Text("b".into()),
                SqlValue::Null,
            ]
        );
    }

    #[test]
    fn test_compile_insert_takes_columns_from_every_row() {
        let (sql, bindings) = sqlite().table("t").compile_insert(&[
            row! { "a" => 1 },
            row! { "a" => 2, "b" => 99 },
        ]);
        assert_eq!(sql, "INSERT INTO t (a, b) VALUES (?, ?), (?, ?)");
        assert_eq!(
            bindings,
            vec![
                SqlValue::Int(1),
                SqlValue::Null,
                SqlValue::Int(2),
                SqlValue::Int(99),
            ]
        );
    }

    #[test]
    fn test_compile_insert_defaults() {
        let (sql, _) = sqlite().table("t").compile_insert(&[Row::new()]);
        assert_eq!(sql, "INSERT INTO t DEFAULT VALUES");
        let (sql, _) = mysql().table("t").compile_insert(&[Row::new()]);
        assert_eq!(sql, "INSERT INTO t () VALUES ()");
    }

    #[test]
    fn test_compile_update_and_delete() {
        let conn = sqlite();
        let query = conn.table("users").where_eq("id", 1);
        let (sql, bindings) = query.compile_update(&row! { "name" => "b" });
        assert_eq!(sql, "UPDATE users SET name = ? WHERE id = ?");
        assert_eq!(bindings, vec![SqlValue::Text("b".into()), SqlValue::Int(1)]);

        let (sql, bindings) = query.compile_delete();
        assert_eq!(sql, "DELETE FROM users WHERE id = ?");
        assert_eq!(bindings, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_compile_truncate() {
        assert_eq!(sqlite().table("t").compile_truncate(), "DELETE FROM t");
        assert_eq!(mysql().table("t").compile_truncate(), "TRUNCATE TABLE t");
        assert_eq!(
            postgres().table("t").compile_truncate(),
            "TRUNCATE TABLE t RESTART IDENTITY CASCADE"
        );
    }

    #[test]
    fn test_builder_is_not_reset_by_compilation() {
        let conn = sqlite();
        let query = conn.table("users").where_eq("a", 1);
        assert_eq!(query.to_sql(), query.to_sql());
        assert_eq!(query.clone().where_eq("b", 2).bindings().len(), 2);
        assert_eq!(query.new_query().to_sql(), "SELECT * FROM users");
    }
}

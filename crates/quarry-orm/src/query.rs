//! Model-aware queries.
//!
//! [`ModelQuery`] wraps a [`QueryBuilder`] on the model's table. Clause
//! methods forward unchanged; row-returning terminals hydrate records.

use std::fmt;
use std::marker::PhantomData;

use quarry_core::{
    Aggregate, Connection, Operator, OrderDirection, QueryBuilder, Row, SqlValue, ToSqlValue,
};

use crate::error::{OrmError, Result};
use crate::model::Model;
use crate::record::Record;

/// A query on a model's table that yields [`Record`]s.
#[must_use]
pub struct ModelQuery<'c, M> {
    builder: QueryBuilder<'c>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for ModelQuery<'_, M> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for ModelQuery<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelQuery")
            .field("builder", &self.builder)
            .finish()
    }
}

impl<'c, M: Model> ModelQuery<'c, M> {
    /// Starts a query on `M::TABLE`.
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            builder: conn.table(M::TABLE),
            _model: PhantomData,
        }
    }

    /// Returns the underlying builder.
    #[must_use]
    pub fn builder(&self) -> &QueryBuilder<'c> {
        &self.builder
    }

    /// Unwraps the underlying builder.
    #[must_use]
    pub fn into_builder(self) -> QueryBuilder<'c> {
        self.builder
    }

    fn map(self, f: impl FnOnce(QueryBuilder<'c>) -> QueryBuilder<'c>) -> Self {
        Self {
            builder: f(self.builder),
            _model: PhantomData,
        }
    }

    // Clauses

    /// Replaces the select list.
    pub fn select(self, columns: &[&str]) -> Self {
        self.map(|b| b.select(columns))
    }

    /// Appends to the select list.
    pub fn add_select(self, columns: &[&str]) -> Self {
        self.map(|b| b.add_select(columns))
    }

    /// Selects distinct rows.
    pub fn distinct(self) -> Self {
        self.map(QueryBuilder::distinct)
    }

    /// Adds `column = value`.
    pub fn where_eq(self, column: &str, value: impl ToSqlValue) -> Self {
        self.map(|b| b.where_eq(column, value))
    }

    /// Adds `column <operator> value`.
    pub fn where_op(self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        self.map(|b| b.where_op(column, operator, value))
    }

    /// Adds `OR column = value`.
    pub fn or_where_eq(self, column: &str, value: impl ToSqlValue) -> Self {
        self.map(|b| b.or_where_eq(column, value))
    }

    /// Adds `OR column <operator> value`.
    pub fn or_where_op(self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        self.map(|b| b.or_where_op(column, operator, value))
    }

    /// Adds `column IN (...)`.
    pub fn where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.map(|b| b.where_in(column, values))
    }

    /// Adds `OR column IN (...)`.
    pub fn or_where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.map(|b| b.or_where_in(column, values))
    }

    /// Adds `column NOT IN (...)`.
    pub fn where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.map(|b| b.where_not_in(column, values))
    }

    /// Adds `OR column NOT IN (...)`.
    pub fn or_where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.map(|b| b.or_where_not_in(column, values))
    }

    /// Adds `column IS NULL`.
    pub fn where_null(self, column: &str) -> Self {
        self.map(|b| b.where_null(column))
    }

    /// Adds `OR column IS NULL`.
    pub fn or_where_null(self, column: &str) -> Self {
        self.map(|b| b.or_where_null(column))
    }

    /// Adds `column IS NOT NULL`.
    pub fn where_not_null(self, column: &str) -> Self {
        self.map(|b| b.where_not_null(column))
    }

    /// Adds `OR column IS NOT NULL`.
    pub fn or_where_not_null(self, column: &str) -> Self {
        self.map(|b| b.or_where_not_null(column))
    }

    /// Adds `column BETWEEN low AND high`.
    pub fn where_between(self, column: &str, low: impl ToSqlValue, high: impl ToSqlValue) -> Self {
        self.map(|b| b.where_between(column, low, high))
    }

    /// Adds `OR column BETWEEN low AND high`.
    pub fn or_where_between(
        self,
        column: &str,
        low: impl ToSqlValue,
        high: impl ToSqlValue,
    ) -> Self {
        self.map(|b| b.or_where_between(column, low, high))
    }

    /// Adds `column NOT BETWEEN low AND high`.
    pub fn where_not_between(
        self,
        column: &str,
        low: impl ToSqlValue,
        high: impl ToSqlValue,
    ) -> Self {
        self.map(|b| b.where_not_between(column, low, high))
    }

    /// Adds an inner join.
    pub fn join(self, table: &str, first: &str, operator: Operator, second: &str) -> Self {
        self.map(|b| b.join(table, first, operator, second))
    }

    /// Adds a left join.
    pub fn left_join(self, table: &str, first: &str, operator: Operator, second: &str) -> Self {
        self.map(|b| b.left_join(table, first, operator, second))
    }

    /// Adds a right join.
    pub fn right_join(self, table: &str, first: &str, operator: Operator, second: &str) -> Self {
        self.map(|b| b.right_join(table, first, operator, second))
    }

    /// Adds a cross join.
    pub fn cross_join(self, table: &str) -> Self {
        self.map(|b| b.cross_join(table))
    }

    /// Adds GROUP BY columns.
    pub fn group_by(self, columns: &[&str]) -> Self {
        self.map(|b| b.group_by(columns))
    }

    /// Adds a HAVING condition.
    pub fn having(self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        self.map(|b| b.having(column, operator, value))
    }

    /// Adds an OR HAVING condition.
    pub fn or_having(self, column: &str, operator: Operator, value: impl ToSqlValue) -> Self {
        self.map(|b| b.or_having(column, operator, value))
    }

    /// Adds an ORDER BY column.
    pub fn order_by(self, column: &str, direction: OrderDirection) -> Self {
        self.map(|b| b.order_by(column, direction))
    }

    /// Adds a descending ORDER BY column.
    pub fn order_by_desc(self, column: &str) -> Self {
        self.map(|b| b.order_by_desc(column))
    }

    /// Orders newest first by `created_at`.
    pub fn latest(self) -> Self {
        self.order_by_desc(crate::record::CREATED_AT)
    }

    /// Sets the LIMIT.
    pub fn limit(self, limit: u64) -> Self {
        self.map(|b| b.limit(limit))
    }

    /// Sets the OFFSET.
    pub fn offset(self, offset: u64) -> Self {
        self.map(|b| b.offset(offset))
    }

    /// Sets LIMIT/OFFSET for a 1-based page.
    pub fn for_page(self, page: u64, per_page: u64) -> Self {
        self.map(|b| b.for_page(page, per_page))
    }

    /// Compiles the SELECT statement.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.builder.to_sql()
    }

    /// Returns the SELECT bindings in placeholder order.
    #[must_use]
    pub fn bindings(&self) -> Vec<SqlValue> {
        self.builder.bindings()
    }

    // Terminals

    /// Loads every matching record.
    pub async fn get(&self) -> Result<Vec<Record<M>>> {
        let rows = self.builder.get().await?;
        Ok(rows.into_iter().map(Record::from_row).collect())
    }

    /// Loads the first matching record.
    pub async fn first(&self) -> Result<Option<Record<M>>> {
        Ok(self.builder.first().await?.map(Record::from_row))
    }

    /// Loads the first matching record, failing when there is none.
    pub async fn first_or_fail(&self) -> Result<Record<M>> {
        self.first().await?.ok_or_else(|| OrmError::ModelNotFound {
            model: M::TABLE,
            key: String::from("query"),
        })
    }

    /// Loads the record with the given primary key.
    pub async fn find(&self, key: impl ToSqlValue) -> Result<Option<Record<M>>> {
        self.clone().where_eq(M::PRIMARY_KEY, key).first().await
    }

    /// Returns one column of every matching row.
    pub async fn pluck(&self, column: &str) -> Result<Vec<SqlValue>> {
        Ok(self.builder.pluck(column).await?)
    }

    /// Returns whether any row matches.
    pub async fn exists(&self) -> Result<bool> {
        Ok(self.builder.exists().await?)
    }

    /// Counts matching rows.
    pub async fn count(&self) -> Result<i64> {
        Ok(self.builder.count().await?)
    }

    /// Counts the distinct non-null values of a column.
    pub async fn count_distinct(&self, column: &str) -> Result<i64> {
        Ok(self.builder.count_distinct(column).await?)
    }

    /// Runs an aggregate over matching rows.
    pub async fn aggregate(&self, aggregate: &Aggregate) -> Result<SqlValue> {
        Ok(self.builder.aggregate(aggregate).await?)
    }

    /// Sums a column.
    pub async fn sum(&self, column: &str) -> Result<Option<f64>> {
        Ok(self.builder.sum(column).await?)
    }

    /// Averages a column.
    pub async fn avg(&self, column: &str) -> Result<Option<f64>> {
        Ok(self.builder.avg(column).await?)
    }

    /// Returns the smallest value of a column.
    pub async fn min(&self, column: &str) -> Result<SqlValue> {
        Ok(self.builder.min(column).await?)
    }

    /// Returns the largest value of a column.
    pub async fn max(&self, column: &str) -> Result<SqlValue> {
        Ok(self.builder.max(column).await?)
    }

    /// Updates matching rows directly, without loading records.
    pub async fn update(&self, values: &Row) -> Result<u64> {
        Ok(self.builder.update(values).await?)
    }

    /// Deletes matching rows directly, without loading records.
    pub async fn delete(&self) -> Result<u64> {
        Ok(self.builder.delete().await?)
    }
}

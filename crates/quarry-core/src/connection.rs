//! A single, lazily dialled database connection.
//!
//! The [`Connection`] is an explicitly passed handle: every query builder,
//! schema builder and model borrows it. It owns exactly one physical
//! connection, opened on first use and shared (behind a mutex) by every
//! statement issued through the handle, so all of them also share one
//! transaction scope.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tracing::{debug, warn};

use crate::config::{ConnectionConfig, Driver};
use crate::driver::DriverConnection;
use crate::error::{Error, Result};
use crate::query::QueryBuilder;
use crate::value::SqlValue;

/// A result row: column name to value, in select-list order.
pub type Row = IndexMap<String, SqlValue>;

/// A statement recorded by the query log.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedQuery {
    /// The SQL text sent to the engine.
    pub sql: String,
    /// The bound parameters, in placeholder order.
    pub bindings: Vec<SqlValue>,
    /// Time spent waiting for the engine.
    pub elapsed: Duration,
}

/// A database connection handle.
pub struct Connection {
    config: ConnectionConfig,
    handle: OnceCell<Mutex<DriverConnection>>,
    in_transaction: AtomicBool,
    query_log: Mutex<Option<Vec<LoggedQuery>>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("driver", &self.config.driver)
            .field("database", &self.config.database)
            .field("connected", &self.handle.initialized())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Creates a connection handle. Nothing is dialled until the first statement.
    #[must_use]
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
            in_transaction: AtomicBool::new(false),
            query_log: Mutex::new(None),
        }
    }

    /// Creates a connection handle and dials it immediately.
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        let connection = Self::new(config);
        drop(connection.acquire().await?);
        Ok(connection)
    }

    /// Returns the configuration this connection was built from.
    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Returns the engine this connection talks to.
    #[must_use]
    pub const fn driver(&self) -> Driver {
        self.config.driver
    }

    /// Starts a fluent query against `table`.
    #[must_use]
    pub fn table(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder::new(self, table)
    }

    async fn acquire(&self) -> Result<MutexGuard<'_, DriverConnection>> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                let url = self.config.url()?;
                debug!(driver = %self.config.driver, "Opening database connection");
                let conn = DriverConnection::open(self.config.driver, &url)
                    .await
                    .map_err(|source| Error::Connection {
                        driver: self.config.driver.name(),
                        source,
                    })?;
                Ok::<_, Error>(Mutex::new(conn))
            })
            .await?;
        Ok(handle.lock().await)
    }

    /// Runs a query and returns every row.
    pub async fn select(&self, sql: &str, bindings: &[SqlValue]) -> Result<Vec<Row>> {
        debug!(sql = %sql, bindings = bindings.len(), "Executing query");
        let started = Instant::now();
        let rows = self.acquire().await?.fetch_all(sql, bindings).await?;
        self.record(sql, bindings, started).await;
        Ok(rows)
    }

    /// Runs a statement and returns the number of affected rows.
    pub async fn execute(&self, sql: &str, bindings: &[SqlValue]) -> Result<u64> {
        debug!(sql = %sql, bindings = bindings.len(), "Executing statement");
        let started = Instant::now();
        let result = self.acquire().await?.execute(sql, bindings).await?;
        self.record(sql, bindings, started).await;
        Ok(result.rows_affected)
    }

    /// Runs an insert and returns the key reported by the driver, if any.
    pub async fn insert_returning_id(&self, sql: &str, bindings: &[SqlValue]) -> Result<Option<i64>> {
        debug!(sql = %sql, bindings = bindings.len(), "Executing insert");
        let started = Instant::now();
        let result = self.acquire().await?.execute(sql, bindings).await?;
        self.record(sql, bindings, started).await;
        Ok(result.last_insert_id)
    }

    /// Runs raw SQL without preparing it. The text may hold several statements.
    pub async fn unprepared(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Executing unprepared statement");
        let started = Instant::now();
        self.acquire().await?.execute_raw(sql).await?;
        self.record(sql, &[], started).await;
        Ok(())
    }

    /// Returns whether a transaction is open on this connection.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::SeqCst)
    }

    /// Opens a transaction. Transactions do not nest.
    pub async fn begin_transaction(&self) -> Result<()> {
        if self.in_transaction.swap(true, Ordering::SeqCst) {
            return Err(Error::NestedTransaction);
        }
        let sql = match self.driver() {
            Driver::Mysql => "START TRANSACTION",
            Driver::Postgres | Driver::Sqlite => "BEGIN",
        };
        if let Err(err) = self.unprepared(sql).await {
            self.in_transaction.store(false, Ordering::SeqCst);
            return Err(err);
        }
        Ok(())
    }

    /// Commits the open transaction.
    pub async fn commit(&self) -> Result<()> {
        if !self.in_transaction() {
            return Err(Error::NoActiveTransaction);
        }
        self.unprepared("COMMIT").await?;
        self.in_transaction.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Rolls back the open transaction.
    pub async fn rollback(&self) -> Result<()> {
        if !self.in_transaction() {
            return Err(Error::NoActiveTransaction);
        }
        let result = self.unprepared("ROLLBACK").await;
        self.in_transaction.store(false, Ordering::SeqCst);
        result
    }

    /// Runs `callback` inside a transaction.
    ///
    /// Commits when the callback returns `Ok`; rolls back and hands the
    /// error back when it returns `Err`.
    ///
    /// ```ignore
    /// conn.transaction(|conn| Box::pin(async move {
    ///     conn.table("accounts").where_eq("id", 1).update(&row! { "balance" => 10 }).await?;
    ///     conn.table("ledger").insert(&row! { "account_id" => 1, "amount" => -5 }).await?;
    ///     Ok::<_, quarry_core::Error>(())
    /// })).await?;
    /// ```
    pub async fn transaction<'a, T, E, F>(&'a self, callback: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&'a Self) -> BoxFuture<'a, std::result::Result<T, E>>,
        E: From<Error>,
    {
        self.begin_transaction().await?;
        match callback(self).await {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed transaction also failed");
                }
                Err(err)
            }
        }
    }

    /// Starts recording every statement run through this connection.
    pub async fn enable_query_log(&self) {
        let mut log = self.query_log.lock().await;
        if log.is_none() {
            *log = Some(Vec::new());
        }
    }

    /// Stops recording and discards the log.
    pub async fn disable_query_log(&self) {
        *self.query_log.lock().await = None;
    }

    /// Returns the statements recorded since the log was enabled or flushed.
    pub async fn query_log(&self) -> Vec<LoggedQuery> {
        self.query_log.lock().await.clone().unwrap_or_default()
    }

    /// Clears the recorded statements, keeping the log enabled.
    pub async fn flush_query_log(&self) {
        if let Some(log) = self.query_log.lock().await.as_mut() {
            log.clear();
        }
    }

    async fn record(&self, sql: &str, bindings: &[SqlValue], started: Instant) {
        if let Some(log) = self.query_log.lock().await.as_mut() {
            log.push(LoggedQuery {
                sql: sql.to_string(),
                bindings: bindings.to_vec(),
                elapsed: started.elapsed(),
            });
        }
    }
}

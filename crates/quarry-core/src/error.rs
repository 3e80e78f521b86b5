//! Error types for connections and query execution.

use thiserror::Error;

/// Errors raised by the connection and the query builder.
#[derive(Debug, Error)]
pub enum Error {
    /// The data store could not be reached or rejected the handshake.
    #[error("connection error ({driver}): {source}")]
    Connection {
        /// Driver name from the configuration.
        driver: &'static str,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The configuration cannot be turned into a connection target.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A statement failed inside the engine.
    #[error("failed to execute `{sql}`: {source}")]
    Execution {
        /// The statement that was submitted.
        sql: String,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A column value could not be decoded into a [`crate::SqlValue`].
    #[error("cannot decode column `{column}`: {source}")]
    Decode {
        /// Column name.
        column: String,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// `begin_transaction` was called while a transaction is open.
    #[error("a transaction is already active on this connection")]
    NestedTransaction,

    /// `commit`/`rollback` was called without an open transaction.
    #[error("no active transaction on this connection")]
    NoActiveTransaction,

    /// An operator string is not one of the supported comparison operators.
    #[error("unsupported operator `{0}`")]
    InvalidOperator(String),

    /// The driver did not report a generated key after an insert.
    #[error("insert into `{0}` did not return a generated key")]
    MissingInsertId(String),
}

/// Result type alias for connection and query operations.
pub type Result<T> = std::result::Result<T, Error>;

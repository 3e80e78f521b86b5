//! Error types for the ORM.

use thiserror::Error;

/// ORM-specific errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database error from the connection or query builder.
    #[error("database error: {0}")]
    Database(#[from] quarry_core::Error),

    /// No row matches the requested primary key.
    #[error("no {model} found for key {key}")]
    ModelNotFound {
        /// Model table.
        model: &'static str,
        /// Requested key, rendered as SQL.
        key: String,
    },

    /// An attribute value cannot be converted by its declared cast.
    #[error("cannot cast attribute `{attribute}` to {cast}: {message}")]
    InvalidCast {
        /// Attribute name.
        attribute: String,
        /// Cast name.
        cast: &'static str,
        /// What went wrong.
        message: String,
    },

    /// JSON encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The record has no primary key value to address it by.
    #[error("{model} record has no value for primary key `{key}`")]
    MissingKey {
        /// Model table.
        model: &'static str,
        /// Primary key column.
        key: &'static str,
    },
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;

//! Error types for the migration system.

use std::path::PathBuf;

/// Errors that can occur during migration and seeding operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Database error during migration execution.
    #[error("Database error: {0}")]
    Database(#[from] quarry_core::Error),

    /// IO error (reading/writing migration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A migration name does not follow `<YYYYMMDDHHMMSS>_<snake_case>`.
    #[error("Invalid migration name '{0}': expected <YYYYMMDDHHMMSS>_<snake_case>")]
    InvalidMigrationName(String),

    /// Two migrations were registered under the same name.
    #[error("Migration '{0}' is registered more than once")]
    DuplicateMigration(String),

    /// Migration not found.
    #[error("Migration not found: {name} (known: {})", .available.join(", "))]
    MigrationNotFound {
        /// Requested or recorded migration name.
        name: String,
        /// Names of the known migrations.
        available: Vec<String>,
    },

    /// Failed to parse migration file.
    #[error("Failed to parse migration file '{path}': {message}")]
    ParseError {
        /// Path to the migration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Migration file already exists.
    #[error("Migration file already exists: {0}")]
    MigrationExists(PathBuf),

    /// No migrations directory found.
    #[error("Migrations directory not found: {0}")]
    MigrationsDirNotFound(PathBuf),

    /// Seeder not found.
    #[error("Seeder not found: {name} (known: {})", .available.join(", "))]
    SeederNotFound {
        /// Requested seeder name.
        name: String,
        /// Names of the registered seeders.
        available: Vec<String>,
    },

    /// A seeder failed.
    #[error("Seeder '{name}' failed: {source}")]
    Seeder {
        /// Seeder name.
        name: String,
        /// What went wrong.
        #[source]
        source: Box<MigrateError>,
    },
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

//! Versioned schema migrations and seeders.
//!
//! `quarry-migrate` runs named, reversible schema changes in a fixed order
//! and records each applied one in a ledger table, so that:
//! - a migration is applied at most once per database
//! - rollbacks undo migrations newest-first
//! - a failure stops the run, leaving earlier migrations applied
//!
//! # Architecture
//!
//! - **Migration** - A named `up`/`down` pair filling a [`SchemaPlan`]
//! - **SqlMigration** - A migration read from a `.sql` file
//! - **Ledger** - The `migrations` table of applied names
//! - **Migrator** - Applies, rolls back and reports migrations
//! - **SeederRunner** - Runs data seeders, untracked
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry_migrate::prelude::*;
//!
//! struct CreateUsers;
//!
//! impl Migration for CreateUsers {
//!     fn name(&self) -> &str {
//!         "20240101000000_create_users"
//!     }
//!
//!     fn up(&self, schema: &mut SchemaPlan) {
//!         schema.create("users", |t| {
//!             t.id();
//!             t.string("email", 255).unique();
//!         });
//!     }
//!
//!     fn down(&self, schema: &mut SchemaPlan) {
//!         schema.drop_if_exists("users");
//!     }
//! }
//!
//! let mut migrator = Migrator::new(&conn);
//! migrator.register(CreateUsers)?;
//! migrator.migrate().await?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Create a new SQL migration
//! quarry-migrate make "create users"
//!
//! # Apply pending migrations
//! quarry-migrate migrate
//!
//! # Show migration status
//! quarry-migrate status
//!
//! # Rollback the last migration
//! quarry-migrate rollback --steps 1
//! ```

pub mod error;
pub mod ledger;
pub mod migration;
pub mod migrator;
pub mod seeder;
pub mod sql_migration;

pub use error::{MigrateError, Result};
pub use ledger::{Ledger, LedgerEntry, LEDGER_TABLE};
pub use migration::{is_valid_name, timestamped_name, validate_name, Migration};
pub use migrator::{Direction, MigrationOutcome, MigrationStatus, Migrator};
pub use quarry_schema::SchemaPlan;
pub use seeder::{Seeder, SeederRunner};
pub use sql_migration::{create_file, discover, SqlMigration};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{MigrateError, Result};
    pub use crate::migration::Migration;
    pub use crate::migrator::{MigrationOutcome, MigrationStatus, Migrator};
    pub use crate::seeder::{Seeder, SeederRunner};
    pub use crate::sql_migration::SqlMigration;
    pub use quarry_schema::{Blueprint, SchemaPlan};
}

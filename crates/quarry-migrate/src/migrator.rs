//! Migration runner.
//!
//! This module applies and rolls back registered migrations against a
//! connection, recording progress in the ledger.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;
use quarry_core::{Connection, Driver};
use quarry_schema::{Schema, SchemaPlan};
use tracing::{info, warn};

use crate::error::{MigrateError, Result};
use crate::ledger::Ledger;
use crate::migration::{validate_name, Migration};
use crate::sql_migration::discover;

/// Direction a migration is run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Forward (`up`).
    Up,
    /// Reverse (`down`).
    Down,
}

/// What happened to one migration during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The migration was applied and logged.
    Applied(String),
    /// The migration was undone and removed from the ledger.
    RolledBack(String),
    /// Nothing to do: already applied, or not applied when rolling back.
    Skipped(String),
}

impl MigrationOutcome {
    /// Returns the migration name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Applied(name) | Self::RolledBack(name) | Self::Skipped(name) => name,
        }
    }
}

/// Ledger state of one known migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Migration name.
    pub name: String,
    /// Whether a ledger row exists.
    pub applied: bool,
    /// When the migration was applied.
    pub executed_at: Option<NaiveDateTime>,
}

/// Applies and rolls back migrations, tracking them in the ledger.
///
/// ```ignore
/// let mut migrator = Migrator::new(&conn);
/// migrator.register(CreateUsers)?;
/// migrator.load_directory(Path::new("migrations"))?;
/// for outcome in migrator.migrate().await? {
///     println!("{outcome:?}");
/// }
/// ```
pub struct Migrator<'c> {
    conn: &'c Connection,
    ledger: Ledger<'c>,
    migrations: BTreeMap<String, Box<dyn Migration>>,
}

impl fmt::Debug for Migrator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("ledger", &self.ledger)
            .field("migrations", &self.migrations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'c> Migrator<'c> {
    /// Creates a migrator with no registered migrations.
    #[must_use]
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            ledger: Ledger::new(conn),
            migrations: BTreeMap::new(),
        }
    }

    /// Uses a custom ledger table instead of `migrations`.
    #[must_use]
    pub fn with_ledger_table(mut self, table: impl Into<String>) -> Self {
        self.ledger = Ledger::with_table(self.conn, table);
        self
    }

    /// Returns the ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger<'c> {
        &self.ledger
    }

    /// Registers a migration.
    pub fn register(&mut self, migration: impl Migration + 'static) -> Result<&mut Self> {
        self.register_boxed(Box::new(migration))
    }

    /// Registers a boxed migration.
    pub fn register_boxed(&mut self, migration: Box<dyn Migration>) -> Result<&mut Self> {
        let name = migration.name().to_string();
        validate_name(&name)?;
        if self.migrations.contains_key(&name) {
            return Err(MigrateError::DuplicateMigration(name));
        }
        self.migrations.insert(name, migration);
        Ok(self)
    }

    /// Registers every SQL migration file in `dir`. Returns how many were
    /// found.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        let found = discover(dir)?;
        let count = found.len();
        for migration in found {
            self.register(migration)?;
        }
        Ok(count)
    }

    /// Returns the names of the registered migrations, in run order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.migrations.keys().cloned().collect()
    }

    fn find(&self, name: &str) -> Result<&dyn Migration> {
        self.migrations
            .get(name)
            .map(|migration| &**migration)
            .ok_or_else(|| MigrateError::MigrationNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Returns the names of the registered migrations without a ledger row.
    pub async fn pending(&self) -> Result<Vec<String>> {
        self.ledger.ensure_table().await?;
        let applied = self.ledger.applied().await?;
        Ok(self
            .migrations
            .keys()
            .filter(|name| !applied.contains(name))
            .cloned()
            .collect())
    }

    /// Applies every pending migration in name order. Stops at the first
    /// failure; migrations applied before it stay applied.
    pub async fn migrate(&self) -> Result<Vec<MigrationOutcome>> {
        let pending = self.pending().await?;
        if pending.is_empty() {
            info!("Nothing to migrate");
        }
        let mut outcomes = Vec::with_capacity(pending.len());
        for name in &pending {
            outcomes.push(self.up(name).await?);
        }
        Ok(outcomes)
    }

    /// Undoes the `steps` most recently named applied migrations.
    pub async fn rollback(&self, steps: usize) -> Result<Vec<MigrationOutcome>> {
        self.ledger.ensure_table().await?;
        let applied = self.ledger.applied().await?;
        let mut outcomes = Vec::new();
        for name in applied.iter().rev().take(steps) {
            outcomes.push(self.down(name).await?);
        }
        if outcomes.is_empty() {
            info!("Nothing to roll back");
        }
        Ok(outcomes)
    }

    /// Undoes every applied migration.
    pub async fn rollback_all(&self) -> Result<Vec<MigrationOutcome>> {
        self.rollback(usize::MAX).await
    }

    /// Undoes every applied migration, then applies all of them again.
    pub async fn refresh(&self) -> Result<Vec<MigrationOutcome>> {
        let mut outcomes = self.rollback_all().await?;
        outcomes.extend(self.migrate().await?);
        Ok(outcomes)
    }

    /// Reports the ledger state of every registered migration.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>> {
        self.ledger.ensure_table().await?;
        let entries = self.ledger.entries().await?;
        Ok(self
            .migrations
            .keys()
            .map(|name| {
                let entry = entries.iter().find(|entry| &entry.migration == name);
                MigrationStatus {
                    name: name.clone(),
                    applied: entry.is_some(),
                    executed_at: entry.and_then(|entry| entry.executed_at),
                }
            })
            .collect())
    }

    /// Applies one migration by name.
    pub async fn up(&self, name: &str) -> Result<MigrationOutcome> {
        let migration = self.find(name)?;
        self.ledger.ensure_table().await?;
        if self.ledger.is_applied(name).await? {
            warn!(migration = %name, "Migration already applied, skipping");
            return Ok(MigrationOutcome::Skipped(name.to_string()));
        }
        info!(migration = %name, "Applying migration");
        self.run(migration, Direction::Up).await?;
        info!(migration = %name, "Migration applied successfully");
        Ok(MigrationOutcome::Applied(name.to_string()))
    }

    /// Rolls back one migration by name.
    pub async fn down(&self, name: &str) -> Result<MigrationOutcome> {
        let migration = self.find(name)?;
        self.ledger.ensure_table().await?;
        if !self.ledger.is_applied(name).await? {
            warn!(migration = %name, "Migration not applied, skipping rollback");
            return Ok(MigrationOutcome::Skipped(name.to_string()));
        }
        info!(migration = %name, "Rolling back migration");
        self.run(migration, Direction::Down).await?;
        info!(migration = %name, "Migration rolled back successfully");
        Ok(MigrationOutcome::RolledBack(name.to_string()))
    }

    /// Generates the forward SQL for a migration without executing it.
    pub fn sql_for(&self, name: &str) -> Result<Vec<String>> {
        self.compile(name, Direction::Up)
    }

    /// Generates the reverse SQL for a migration without executing it.
    pub fn rollback_sql_for(&self, name: &str) -> Result<Vec<String>> {
        self.compile(name, Direction::Down)
    }

    fn compile(&self, name: &str, direction: Direction) -> Result<Vec<String>> {
        let plan = plan_for(self.find(name)?, direction);
        Ok(Schema::new(self.conn).to_sql(&plan))
    }

    async fn run(&self, migration: &dyn Migration, direction: Direction) -> Result<()> {
        let transactional = migration.within_transaction()
            && self.conn.driver() != Driver::Mysql
            && !self.conn.in_transaction();
        if !transactional {
            return self.execute(migration, direction).await;
        }

        self.conn.begin_transaction().await?;
        match self.execute(migration, direction).await {
            Ok(()) => {
                self.conn.commit().await?;
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = self.conn.rollback().await {
                    warn!(
                        migration = %migration.name(),
                        error = %rollback_err,
                        "Rollback after failed migration also failed"
                    );
                }
                Err(err)
            }
        }
    }

    async fn execute(&self, migration: &dyn Migration, direction: Direction) -> Result<()> {
        let plan = plan_for(migration, direction);
        Schema::new(self.conn).run(&plan).await?;
        match direction {
            Direction::Up => self.ledger.log(migration.name()).await,
            Direction::Down => self.ledger.delete(migration.name()).await,
        }
    }
}

fn plan_for(migration: &dyn Migration, direction: Direction) -> SchemaPlan {
    let mut plan = SchemaPlan::new();
    match direction {
        Direction::Up => migration.up(&mut plan),
        Direction::Down => migration.down(&mut plan),
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_migration::SqlMigration;
    use quarry_core::ConnectionConfig;

    fn sql(name: &str, up: &str, down: &str) -> SqlMigration {
        SqlMigration::new(name, up, down)
    }

    #[test]
    fn test_register_rejects_duplicates_and_bad_names() {
        let conn = Connection::new(ConnectionConfig::sqlite(":memory:"));
        let mut migrator = Migrator::new(&conn);
        migrator
            .register(sql("20240101000000_a", "SELECT 1", ""))
            .unwrap();
        assert!(matches!(
            migrator.register(sql("20240101000000_a", "SELECT 1", "")),
            Err(MigrateError::DuplicateMigration(name)) if name == "20240101000000_a"
        ));
        assert!(matches!(
            migrator.register(sql("a", "SELECT 1", "")),
            Err(MigrateError::InvalidMigrationName(_))
        ));
    }

    #[test]
    fn test_names_are_sorted() {
        let conn = Connection::new(ConnectionConfig::sqlite(":memory:"));
        let mut migrator = Migrator::new(&conn);
        migrator
            .register(sql("20240102000000_b", "", ""))
            .unwrap()
            .register(sql("20240101000000_a", "", ""))
            .unwrap();
        assert_eq!(
            migrator.names(),
            vec!["20240101000000_a", "20240102000000_b"]
        );
    }

    #[test]
    fn test_sql_for_unknown_lists_known() {
        let conn = Connection::new(ConnectionConfig::sqlite(":memory:"));
        let mut migrator = Migrator::new(&conn);
        migrator
            .register(sql("20240101000000_a", "CREATE TABLE a (id INTEGER)", "DROP TABLE a"))
            .unwrap();
        assert_eq!(
            migrator.sql_for("20240101000000_a").unwrap(),
            vec!["CREATE TABLE a (id INTEGER)"]
        );
        assert_eq!(
            migrator.rollback_sql_for("20240101000000_a").unwrap(),
            vec!["DROP TABLE a"]
        );
        match migrator.sql_for("20240109000000_missing") {
            Err(MigrateError::MigrationNotFound { name, available }) => {
                assert_eq!(name, "20240109000000_missing");
                assert_eq!(available, vec!["20240101000000_a"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

//! Database seeders.
//!
//! Seeders fill tables with data. They run in registration order and are
//! not recorded in the ledger, so running them twice inserts twice.

use std::fmt;

use futures::future::BoxFuture;
use quarry_core::Connection;
use tracing::info;

use crate::error::{MigrateError, Result};

/// A named data loader.
///
/// ```rust
/// use futures::future::BoxFuture;
/// use quarry_core::{row, Connection};
/// use quarry_migrate::{Result, Seeder};
///
/// struct Roles;
///
/// impl Seeder for Roles {
///     fn name(&self) -> &str {
///         "roles"
///     }
///
///     fn run<'a>(&'a self, conn: &'a Connection) -> BoxFuture<'a, Result<()>> {
///         Box::pin(async move {
///             conn.table("roles").insert(&row! { "name" => "admin" }).await?;
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Seeder: Send + Sync {
    /// Name used to run the seeder on its own.
    fn name(&self) -> &str;

    /// Inserts the seed data.
    fn run<'a>(&'a self, conn: &'a Connection) -> BoxFuture<'a, Result<()>>;
}

/// Runs registered seeders.
#[derive(Default)]
pub struct SeederRunner {
    seeders: Vec<Box<dyn Seeder>>,
}

impl fmt::Debug for SeederRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeederRunner")
            .field("seeders", &self.names())
            .finish()
    }
}

impl SeederRunner {
    /// Creates a runner with no seeders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a seeder.
    pub fn register(&mut self, seeder: impl Seeder + 'static) -> &mut Self {
        self.seeders.push(Box::new(seeder));
        self
    }

    /// Returns the seeder names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.seeders.iter().map(|s| s.name().to_string()).collect()
    }

    /// Runs every seeder in registration order. Stops at the first failure.
    pub async fn run_all(&self, conn: &Connection) -> Result<usize> {
        for seeder in &self.seeders {
            run_one(seeder.as_ref(), conn).await?;
        }
        Ok(self.seeders.len())
    }

    /// Runs a single seeder by name.
    pub async fn run(&self, conn: &Connection, name: &str) -> Result<()> {
        let seeder = self
            .seeders
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| MigrateError::SeederNotFound {
                name: name.to_string(),
                available: self.names(),
            })?;
        run_one(seeder.as_ref(), conn).await
    }
}

async fn run_one(seeder: &dyn Seeder, conn: &Connection) -> Result<()> {
    info!(seeder = %seeder.name(), "Seeding");
    seeder
        .run(conn)
        .await
        .map_err(|source| MigrateError::Seeder {
            name: seeder.name().to_string(),
            source: Box::new(source),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{row, ConnectionConfig};

    struct Insert(&'static str);

    impl Seeder for Insert {
        fn name(&self) -> &str {
            self.0
        }

        fn run<'a>(&'a self, conn: &'a Connection) -> BoxFuture<'a, Result<()>> {
            Box::pin(async move {
                conn.table("seeded")
                    .insert(&row! { "name" => self.0 })
                    .await?;
                Ok(())
            })
        }
    }

    async fn seeded() -> Connection {
        let conn = Connection::new(ConnectionConfig::sqlite(":memory:"));
        conn.unprepared("CREATE TABLE seeded (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
            .await
            .unwrap();
        conn
    }

    #[tokio::test]
    async fn test_run_all_in_order() {
        let conn = seeded().await;
        let mut runner = SeederRunner::new();
        runner.register(Insert("first")).register(Insert("second"));
        assert_eq!(runner.run_all(&conn).await.unwrap(), 2);

        let names = conn
            .table("seeded")
            .order_by("id", quarry_core::OrderDirection::Asc)
            .pluck("name")
            .await
            .unwrap();
        assert_eq!(
            names,
            vec![
                quarry_core::SqlValue::Text("first".into()),
                quarry_core::SqlValue::Text("second".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_run_by_name() {
        let conn = seeded().await;
        let mut runner = SeederRunner::new();
        runner.register(Insert("first")).register(Insert("second"));
        runner.run(&conn, "second").await.unwrap();
        assert_eq!(conn.table("seeded").count().await.unwrap(), 1);

        match runner.run(&conn, "third").await {
            Err(MigrateError::SeederNotFound { name, available }) => {
                assert_eq!(name, "third");
                assert_eq!(available, vec!["first", "second"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_is_wrapped_with_seeder_name() {
        let conn = Connection::new(ConnectionConfig::sqlite(":memory:"));
        let mut runner = SeederRunner::new();
        runner.register(Insert("orphan"));
        let err = runner.run_all(&conn).await.unwrap_err();
        assert!(matches!(err, MigrateError::Seeder { ref name, .. } if name == "orphan"));
    }
}

//! Migration ledger.
//!
//! This module manages the `migrations` table that records which migrations
//! have been applied to the database.

use chrono::{NaiveDateTime, Utc};
use quarry_core::{row, Connection, OrderDirection, Row, SqlValue, DATETIME_FORMAT};
use quarry_schema::Schema;

use crate::error::Result;

/// Default ledger table name.
pub const LEDGER_TABLE: &str = "migrations";

/// A record of an applied migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Unique ID in the ledger table.
    pub id: i64,
    /// Migration name.
    pub migration: String,
    /// When the migration was applied.
    pub executed_at: Option<NaiveDateTime>,
}

impl LedgerEntry {
    fn from_row(row: &Row) -> Option<Self> {
        let migration = row.get("migration")?.as_str()?.to_string();
        let id = row.get("id").and_then(SqlValue::as_i64).unwrap_or_default();
        let executed_at = row.get("executed_at").and_then(|value| match value {
            SqlValue::DateTime(dt) => Some(*dt),
            SqlValue::Text(text) => NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).ok(),
            _ => None,
        });
        Some(Self {
            id,
            migration,
            executed_at,
        })
    }
}

/// Reads and writes the ledger table.
#[derive(Debug)]
pub struct Ledger<'c> {
    conn: &'c Connection,
    table: String,
}

impl<'c> Ledger<'c> {
    /// Creates a ledger backed by the default `migrations` table.
    #[must_use]
    pub fn new(conn: &'c Connection) -> Self {
        Self::with_table(conn, LEDGER_TABLE)
    }

    /// Creates a ledger backed by a custom table.
    #[must_use]
    pub fn with_table(conn: &'c Connection, table: impl Into<String>) -> Self {
        Self {
            conn,
            table: table.into(),
        }
    }

    /// Returns the ledger table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Ensures the ledger table exists.
    pub async fn ensure_table(&self) -> Result<()> {
        Schema::new(self.conn)
            .create_if_not_exists(&self.table, |t| {
                t.increments("id");
                t.string("migration", 255);
                t.timestamp("executed_at").nullable();
            })
            .await?;
        Ok(())
    }

    /// Gets every applied migration, ordered by name.
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        let rows = self
            .conn
            .table(&self.table)
            .order_by("migration", OrderDirection::Asc)
            .get()
            .await?;
        Ok(rows.iter().filter_map(LedgerEntry::from_row).collect())
    }

    /// Gets the names of every applied migration, ordered by name.
    pub async fn applied(&self) -> Result<Vec<String>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .map(|entry| entry.migration)
            .collect())
    }

    /// Checks if a migration has been applied.
    pub async fn is_applied(&self, name: &str) -> Result<bool> {
        Ok(self
            .conn
            .table(&self.table)
            .where_eq("migration", name)
            .exists()
            .await?)
    }

    /// Records a migration as applied.
    pub async fn log(&self, name: &str) -> Result<()> {
        self.conn
            .table(&self.table)
            .insert(&row! {
                "migration" => name,
                "executed_at" => Utc::now().naive_utc(),
            })
            .await?;
        Ok(())
    }

    /// Removes a migration record (for rollback).
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.conn
            .table(&self.table)
            .where_eq("migration", name)
            .delete()
            .await?;
        Ok(())
    }

    /// Counts applied migrations.
    pub async fn count(&self) -> Result<i64> {
        Ok(self.conn.table(&self.table).count().await?)
    }
}

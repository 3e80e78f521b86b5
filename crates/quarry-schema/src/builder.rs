//! Schema builder: compiles blueprints with the connection's grammar and
//! executes the resulting DDL.

use std::fmt;

use quarry_core::{Connection, Result, SqlValue};
use tracing::debug;

use crate::blueprint::Blueprint;
use crate::grammar::{grammar_for, Operation, SchemaGrammar};
use crate::plan::{SchemaOperation, SchemaPlan};

/// Schema operations against one connection.
///
/// ```ignore
/// let schema = Schema::new(&conn);
/// schema
///     .create("widgets", |t| {
///         t.id();
///         t.string("name", 255);
///         t.timestamps();
///     })
///     .await?;
/// assert!(schema.has_column("widgets", "name").await?);
/// ```
pub struct Schema<'c> {
    conn: &'c Connection,
    grammar: Box<dyn SchemaGrammar>,
}

impl fmt::Debug for Schema<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("conn", &self.conn)
            .field("grammar", &self.grammar.name())
            .finish()
    }
}

impl<'c> Schema<'c> {
    /// Creates a schema builder using the grammar of the connection's driver.
    #[must_use]
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            grammar: grammar_for(conn.driver()),
        }
    }

    /// Returns the grammar in use.
    #[must_use]
    pub fn grammar(&self) -> &dyn SchemaGrammar {
        self.grammar.as_ref()
    }

    /// Compiles and runs a blueprint. Statements run in order; the first
    /// failure aborts.
    pub async fn build(&self, blueprint: &Blueprint, operation: Operation) -> Result<()> {
        let statements = self.grammar.compile(blueprint, operation);
        self.execute_all(&statements).await
    }

    async fn execute_all(&self, statements: &[String]) -> Result<()> {
        for sql in statements {
            self.conn.unprepared(sql).await?;
        }
        Ok(())
    }

    /// Creates a table.
    pub async fn create(&self, table: &str, build: impl FnOnce(&mut Blueprint)) -> Result<()> {
        debug!(table = %table, "Creating table");
        let mut blueprint = Blueprint::new(table);
        build(&mut blueprint);
        self.build(&blueprint, Operation::Create).await
    }

    /// Creates a table unless it already exists.
    pub async fn create_if_not_exists(
        &self,
        table: &str,
        build: impl FnOnce(&mut Blueprint),
    ) -> Result<()> {
        if self.has_table(table).await? {
            debug!(table = %table, "Table already exists, skipping create");
            return Ok(());
        }
        self.create(table, build).await
    }

    /// Alters an existing table.
    pub async fn table(&self, table: &str, build: impl FnOnce(&mut Blueprint)) -> Result<()> {
        debug!(table = %table, "Altering table");
        let mut blueprint = Blueprint::new(table);
        build(&mut blueprint);
        self.build(&blueprint, Operation::Alter).await
    }

    /// Drops a table.
    pub async fn drop(&self, table: &str) -> Result<()> {
        self.table(table, |t| {
            t.drop();
        })
        .await
    }

    /// Drops a table if it exists.
    pub async fn drop_if_exists(&self, table: &str) -> Result<()> {
        self.table(table, |t| {
            t.drop_if_exists();
        })
        .await
    }

    /// Renames a table.
    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.table(from, |t| {
            t.rename(to);
        })
        .await
    }

    /// Returns whether a table exists.
    pub async fn has_table(&self, table: &str) -> Result<bool> {
        let (sql, bindings) = self.grammar.compile_table_exists(table);
        let rows = self.conn.select(&sql, &bindings).await?;
        let count = rows
            .first()
            .and_then(|row| row.values().next())
            .and_then(SqlValue::as_i64)
            .unwrap_or(0);
        Ok(count > 0)
    }

    /// Lists the columns of a table, in table order.
    pub async fn column_listing(&self, table: &str) -> Result<Vec<String>> {
        let (sql, bindings) = self.grammar.compile_column_listing(table);
        let rows = self.conn.select(&sql, &bindings).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("column_name").and_then(SqlValue::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Returns whether a table has a column (case-insensitive).
    pub async fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        self.has_columns(table, &[column]).await
    }

    /// Returns whether a table has every one of `columns` (case-insensitive).
    pub async fn has_columns(&self, table: &str, columns: &[&str]) -> Result<bool> {
        let existing: Vec<String> = self
            .column_listing(table)
            .await?
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
        Ok(columns
            .iter()
            .all(|c| existing.contains(&c.to_lowercase())))
    }

    /// Turns foreign key enforcement on.
    pub async fn enable_foreign_key_constraints(&self) -> Result<()> {
        self.conn
            .unprepared(&self.grammar.compile_enable_foreign_keys())
            .await
    }

    /// Turns foreign key enforcement off.
    pub async fn disable_foreign_key_constraints(&self) -> Result<()> {
        self.conn
            .unprepared(&self.grammar.compile_disable_foreign_keys())
            .await
    }

    /// Compiles a plan without running it.
    #[must_use]
    pub fn to_sql(&self, plan: &SchemaPlan) -> Vec<String> {
        plan.operations()
            .iter()
            .flat_map(|operation| self.compile_operation(operation))
            .collect()
    }

    fn compile_operation(&self, operation: &SchemaOperation) -> Vec<String> {
        match operation {
            SchemaOperation::Create(blueprint) => {
                self.grammar.compile(blueprint, Operation::Create)
            }
            SchemaOperation::Alter(blueprint) => self.grammar.compile(blueprint, Operation::Alter),
            SchemaOperation::Drop(table) => {
                let mut blueprint = Blueprint::new(table.as_str());
                blueprint.drop();
                self.grammar.compile(&blueprint, Operation::Alter)
            }
            SchemaOperation::DropIfExists(table) => {
                let mut blueprint = Blueprint::new(table.as_str());
                blueprint.drop_if_exists();
                self.grammar.compile(&blueprint, Operation::Alter)
            }
            SchemaOperation::Rename { from, to } => {
                let mut blueprint = Blueprint::new(from.as_str());
                blueprint.rename(to);
                self.grammar.compile(&blueprint, Operation::Alter)
            }
            SchemaOperation::Raw(sql) => vec![sql.clone()],
        }
    }

    /// Runs every operation of a plan in order.
    pub async fn run(&self, plan: &SchemaPlan) -> Result<()> {
        for operation in plan.operations() {
            let statements = self.compile_operation(operation);
            self.execute_all(&statements).await?;
        }
        Ok(())
    }
}

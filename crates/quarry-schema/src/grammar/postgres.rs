//! PostgreSQL grammar.

use quarry_core::{Driver, SqlValue};

use super::{nullable_modifier, SchemaGrammar};
use crate::blueprint::Blueprint;
use crate::column::{ColumnDefinition, ColumnType};
use crate::command::Command;

/// PostgreSQL grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresGrammar;

impl PostgresGrammar {
    /// Creates a new PostgreSQL grammar.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn alter(&self, blueprint: &Blueprint, clause: &str) -> Vec<String> {
        vec![format!(
            "ALTER TABLE {} {clause}",
            self.quote_identifier(blueprint.table())
        )]
    }
}

impl SchemaGrammar for PostgresGrammar {
    fn name(&self) -> &'static str {
        "pgsql"
    }

    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    fn type_sql(&self, column: &ColumnDefinition) -> String {
        // PostgreSQL uses SERIAL types for auto-increment
        if column.auto_increment {
            match column.column_type {
                ColumnType::TinyInteger | ColumnType::SmallInteger => {
                    return "SMALLSERIAL".to_string()
                }
                ColumnType::Integer => return "SERIAL".to_string(),
                ColumnType::BigInteger => return "BIGSERIAL".to_string(),
                _ => {}
            }
        }
        match &column.column_type {
            ColumnType::Char(length) => format!("CHAR({length})"),
            ColumnType::String(length) => format!("VARCHAR({length})"),
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText => {
                "TEXT".to_string()
            }
            ColumnType::TinyInteger | ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Float => "REAL".to_string(),
            ColumnType::Double => "DOUBLE PRECISION".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision}, {scale})"),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Enum(_) => "VARCHAR(255)".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Jsonb => "JSONB".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime | ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Binary => "BYTEA".to_string(),
            ColumnType::Uuid => "UUID".to_string(),
        }
    }

    fn modifiers(&self, column: &ColumnDefinition) -> String {
        let mut sql = String::new();
        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" COLLATE {}", self.quote_identifier(collation)));
        }
        sql.push_str(nullable_modifier(column));
        sql.push_str(&self.default_modifier(column));
        sql.push_str(self.increment_modifier(column));
        sql
    }

    fn increment_modifier(&self, column: &ColumnDefinition) -> &'static str {
        if column.auto_increment {
            " PRIMARY KEY"
        } else {
            ""
        }
    }

    fn render_bool(&self, value: bool) -> String {
        String::from(if value { "TRUE" } else { "FALSE" })
    }

    fn comment_statements(&self, blueprint: &Blueprint) -> Vec<String> {
        blueprint
            .columns()
            .iter()
            .filter_map(|column| {
                column.comment.as_ref().map(|comment| {
                    format!(
                        "COMMENT ON COLUMN {}.{} IS {}",
                        self.quote_identifier(blueprint.table()),
                        self.quote_identifier(&column.name),
                        SqlValue::Text(comment.clone()).to_sql_inline()
                    )
                })
            })
            .collect()
    }

    fn inline_command(&self, _blueprint: &Blueprint, command: &Command) -> Option<String> {
        match command {
            Command::Primary(index) => {
                Some(format!("PRIMARY KEY ({})", self.quote_columns(&index.columns)))
            }
            Command::Unique(index) => Some(format!(
                "CONSTRAINT {} UNIQUE ({})",
                self.quote_identifier(&index.name),
                self.quote_columns(&index.columns)
            )),
            Command::Foreign(foreign) => Some(format!(
                "CONSTRAINT {} {}",
                self.quote_identifier(&foreign.name),
                self.foreign_key_clause(foreign)
            )),
            _ => None,
        }
    }

    fn compile_command(&self, blueprint: &Blueprint, command: &Command) -> Vec<String> {
        let table = self.quote_identifier(blueprint.table());
        match command {
            Command::Primary(index) => self.alter(
                blueprint,
                &format!("ADD PRIMARY KEY ({})", self.quote_columns(&index.columns)),
            ),
            Command::Unique(index) => self.alter(
                blueprint,
                &format!(
                    "ADD CONSTRAINT {} UNIQUE ({})",
                    self.quote_identifier(&index.name),
                    self.quote_columns(&index.columns)
                ),
            ),
            Command::Index(index) => vec![format!(
                "CREATE INDEX {} ON {table} ({})",
                self.quote_identifier(&index.name),
                self.quote_columns(&index.columns)
            )],
            Command::Foreign(foreign) => self.alter(
                blueprint,
                &format!(
                    "ADD CONSTRAINT {} {}",
                    self.quote_identifier(&foreign.name),
                    self.foreign_key_clause(foreign)
                ),
            ),
            Command::DropColumn(columns) => {
                let drops: Vec<String> = columns
                    .iter()
                    .map(|c| format!("DROP COLUMN {}", self.quote_identifier(c)))
                    .collect();
                self.alter(blueprint, &drops.join(", "))
            }
            Command::DropPrimary(name) | Command::DropUnique(name) | Command::DropForeign(name) => {
                self.alter(
                    blueprint,
                    &format!("DROP CONSTRAINT {}", self.quote_identifier(name)),
                )
            }
            Command::DropIndex(name) => {
                vec![format!("DROP INDEX {}", self.quote_identifier(name))]
            }
            Command::RenameColumn { from, to } => self.alter(
                blueprint,
                &format!(
                    "RENAME COLUMN {} TO {}",
                    self.quote_identifier(from),
                    self.quote_identifier(to)
                ),
            ),
            Command::RenameIndex { from, to } => vec![format!(
                "ALTER INDEX {} RENAME TO {}",
                self.quote_identifier(from),
                self.quote_identifier(to)
            )],
            Command::Rename(to) => {
                self.alter(blueprint, &format!("RENAME TO {}", self.quote_identifier(to)))
            }
            Command::Drop => vec![format!("DROP TABLE {table}")],
            Command::DropIfExists => vec![format!("DROP TABLE IF EXISTS {table}")],
        }
    }

    fn compile_table_exists(&self, table: &str) -> (String, Vec<SqlValue>) {
        (
            String::from(
                "SELECT COUNT(*) AS aggregate FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1 \
                 AND table_type = 'BASE TABLE'",
            ),
            vec![SqlValue::Text(table.to_string())],
        )
    }

    fn compile_column_listing(&self, table: &str) -> (String, Vec<SqlValue>) {
        (
            String::from(
                "SELECT column_name::text AS column_name FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = $1 \
                 ORDER BY ordinal_position",
            ),
            vec![SqlValue::Text(table.to_string())],
        )
    }

    fn compile_enable_foreign_keys(&self) -> String {
        String::from("SET CONSTRAINTS ALL IMMEDIATE")
    }

    fn compile_disable_foreign_keys(&self) -> String {
        String::from("SET CONSTRAINTS ALL DEFERRED")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Operation;

    #[test]
    fn test_create_emits_trailing_indexes_and_comments() {
        let mut table = Blueprint::new("events");
        table.big_increments("id");
        table.string("kind", 40).index();
        table.jsonb("payload").comment("raw body");
        table.uuid("token").unique();

        let statements = PostgresGrammar::new().compile(&table, Operation::Create);
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE \"events\" (\"id\" BIGSERIAL NOT NULL PRIMARY KEY, \
                 \"kind\" VARCHAR(40) NOT NULL, \"payload\" JSONB NOT NULL, \
                 \"token\" UUID NOT NULL, \
                 CONSTRAINT \"events_token_unique\" UNIQUE (\"token\"))",
                "CREATE INDEX \"events_kind_index\" ON \"events\" (\"kind\")",
                "COMMENT ON COLUMN \"events\".\"payload\" IS 'raw body'",
            ]
        );
    }

    #[test]
    fn test_small_increments_use_smallserial() {
        let mut table = Blueprint::new("t");
        table.small_increments("id");
        assert_eq!(PostgresGrammar::new().type_sql(&table.columns()[0]), "SMALLSERIAL");
    }

    #[test]
    fn test_drop_commands() {
        let mut table = Blueprint::new("users");
        table
            .drop_primary()
            .drop_index("users_name_index")
            .rename_index("a", "b")
            .rename("people")
            .drop_if_exists();
        assert_eq!(
            PostgresGrammar::new().compile(&table, Operation::Alter),
            vec![
                "ALTER TABLE \"users\" DROP CONSTRAINT \"users_pkey\"",
                "DROP INDEX \"users_name_index\"",
                "ALTER INDEX \"a\" RENAME TO \"b\"",
                "ALTER TABLE \"users\" RENAME TO \"people\"",
                "DROP TABLE IF EXISTS \"users\"",
            ]
        );
    }

    #[test]
    fn test_introspection_uses_numbered_placeholder() {
        let (sql, bindings) = PostgresGrammar::new().compile_column_listing("users");
        assert!(sql.contains("table_name = $1"));
        assert_eq!(bindings.len(), 1);
    }
}

//! SQLite grammar.

use quarry_core::{Driver, SqlValue};

use super::SchemaGrammar;
use crate::blueprint::Blueprint;
use crate::column::{ColumnDefinition, ColumnType};
use crate::command::Command;

/// SQLite grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteGrammar;

impl SqliteGrammar {
    /// Creates a new SQLite grammar.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SchemaGrammar for SqliteGrammar {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn driver(&self) -> Driver {
        Driver::Sqlite
    }

    fn type_sql(&self, column: &ColumnDefinition) -> String {
        // SQLite has dynamic typing with type affinity; dates are stored as text
        match &column.column_type {
            ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Enum(_) => {
                "VARCHAR".to_string()
            }
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText => {
                "TEXT".to_string()
            }
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger => "INTEGER".to_string(),
            ColumnType::Float | ColumnType::Double => "FLOAT".to_string(),
            ColumnType::Decimal { .. } => "NUMERIC".to_string(),
            ColumnType::Boolean => "INTEGER".to_string(),
            ColumnType::Json | ColumnType::Jsonb => "TEXT".to_string(),
            ColumnType::Date
            | ColumnType::DateTime
            | ColumnType::Timestamp
            | ColumnType::Time => "TEXT".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
            ColumnType::Uuid => "VARCHAR".to_string(),
        }
    }

    fn increment_modifier(&self, column: &ColumnDefinition) -> &'static str {
        if column.auto_increment {
            " PRIMARY KEY AUTOINCREMENT"
        } else {
            ""
        }
    }

    fn inline_command(&self, _blueprint: &Blueprint, command: &Command) -> Option<String> {
        match command {
            Command::Primary(index) => {
                Some(format!("PRIMARY KEY ({})", self.quote_columns(&index.columns)))
            }
            Command::Foreign(foreign) => Some(self.foreign_key_clause(foreign)),
            _ => None,
        }
    }

    fn compile_command(&self, blueprint: &Blueprint, command: &Command) -> Vec<String> {
        let table = self.quote_identifier(blueprint.table());
        match command {
            Command::Unique(index) => vec![format!(
                "CREATE UNIQUE INDEX {} ON {table} ({})",
                self.quote_identifier(&index.name),
                self.quote_columns(&index.columns)
            )],
            Command::Index(index) => vec![format!(
                "CREATE INDEX {} ON {table} ({})",
                self.quote_identifier(&index.name),
                self.quote_columns(&index.columns)
            )],
            // SQLite 3.35.0+ drops one column per statement
            Command::DropColumn(columns) => columns
                .iter()
                .map(|c| format!("ALTER TABLE {table} DROP COLUMN {}", self.quote_identifier(c)))
                .collect(),
            Command::DropUnique(name) | Command::DropIndex(name) => {
                vec![format!("DROP INDEX {}", self.quote_identifier(name))]
            }
            Command::RenameColumn { from, to } => vec![format!(
                "ALTER TABLE {table} RENAME COLUMN {} TO {}",
                self.quote_identifier(from),
                self.quote_identifier(to)
            )],
            Command::Rename(to) => vec![format!(
                "ALTER TABLE {table} RENAME TO {}",
                self.quote_identifier(to)
            )],
            Command::Drop => vec![format!("DROP TABLE {table}")],
            Command::DropIfExists => vec![format!("DROP TABLE IF EXISTS {table}")],
            // Constraints on an existing table require recreating it
            Command::Primary(_)
            | Command::Foreign(_)
            | Command::DropPrimary(_)
            | Command::DropForeign(_)
            | Command::RenameIndex { .. } => self.unsupported(command),
        }
    }

    fn compile_table_exists(&self, table: &str) -> (String, Vec<SqlValue>) {
        (
            String::from(
                "SELECT COUNT(*) AS aggregate FROM sqlite_master WHERE type = 'table' AND name = ?",
            ),
            vec![SqlValue::Text(table.to_string())],
        )
    }

    fn compile_column_listing(&self, table: &str) -> (String, Vec<SqlValue>) {
        (
            String::from("SELECT name AS column_name FROM pragma_table_info(?) ORDER BY cid"),
            vec![SqlValue::Text(table.to_string())],
        )
    }

    fn compile_enable_foreign_keys(&self) -> String {
        String::from("PRAGMA foreign_keys = ON")
    }

    fn compile_disable_foreign_keys(&self) -> String {
        String::from("PRAGMA foreign_keys = OFF")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Operation;

    #[test]
    fn test_create_inlines_foreign_keys_and_trails_indexes() {
        let mut table = Blueprint::new("comments");
        table.id();
        table.foreign_id("post_id");
        table.string("email", 255).unique();
        table.foreign(&["post_id"]).on("posts").cascade_on_delete();

        assert_eq!(
            SqliteGrammar::new().compile(&table, Operation::Create),
            vec![
                "CREATE TABLE \"comments\" (\
                 \"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
                 \"post_id\" INTEGER NOT NULL, \"email\" VARCHAR NOT NULL, \
                 FOREIGN KEY (\"post_id\") REFERENCES \"posts\" (\"id\") ON DELETE CASCADE)",
                "CREATE UNIQUE INDEX \"comments_email_unique\" ON \"comments\" (\"email\")",
            ]
        );
    }

    #[test]
    fn test_unsupported_commands_compile_to_nothing() {
        let mut table = Blueprint::new("users");
        table.drop_primary().drop_foreign("users_team_id_foreign");
        table.rename_index("a", "b");
        table.foreign(&["team_id"]).on("teams");
        assert!(SqliteGrammar::new()
            .compile(&table, Operation::Alter)
            .is_empty());
    }

    #[test]
    fn test_drop_columns_one_statement_each() {
        let mut table = Blueprint::new("users");
        table.drop_column(&["a", "b"]);
        assert_eq!(
            SqliteGrammar::new().compile(&table, Operation::Alter),
            vec![
                "ALTER TABLE \"users\" DROP COLUMN \"a\"",
                "ALTER TABLE \"users\" DROP COLUMN \"b\"",
            ]
        );
    }
}

//! MySQL grammar.

use quarry_core::{Driver, SqlValue};

use super::{nullable_modifier, SchemaGrammar};
use crate::blueprint::Blueprint;
use crate::column::{ColumnDefinition, ColumnType};
use crate::command::Command;

/// MySQL / MariaDB grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlGrammar;

impl MySqlGrammar {
    /// Creates a new MySQL grammar.
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

fn quote_text(text: &str) -> String {
    SqlValue::Text(text.to_string()).to_sql_inline()
}

impl SchemaGrammar for MySqlGrammar {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn driver(&self) -> Driver {
        Driver::Mysql
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn type_sql(&self, column: &ColumnDefinition) -> String {
        match &column.column_type {
            ColumnType::Char(length) => format!("CHAR({length})"),
            ColumnType::String(length) => format!("VARCHAR({length})"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::MediumText => "MEDIUMTEXT".to_string(),
            ColumnType::LongText => "LONGTEXT".to_string(),
            ColumnType::TinyInteger => "TINYINT".to_string(),
            ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::Integer => "INT".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision}, {scale})"),
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Enum(allowed) => {
                let allowed: Vec<String> = allowed.iter().map(|v| quote_text(v)).collect();
                format!("ENUM({})", allowed.join(", "))
            }
            ColumnType::Json | ColumnType::Jsonb => "JSON".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
            ColumnType::Uuid => "CHAR(36)".to_string(),
        }
    }

    fn modifiers(&self, column: &ColumnDefinition) -> String {
        let mut sql = String::new();
        if column.unsigned && (column.column_type.is_integer() || column.auto_increment) {
            sql.push_str(" UNSIGNED");
        }
        if let Some(charset) = &column.charset {
            sql.push_str(&format!(" CHARACTER SET {charset}"));
        }
        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" COLLATE {}", quote_text(collation)));
        }
        sql.push_str(nullable_modifier(column));
        sql.push_str(&self.default_modifier(column));
        sql.push_str(self.increment_modifier(column));
        if let Some(comment) = &column.comment {
            sql.push_str(&format!(" COMMENT {}", quote_text(comment)));
        }
        if let Some(after) = &column.after {
            sql.push_str(&format!(" AFTER {}", self.quote_identifier(after)));
        }
        if column.first {
            sql.push_str(" FIRST");
        }
        sql
    }

    fn increment_modifier(&self, column: &ColumnDefinition) -> &'static str {
        if column.auto_increment {
            " AUTO_INCREMENT PRIMARY KEY"
        } else {
            ""
        }
    }

    fn table_options(&self, blueprint: &Blueprint) -> String {
        let mut sql = String::new();
        if let Some(engine) = &blueprint.engine {
            sql.push_str(&format!(" ENGINE = {engine}"));
        }
        if let Some(charset) = &blueprint.charset {
            sql.push_str(&format!(" DEFAULT CHARACTER SET = {charset}"));
        }
        if let Some(collation) = &blueprint.collation {
            sql.push_str(&format!(" COLLATE = {collation}"));
        }
        sql
    }

    fn inline_command(&self, _blueprint: &Blueprint, command: &Command) -> Option<String> {
        match command {
            Command::Primary(index) => {
                Some(format!("PRIMARY KEY ({})", self.quote_columns(&index.columns)))
            }
            Command::Unique(index) => Some(format!(
                "UNIQUE KEY {} ({})",
                self.quote_identifier(&index.name),
                self.quote_columns(&index.columns)
            )),
            Command::Index(index) => Some(format!(
                "INDEX {} ({})",
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
        match command {
            Command::Primary(index) => self.alter(
                blueprint,
                &format!("ADD PRIMARY KEY ({})", self.quote_columns(&index.columns)),
            ),
            Command::Unique(index) => self.alter(
                blueprint,
                &format!(
                    "ADD UNIQUE {} ({})",
                    self.quote_identifier(&index.name),
                    self.quote_columns(&index.columns)
                ),
            ),
            Command::Index(index) => self.alter(
                blueprint,
                &format!(
                    "ADD INDEX {} ({})",
                    self.quote_identifier(&index.name),
                    self.quote_columns(&index.columns)
                ),
            ),
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
            Command::DropPrimary(_) => self.alter(blueprint, "DROP PRIMARY KEY"),
            Command::DropUnique(name) | Command::DropIndex(name) => {
                self.alter(blueprint, &format!("DROP INDEX {}", self.quote_identifier(name)))
            }
            Command::DropForeign(name) => self.alter(
                blueprint,
                &format!("DROP FOREIGN KEY {}", self.quote_identifier(name)),
            ),
            Command::RenameColumn { from, to } => self.alter(
                blueprint,
                &format!(
                    "RENAME COLUMN {} TO {}",
                    self.quote_identifier(from),
                    self.quote_identifier(to)
                ),
            ),
            Command::RenameIndex { from, to } => self.alter(
                blueprint,
                &format!(
                    "RENAME INDEX {} TO {}",
                    self.quote_identifier(from),
                    self.quote_identifier(to)
                ),
            ),
            Command::Rename(to) => vec![format!(
                "RENAME TABLE {} TO {}",
                self.quote_identifier(blueprint.table()),
                self.quote_identifier(to)
            )],
            Command::Drop => vec![format!(
                "DROP TABLE {}",
                self.quote_identifier(blueprint.table())
            )],
            Command::DropIfExists => vec![format!(
                "DROP TABLE IF EXISTS {}",
                self.quote_identifier(blueprint.table())
            )],
        }
    }

    fn compile_table_exists(&self, table: &str) -> (String, Vec<SqlValue>) {
        (
            String::from(
                "SELECT COUNT(*) AS aggregate FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = ? AND table_type = 'BASE TABLE'",
            ),
            vec![SqlValue::Text(table.to_string())],
        )
    }

    fn compile_column_listing(&self, table: &str) -> (String, Vec<SqlValue>) {
        (
            String::from(
                "SELECT column_name AS column_name FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? ORDER BY ordinal_position",
            ),
            vec![SqlValue::Text(table.to_string())],
        )
    }

    fn compile_enable_foreign_keys(&self) -> String {
        String::from("SET FOREIGN_KEY_CHECKS=1")
    }

    fn compile_disable_foreign_keys(&self) -> String {
        String::from("SET FOREIGN_KEY_CHECKS=0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foreign_key::ForeignKeyAction;
    use crate::grammar::Operation;

    #[test]
    fn test_create_with_inline_indexes_and_options() {
        let mut table = Blueprint::new("posts");
        table.id();
        table.foreign_id("user_id");
        table.string("slug", 120).unique();
        table.text("body").nullable().comment("markdown");
        table.index(&["user_id"]);
        table
            .foreign(&["user_id"])
            .on("users")
            .on_delete(ForeignKeyAction::Cascade);
        table.engine("InnoDB").charset("utf8mb4");

        let statements = MySqlGrammar::new().compile(&table, Operation::Create);
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE `posts` (\
                 `id` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY, \
                 `user_id` BIGINT UNSIGNED NOT NULL, \
                 `slug` VARCHAR(120) NOT NULL, \
                 `body` TEXT NULL COMMENT 'markdown', \
                 INDEX `posts_user_id_index` (`user_id`), \
                 CONSTRAINT `posts_user_id_foreign` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE, \
                 UNIQUE KEY `posts_slug_unique` (`slug`)\
                 ) ENGINE = InnoDB DEFAULT CHARACTER SET = utf8mb4"
            ]
        );
    }

    #[test]
    fn test_alter_modifier_order() {
        let mut table = Blueprint::new("users");
        table
            .integer("votes")
            .unsigned()
            .nullable()
            .default(0)
            .comment("total")
            .after("name");
        let statements = MySqlGrammar::new().compile(&table, Operation::Alter);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `users` ADD COLUMN `votes` INT UNSIGNED NULL DEFAULT 0 \
                 COMMENT 'total' AFTER `name`"
            ]
        );
    }

    #[test]
    fn test_structural_commands() {
        let grammar = MySqlGrammar::new();
        let mut table = Blueprint::new("users");
        table
            .drop_column(&["a", "b"])
            .drop_primary()
            .drop_unique("users_email_unique")
            .drop_foreign("users_team_id_foreign")
            .rename_index("old", "new")
            .rename("members");
        assert_eq!(
            grammar.compile(&table, Operation::Alter),
            vec![
                "ALTER TABLE `users` DROP COLUMN `a`, DROP COLUMN `b`",
                "ALTER TABLE `users` DROP PRIMARY KEY",
                "ALTER TABLE `users` DROP INDEX `users_email_unique`",
                "ALTER TABLE `users` DROP FOREIGN KEY `users_team_id_foreign`",
                "ALTER TABLE `users` RENAME INDEX `old` TO `new`",
                "RENAME TABLE `users` TO `members`",
            ]
        );
    }

    #[test]
    fn test_introspection_binds_table_name() {
        let (sql, bindings) = MySqlGrammar::new().compile_table_exists("users");
        assert!(sql.contains("information_schema.tables"));
        assert_eq!(bindings, vec![SqlValue::Text("users".into())]);
    }
}

//! Dialect-specific DDL compilation.
//!
//! Each grammar turns a [`Blueprint`] into the ordered list of statements
//! its engine needs. Column and command order in the blueprint is kept in
//! the output.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;

use quarry_core::{Driver, SqlValue};
use tracing::debug;

use crate::blueprint::Blueprint;
use crate::column::{ColumnDefinition, DefaultValue};
use crate::command::Command;
use crate::foreign_key::ForeignKeyDefinition;

/// What a blueprint is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A single `CREATE TABLE` plus whatever cannot be declared inline.
    Create,
    /// One `ADD COLUMN` per column, then one statement per command.
    Alter,
}

/// Trait for dialect-specific DDL generation.
pub trait SchemaGrammar: Send + Sync {
    /// Returns the grammar name.
    fn name(&self) -> &'static str;

    /// Returns the driver this grammar targets.
    fn driver(&self) -> Driver;

    /// Compiles a blueprint into executable statements.
    fn compile(&self, blueprint: &Blueprint, operation: Operation) -> Vec<String> {
        match operation {
            Operation::Create => self.compile_create(blueprint),
            Operation::Alter => self.compile_alter(blueprint),
        }
    }

    /// Compiles a `CREATE TABLE` statement and its trailing statements.
    fn compile_create(&self, blueprint: &Blueprint) -> Vec<String> {
        let mut definitions: Vec<String> = blueprint
            .columns()
            .iter()
            .map(|c| self.column_definition(c))
            .collect();
        let mut trailing = Vec::new();
        for command in blueprint.all_commands() {
            match self.inline_command(blueprint, &command) {
                Some(definition) => definitions.push(definition),
                None => trailing.extend(self.compile_command(blueprint, &command)),
            }
        }

        let mut sql = String::from("CREATE ");
        if blueprint.temporary {
            sql.push_str("TEMPORARY ");
        }
        sql.push_str("TABLE ");
        sql.push_str(&self.quote_identifier(blueprint.table()));
        sql.push_str(" (");
        sql.push_str(&definitions.join(", "));
        sql.push(')');
        sql.push_str(&self.table_options(blueprint));

        let mut statements = vec![sql];
        statements.extend(trailing);
        statements.extend(self.comment_statements(blueprint));
        statements
    }

    /// Compiles column additions and commands against an existing table.
    fn compile_alter(&self, blueprint: &Blueprint) -> Vec<String> {
        let mut statements: Vec<String> = blueprint
            .columns()
            .iter()
            .map(|c| self.compile_add_column(blueprint, c))
            .collect();
        for command in blueprint.all_commands() {
            statements.extend(self.compile_command(blueprint, &command));
        }
        statements.extend(self.comment_statements(blueprint));
        statements
    }

    /// Generates SQL for ADD COLUMN.
    fn compile_add_column(&self, blueprint: &Blueprint, column: &ColumnDefinition) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_identifier(blueprint.table()),
            self.column_definition(column)
        )
    }

    /// Renders a command as a table element inside `CREATE TABLE`, or
    /// `None` when the dialect needs a separate statement for it.
    fn inline_command(&self, blueprint: &Blueprint, command: &Command) -> Option<String>;

    /// Compiles a command into standalone statements. Commands the dialect
    /// cannot express yield no statement.
    fn compile_command(&self, blueprint: &Blueprint, command: &Command) -> Vec<String>;

    /// Extra statements carrying column comments.
    fn comment_statements(&self, _blueprint: &Blueprint) -> Vec<String> {
        Vec::new()
    }

    /// Table options appended after the column list.
    fn table_options(&self, _blueprint: &Blueprint) -> String {
        String::new()
    }

    /// Generates SQL for a column definition.
    fn column_definition(&self, column: &ColumnDefinition) -> String {
        format!(
            "{} {}{}",
            self.quote_identifier(&column.name),
            self.type_sql(column),
            self.modifiers(column)
        )
    }

    /// Maps a column to the dialect-specific SQL type.
    fn type_sql(&self, column: &ColumnDefinition) -> String;

    /// Renders the column modifiers: nullable, then default, then increment.
    fn modifiers(&self, column: &ColumnDefinition) -> String {
        let mut sql = String::from(nullable_modifier(column));
        sql.push_str(&self.default_modifier(column));
        sql.push_str(self.increment_modifier(column));
        sql
    }

    /// Renders ` DEFAULT …` when the column has a default.
    fn default_modifier(&self, column: &ColumnDefinition) -> String {
        column
            .default
            .as_ref()
            .map(|default| format!(" DEFAULT {}", self.render_default(default)))
            .unwrap_or_default()
    }

    /// Returns the auto-increment construct for the column, if any.
    fn increment_modifier(&self, column: &ColumnDefinition) -> &'static str;

    /// Renders a default value.
    fn render_default(&self, default: &DefaultValue) -> String {
        match default {
            DefaultValue::Expression(expression) => expression.clone(),
            DefaultValue::Value(SqlValue::Bool(value)) => self.render_bool(*value),
            DefaultValue::Value(value) => value.to_sql_inline(),
        }
    }

    /// Renders a boolean literal.
    fn render_bool(&self, value: bool) -> String {
        String::from(if value { "1" } else { "0" })
    }

    /// Returns the identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Quotes an identifier; dotted names are quoted segment by segment.
    fn quote_identifier(&self, name: &str) -> String {
        let q = self.quote_char();
        name.split('.')
            .map(|segment| format!("{q}{segment}{q}"))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes and joins a column list.
    fn quote_columns(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders `FOREIGN KEY (…) REFERENCES … (…)` with its actions.
    fn foreign_key_clause(&self, foreign: &ForeignKeyDefinition) -> String {
        let mut sql = format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_columns(&foreign.columns),
            self.quote_identifier(&foreign.on),
            self.quote_columns(&foreign.references)
        );
        if let Some(action) = foreign.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = foreign.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.as_sql());
        }
        sql
    }

    /// Query counting tables named like the bound parameter.
    fn compile_table_exists(&self, table: &str) -> (String, Vec<SqlValue>);

    /// Query listing the columns of a table as `column_name` rows.
    fn compile_column_listing(&self, table: &str) -> (String, Vec<SqlValue>);

    /// Statement enabling foreign key enforcement.
    fn compile_enable_foreign_keys(&self) -> String;

    /// Statement disabling foreign key enforcement.
    fn compile_disable_foreign_keys(&self) -> String;

    /// Logs and skips a command this dialect cannot express.
    fn unsupported(&self, command: &Command) -> Vec<String> {
        debug!(
            grammar = self.name(),
            command = command.kind(),
            "Command not supported by this dialect, skipping"
        );
        Vec::new()
    }
}

fn nullable_modifier(column: &ColumnDefinition) -> &'static str {
    if column.nullable {
        " NULL"
    } else {
        " NOT NULL"
    }
}

/// Returns the grammar for a driver.
#[must_use]
pub fn grammar_for(driver: Driver) -> Box<dyn SchemaGrammar> {
    match driver {
        Driver::Mysql => Box::new(MySqlGrammar::new()),
        Driver::Postgres => Box::new(PostgresGrammar::new()),
        Driver::Sqlite => Box::new(SqliteGrammar::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widgets() -> Blueprint {
        let mut table = Blueprint::new("widgets");
        table.increments("id");
        table.string("name", 255).nullable();
        table.string("label", 100).nullable();
        table
    }

    #[test]
    fn test_create_is_single_statement_on_every_dialect() {
        let expected = [
            (
                Driver::Mysql,
                "CREATE TABLE `widgets` (`id` INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY, \
                 `name` VARCHAR(255) NULL, `label` VARCHAR(100) NULL)",
            ),
            (
                Driver::Postgres,
                "CREATE TABLE \"widgets\" (\"id\" SERIAL NOT NULL PRIMARY KEY, \
                 \"name\" VARCHAR(255) NULL, \"label\" VARCHAR(100) NULL)",
            ),
            (
                Driver::Sqlite,
                "CREATE TABLE \"widgets\" (\"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
                 \"name\" VARCHAR NULL, \"label\" VARCHAR NULL)",
            ),
        ];
        for (driver, sql) in expected {
            let statements = grammar_for(driver).compile(&widgets(), Operation::Create);
            assert_eq!(statements, vec![sql.to_string()], "{driver}");
        }
    }

    #[test]
    fn test_alter_emits_one_statement_per_column_and_command() {
        let mut table = Blueprint::new("users");
        table.string("nickname", 50).nullable();
        table.integer("age").nullable();
        table.drop_column(&["legacy"]);
        table.rename_column("mail", "email");

        let statements = grammar_for(Driver::Postgres).compile(&table, Operation::Alter);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE \"users\" ADD COLUMN \"nickname\" VARCHAR(50) NULL",
                "ALTER TABLE \"users\" ADD COLUMN \"age\" INTEGER NULL",
                "ALTER TABLE \"users\" DROP COLUMN \"legacy\"",
                "ALTER TABLE \"users\" RENAME COLUMN \"mail\" TO \"email\"",
            ]
        );
    }

    #[test]
    fn test_boolean_defaults() {
        let mut table = Blueprint::new("flags");
        table.boolean("active").default(true);
        let column = &table.columns()[0];
        assert_eq!(
            grammar_for(Driver::Mysql).column_definition(column),
            "`active` TINYINT(1) NOT NULL DEFAULT 1"
        );
        assert_eq!(
            grammar_for(Driver::Postgres).column_definition(column),
            "\"active\" BOOLEAN NOT NULL DEFAULT TRUE"
        );
        assert_eq!(
            grammar_for(Driver::Sqlite).column_definition(column),
            "\"active\" INTEGER NOT NULL DEFAULT 1"
        );
    }

    #[test]
    fn test_enum_degrades_outside_mysql() {
        let mut table = Blueprint::new("posts");
        table.enumeration("status", &["draft", "published"]);
        let column = &table.columns()[0];
        assert_eq!(
            grammar_for(Driver::Mysql).type_sql(column),
            "ENUM('draft', 'published')"
        );
        assert_eq!(grammar_for(Driver::Postgres).type_sql(column), "VARCHAR(255)");
        assert_eq!(grammar_for(Driver::Sqlite).type_sql(column), "VARCHAR");
    }

    #[test]
    fn test_text_and_expression_defaults() {
        let mut table = Blueprint::new("posts");
        table.string("title", 100).default("O'Neil");
        table.timestamp("published_at").use_current();
        let grammar = grammar_for(Driver::Sqlite);
        assert_eq!(
            grammar.column_definition(&table.columns()[0]),
            "\"title\" VARCHAR NOT NULL DEFAULT 'O''Neil'"
        );
        assert_eq!(
            grammar.column_definition(&table.columns()[1]),
            "\"published_at\" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_dotted_identifiers() {
        assert_eq!(
            grammar_for(Driver::Postgres).quote_identifier("public.users"),
            "\"public\".\"users\""
        );
        assert_eq!(
            grammar_for(Driver::Mysql).quote_identifier("shop.users"),
            "`shop`.`users`"
        );
    }
}

//! Table blueprints.
//!
//! A [`Blueprint`] describes a table being created or altered: its columns
//! and its structural commands, both kept in declaration order, plus table
//! options. Grammars compile it into DDL; it is discarded afterwards.

use crate::column::{ColumnDefinition, ColumnType};
use crate::command::{Command, IndexCommand};
use crate::foreign_key::ForeignKeyBuilder;

/// An in-memory description of a table under construction or alteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    table: String,
    columns: Vec<ColumnDefinition>,
    commands: Vec<Command>,
    /// Storage engine (MySQL only).
    pub engine: Option<String>,
    /// Default character set (MySQL only).
    pub charset: Option<String>,
    /// Default collation (MySQL only).
    pub collation: Option<String>,
    /// Create a temporary table.
    pub temporary: bool,
}

impl Blueprint {
    /// Creates an empty blueprint for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            commands: Vec::new(),
            engine: None,
            charset: None,
            collation: None,
            temporary: false,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the columns, in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Returns the explicit commands, in declaration order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns the explicit commands followed by the indexes requested
    /// through the column flags `primary`, `unique` and `index`.
    #[must_use]
    pub fn all_commands(&self) -> Vec<Command> {
        let mut commands = self.commands.clone();
        for column in &self.columns {
            let columns = [column.name.as_str()];
            // auto-increment columns carry their primary key inline
            if column.primary && !column.auto_increment {
                commands.push(Command::Primary(self.index_command("primary", &columns)));
            }
            if column.unique {
                commands.push(Command::Unique(self.index_command("unique", &columns)));
            }
            if column.index {
                commands.push(Command::Index(self.index_command("index", &columns)));
            }
        }
        commands
    }

    /// Returns whether nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.commands.is_empty()
    }

    /// Builds the default index name: `{table}_{columns}_{kind}`.
    #[must_use]
    pub fn index_name(&self, kind: &str, columns: &[&str]) -> String {
        format!("{}_{}_{kind}", self.table, columns.join("_"))
            .to_lowercase()
            .replace(['-', '.'], "_")
    }

    fn index_command(&self, kind: &str, columns: &[&str]) -> IndexCommand {
        IndexCommand {
            name: self.index_name(kind, columns),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    pub(crate) fn push_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub(crate) fn last_command_mut(&mut self) -> Option<&mut Command> {
        self.commands.last_mut()
    }

    /// Adds a column of an arbitrary type.
    pub fn add_column(&mut self, name: &str, column_type: ColumnType) -> &mut ColumnDefinition {
        self.columns.push(ColumnDefinition::new(name, column_type));
        let index = self.columns.len() - 1;
        &mut self.columns[index]
    }

    // Table options

    /// Sets the storage engine.
    pub fn engine(&mut self, engine: &str) -> &mut Self {
        self.engine = Some(engine.to_string());
        self
    }

    /// Sets the default character set.
    pub fn charset(&mut self, charset: &str) -> &mut Self {
        self.charset = Some(charset.to_string());
        self
    }

    /// Sets the default collation.
    pub fn collation(&mut self, collation: &str) -> &mut Self {
        self.collation = Some(collation.to_string());
        self
    }

    /// Creates the table as a temporary table.
    pub fn temporary(&mut self) -> &mut Self {
        self.temporary = true;
        self
    }

    // Auto-increment keys

    /// `id` big-integer auto-increment primary key.
    pub fn id(&mut self) -> &mut ColumnDefinition {
        self.big_increments("id")
    }

    /// Unsigned integer auto-increment primary key.
    pub fn increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Integer)
            .unsigned()
            .auto_increment()
    }

    /// Unsigned big-integer auto-increment primary key.
    pub fn big_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::BigInteger)
            .unsigned()
            .auto_increment()
    }

    /// Unsigned small-integer auto-increment primary key.
    pub fn small_increments(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::SmallInteger)
            .unsigned()
            .auto_increment()
    }

    // Strings

    /// Fixed-length string column.
    pub fn char(&mut self, name: &str, length: u32) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Char(length))
    }

    /// Variable-length string column.
    pub fn string(&mut self, name: &str, length: u32) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::String(length))
    }

    /// Text column.
    pub fn text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Text)
    }

    /// Medium text column.
    pub fn medium_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::MediumText)
    }

    /// Long text column.
    pub fn long_text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::LongText)
    }

    /// Enumeration column restricted to `allowed`.
    pub fn enumeration(&mut self, name: &str, allowed: &[&str]) -> &mut ColumnDefinition {
        let allowed = allowed.iter().map(|v| (*v).to_string()).collect();
        self.add_column(name, ColumnType::Enum(allowed))
    }

    /// UUID column.
    pub fn uuid(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Uuid)
    }

    /// Nullable `remember_token` string column.
    pub fn remember_token(&mut self) -> &mut ColumnDefinition {
        self.string("remember_token", 100).nullable()
    }

    // Numbers

    /// Integer column.
    pub fn integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Integer)
    }

    /// Big-integer column.
    pub fn big_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::BigInteger)
    }

    /// Small-integer column.
    pub fn small_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::SmallInteger)
    }

    /// Tiny-integer column.
    pub fn tiny_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::TinyInteger)
    }

    /// Unsigned integer column.
    pub fn unsigned_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.integer(name).unsigned()
    }

    /// Unsigned big-integer column.
    pub fn unsigned_big_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.big_integer(name).unsigned()
    }

    /// Unsigned small-integer column.
    pub fn unsigned_small_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.small_integer(name).unsigned()
    }

    /// Unsigned tiny-integer column.
    pub fn unsigned_tiny_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.tiny_integer(name).unsigned()
    }

    /// Unsigned big-integer column meant to hold a foreign key.
    pub fn foreign_id(&mut self, name: &str) -> &mut ColumnDefinition {
        self.unsigned_big_integer(name)
    }

    /// Single precision float column.
    pub fn float(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Float)
    }

    /// Double precision float column.
    pub fn double(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Double)
    }

    /// Fixed-point column.
    pub fn decimal(&mut self, name: &str, precision: u8, scale: u8) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Decimal { precision, scale })
    }

    /// Boolean column.
    pub fn boolean(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Boolean)
    }

    // Documents, dates and binary

    /// JSON column.
    pub fn json(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Json)
    }

    /// JSONB column.
    pub fn jsonb(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Jsonb)
    }

    /// Date column.
    pub fn date(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Date)
    }

    /// Date-time column.
    pub fn date_time(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::DateTime)
    }

    /// Time column.
    pub fn time(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Time)
    }

    /// Timestamp column.
    pub fn timestamp(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Timestamp)
    }

    /// Nullable `created_at` and `updated_at` timestamps.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
    }

    /// Same as [`Blueprint::timestamps`].
    pub fn nullable_timestamps(&mut self) {
        self.timestamps();
    }

    /// Nullable `deleted_at` timestamp.
    pub fn soft_deletes(&mut self) -> &mut ColumnDefinition {
        self.timestamp("deleted_at").nullable()
    }

    /// Binary column.
    pub fn binary(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Binary)
    }

    // Indexes

    /// Adds a primary key over `columns`.
    pub fn primary(&mut self, columns: &[&str]) -> &mut Self {
        let command = self.index_command("primary", columns);
        self.commands.push(Command::Primary(command));
        self
    }

    /// Adds a unique index over `columns`.
    pub fn unique(&mut self, columns: &[&str]) -> &mut Self {
        let command = self.index_command("unique", columns);
        self.commands.push(Command::Unique(command));
        self
    }

    /// Adds a unique index with an explicit name.
    pub fn unique_named(&mut self, columns: &[&str], name: &str) -> &mut Self {
        self.commands.push(Command::Unique(IndexCommand {
            name: name.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }));
        self
    }

    /// Adds a plain index over `columns`.
    pub fn index(&mut self, columns: &[&str]) -> &mut Self {
        let command = self.index_command("index", columns);
        self.commands.push(Command::Index(command));
        self
    }

    /// Adds a plain index with an explicit name.
    pub fn index_named(&mut self, columns: &[&str], name: &str) -> &mut Self {
        self.commands.push(Command::Index(IndexCommand {
            name: name.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }));
        self
    }

    /// Starts a foreign key over `columns`.
    ///
    /// ```rust
    /// use quarry_schema::{Blueprint, ForeignKeyAction};
    ///
    /// let mut table = Blueprint::new("posts");
    /// table.foreign_id("user_id");
    /// table
    ///     .foreign(&["user_id"])
    ///     .references(&["id"])
    ///     .on("users")
    ///     .on_delete(ForeignKeyAction::Cascade);
    /// assert_eq!(table.commands().len(), 1);
    /// ```
    pub fn foreign(&mut self, columns: &[&str]) -> ForeignKeyBuilder<'_> {
        ForeignKeyBuilder::new(self, columns)
    }

    // Structural commands

    /// Drops columns.
    pub fn drop_column(&mut self, columns: &[&str]) -> &mut Self {
        self.commands.push(Command::DropColumn(
            columns.iter().map(|c| (*c).to_string()).collect(),
        ));
        self
    }

    /// Drops the `created_at` and `updated_at` columns.
    pub fn drop_timestamps(&mut self) -> &mut Self {
        self.drop_column(&["created_at", "updated_at"])
    }

    /// Drops the primary key.
    pub fn drop_primary(&mut self) -> &mut Self {
        let name = format!("{}_pkey", self.table);
        self.commands.push(Command::DropPrimary(name));
        self
    }

    /// Drops a unique index by name.
    pub fn drop_unique(&mut self, name: &str) -> &mut Self {
        self.commands.push(Command::DropUnique(name.to_string()));
        self
    }

    /// Drops a plain index by name.
    pub fn drop_index(&mut self, name: &str) -> &mut Self {
        self.commands.push(Command::DropIndex(name.to_string()));
        self
    }

    /// Drops a foreign key by name.
    pub fn drop_foreign(&mut self, name: &str) -> &mut Self {
        self.commands.push(Command::DropForeign(name.to_string()));
        self
    }

    /// Renames a column.
    pub fn rename_column(&mut self, from: &str, to: &str) -> &mut Self {
        self.commands.push(Command::RenameColumn {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    /// Renames an index.
    pub fn rename_index(&mut self, from: &str, to: &str) -> &mut Self {
        self.commands.push(Command::RenameIndex {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    /// Renames the table.
    pub fn rename(&mut self, to: &str) -> &mut Self {
        self.commands.push(Command::Rename(to.to_string()));
        self
    }

    /// Drops the table.
    pub fn drop(&mut self) -> &mut Self {
        self.commands.push(Command::Drop);
        self
    }

    /// Drops the table if it exists.
    pub fn drop_if_exists(&mut self) -> &mut Self {
        self.commands.push(Command::DropIfExists);
        self
    }
}

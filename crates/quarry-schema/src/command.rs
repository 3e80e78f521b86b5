//! Structural commands recorded on a blueprint.

use crate::foreign_key::ForeignKeyDefinition;

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCommand {
    /// Index (or constraint) name.
    pub name: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
}

/// A structural change recorded on a [`crate::Blueprint`], compiled by every
/// grammar through an exhaustive match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a primary key.
    Primary(IndexCommand),
    /// Add a unique index.
    Unique(IndexCommand),
    /// Add a plain index.
    Index(IndexCommand),
    /// Add a foreign key constraint.
    Foreign(ForeignKeyDefinition),
    /// Drop columns.
    DropColumn(Vec<String>),
    /// Drop the primary key (named constraint where the dialect needs it).
    DropPrimary(String),
    /// Drop a unique index by name.
    DropUnique(String),
    /// Drop a plain index by name.
    DropIndex(String),
    /// Drop a foreign key by name.
    DropForeign(String),
    /// Rename a column.
    RenameColumn {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Rename an index.
    RenameIndex {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Rename the table.
    Rename(String),
    /// Drop the table.
    Drop,
    /// Drop the table if it exists.
    DropIfExists,
}

impl Command {
    /// Short name used in log output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Primary(_) => "primary",
            Self::Unique(_) => "unique",
            Self::Index(_) => "index",
            Self::Foreign(_) => "foreign",
            Self::DropColumn(_) => "drop_column",
            Self::DropPrimary(_) => "drop_primary",
            Self::DropUnique(_) => "drop_unique",
            Self::DropIndex(_) => "drop_index",
            Self::DropForeign(_) => "drop_foreign",
            Self::RenameColumn { .. } => "rename_column",
            Self::RenameIndex { .. } => "rename_index",
            Self::Rename(_) => "rename",
            Self::Drop => "drop",
            Self::DropIfExists => "drop_if_exists",
        }
    }
}

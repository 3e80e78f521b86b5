//! Foreign key definitions.

use crate::blueprint::Blueprint;
use crate::command::Command;

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// A foreign key constraint registered on a blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDefinition {
    /// Constraint name.
    pub name: String,
    /// Local columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub on: String,
    /// Referenced columns.
    pub references: Vec<String>,
    /// Action on delete.
    pub on_delete: Option<ForeignKeyAction>,
    /// Action on update.
    pub on_update: Option<ForeignKeyAction>,
}

impl ForeignKeyDefinition {
    /// Sets the ON DELETE action.
    pub fn on_delete(&mut self, action: ForeignKeyAction) -> &mut Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    pub fn on_update(&mut self, action: ForeignKeyAction) -> &mut Self {
        self.on_update = Some(action);
        self
    }

    /// `ON DELETE CASCADE`.
    pub fn cascade_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::Cascade)
    }

    /// `ON DELETE SET NULL`.
    pub fn null_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::SetNull)
    }

    /// `ON DELETE RESTRICT`.
    pub fn restrict_on_delete(&mut self) -> &mut Self {
        self.on_delete(ForeignKeyAction::Restrict)
    }

    /// `ON UPDATE CASCADE`.
    pub fn cascade_on_update(&mut self) -> &mut Self {
        self.on_update(ForeignKeyAction::Cascade)
    }
}

/// Collects a foreign key until the referenced table is known.
///
/// Nothing is registered on the blueprint until [`ForeignKeyBuilder::on`]
/// is called; a builder dropped earlier leaves no trace.
#[derive(Debug)]
#[must_use = "a foreign key is only registered once `on` is called"]
pub struct ForeignKeyBuilder<'b> {
    blueprint: &'b mut Blueprint,
    columns: Vec<String>,
    references: Vec<String>,
    name: Option<String>,
}

impl<'b> ForeignKeyBuilder<'b> {
    pub(crate) fn new(blueprint: &'b mut Blueprint, columns: &[&str]) -> Self {
        Self {
            blueprint,
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            references: vec![String::from("id")],
            name: None,
        }
    }

    /// Sets the referenced columns (`id` when not called).
    pub fn references(mut self, columns: &[&str]) -> Self {
        self.references = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Overrides the generated constraint name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the referenced table and registers the constraint.
    pub fn on(self, table: &str) -> &'b mut ForeignKeyDefinition {
        let Self {
            blueprint,
            columns,
            references,
            name,
        } = self;
        let name = name.unwrap_or_else(|| {
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
            blueprint.index_name("foreign", &columns)
        });
        blueprint.push_command(Command::Foreign(ForeignKeyDefinition {
            name,
            columns,
            on: table.to_string(),
            references,
            on_delete: None,
            on_update: None,
        }));
        match blueprint.last_command_mut() {
            Some(Command::Foreign(definition)) => definition,
            _ => unreachable!("a foreign key command was just pushed"),
        }
    }
}

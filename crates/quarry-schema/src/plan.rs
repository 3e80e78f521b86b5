//! Declarative lists of schema operations.

use crate::blueprint::Blueprint;

/// A single schema operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOperation {
    /// Create a table.
    Create(Blueprint),
    /// Alter an existing table.
    Alter(Blueprint),
    /// Drop a table.
    Drop(String),
    /// Drop a table if it exists.
    DropIfExists(String),
    /// Rename a table.
    Rename {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Raw SQL, run as-is. May hold several statements.
    Raw(String),
}

/// An ordered list of schema operations, filled in by migrations and run
/// by [`crate::Schema::run`].
///
/// ```rust
/// use quarry_schema::SchemaPlan;
///
/// let mut plan = SchemaPlan::new();
/// plan.create("widgets", |t| {
///     t.id();
///     t.string("name", 255);
/// })
/// .drop_if_exists("legacy_widgets");
/// assert_eq!(plan.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaPlan {
    operations: Vec<SchemaOperation>,
}

impl SchemaPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the operations in order.
    #[must_use]
    pub fn operations(&self) -> &[SchemaOperation] {
        &self.operations
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns whether the plan has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Appends an operation.
    pub fn push(&mut self, operation: SchemaOperation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    /// Creates `table` with the columns declared by `build`.
    pub fn create(&mut self, table: &str, build: impl FnOnce(&mut Blueprint)) -> &mut Self {
        let mut blueprint = Blueprint::new(table);
        build(&mut blueprint);
        self.push(SchemaOperation::Create(blueprint))
    }

    /// Alters `table` with the changes declared by `build`.
    pub fn table(&mut self, table: &str, build: impl FnOnce(&mut Blueprint)) -> &mut Self {
        let mut blueprint = Blueprint::new(table);
        build(&mut blueprint);
        self.push(SchemaOperation::Alter(blueprint))
    }

    /// Drops `table`.
    pub fn drop(&mut self, table: &str) -> &mut Self {
        self.push(SchemaOperation::Drop(table.to_string()))
    }

    /// Drops `table` if it exists.
    pub fn drop_if_exists(&mut self, table: &str) -> &mut Self {
        self.push(SchemaOperation::DropIfExists(table.to_string()))
    }

    /// Renames `from` to `to`.
    pub fn rename(&mut self, from: &str, to: &str) -> &mut Self {
        self.push(SchemaOperation::Rename {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Runs raw SQL.
    pub fn raw(&mut self, sql: &str) -> &mut Self {
        self.push(SchemaOperation::Raw(sql.to_string()))
    }
}

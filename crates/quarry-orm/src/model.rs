//! Model trait and related types.
//!
//! A model is a zero-sized marker type whose associated constants describe
//! one table: its name, its key, which attributes may be mass-assigned, how
//! attributes are cast, and which ones are left out of serialized output.
//! Row data lives in [`Record`].

use quarry_core::{Connection, Operator, SqlValue, ToSqlValue};

use crate::cast::Cast;
use crate::error::{OrmError, Result};
use crate::query::ModelQuery;
use crate::record::{Attributes, Record};

/// Computes the value of an attribute on read.
pub type Accessor<M> = fn(&Record<M>) -> Result<SqlValue>;

/// Stores an attribute on write.
pub type Mutator<M> = fn(&mut Record<M>, SqlValue) -> Result<()>;

/// A database model with active-record capabilities.
///
/// # Example
///
/// ```ignore
/// use quarry_orm::{Cast, Model, Record};
///
/// struct User;
///
/// impl Model for User {
///     const TABLE: &'static str = "users";
///     const FILLABLE: &'static [&'static str] = &["name", "email"];
///     const HIDDEN: &'static [&'static str] = &["password"];
///     const CASTS: &'static [(&'static str, Cast)] = &[("admin", Cast::Bool)];
/// }
///
/// let user = User::create(&conn, row! { "name" => "Ada", "email" => "ada@example.com" }).await?;
/// let same = User::find_or_fail(&conn, user.key().cloned()).await?;
/// ```
#[allow(async_fn_in_trait)]
pub trait Model: Sized + Send + Sync + 'static {
    /// Table name.
    const TABLE: &'static str;

    /// Primary key column.
    const PRIMARY_KEY: &'static str = "id";

    /// Whether the store generates the primary key on insert.
    const INCREMENTING: bool = true;

    /// Whether `created_at`/`updated_at` are maintained on save.
    const TIMESTAMPS: bool = true;

    /// Attributes allowed through mass assignment. When non-empty, nothing
    /// else is.
    const FILLABLE: &'static [&'static str] = &[];

    /// Attributes blocked from mass assignment when `FILLABLE` is empty.
    /// `"*"` blocks everything.
    const GUARDED: &'static [&'static str] = &["*"];

    /// Attributes left out of serialized output.
    const HIDDEN: &'static [&'static str] = &[];

    /// When non-empty, the only attributes included in serialized output.
    const VISIBLE: &'static [&'static str] = &[];

    /// Declared attribute casts.
    const CASTS: &'static [(&'static str, Cast)] = &[];

    /// Read hooks, consulted before the stored value.
    const ACCESSORS: &'static [(&'static str, Accessor<Self>)] = &[];

    /// Write hooks, consulted before storing the value.
    const MUTATORS: &'static [(&'static str, Mutator<Self>)] = &[];

    /// Returns the declared cast for an attribute.
    fn cast_for(attribute: &str) -> Option<Cast> {
        Self::CASTS
            .iter()
            .find(|(name, _)| *name == attribute)
            .map(|(_, cast)| *cast)
    }

    /// Returns whether an attribute may be mass-assigned.
    fn is_fillable(attribute: &str) -> bool {
        if Self::FILLABLE.iter().any(|name| *name == attribute) {
            return true;
        }
        if !Self::FILLABLE.is_empty() {
            return false;
        }
        !Self::GUARDED
            .iter()
            .any(|name| *name == "*" || *name == attribute)
    }

    /// Starts a query against the model's table.
    fn query(conn: &Connection) -> ModelQuery<'_, Self> {
        ModelQuery::new(conn)
    }

    /// Starts a query with a `column = value` filter.
    fn where_eq<'c>(
        conn: &'c Connection,
        column: &str,
        value: impl ToSqlValue,
    ) -> ModelQuery<'c, Self> {
        Self::query(conn).where_eq(column, value)
    }

    /// Starts a query with a `column <operator> value` filter.
    fn where_op<'c>(
        conn: &'c Connection,
        column: &str,
        operator: Operator,
        value: impl ToSqlValue,
    ) -> ModelQuery<'c, Self> {
        Self::query(conn).where_op(column, operator, value)
    }

    /// Finds a record by primary key.
    async fn find(conn: &Connection, key: impl ToSqlValue) -> Result<Option<Record<Self>>> {
        Self::query(conn).find(key).await
    }

    /// Finds a record by primary key, failing with
    /// [`OrmError::ModelNotFound`] when there is none.
    async fn find_or_fail(conn: &Connection, key: impl ToSqlValue) -> Result<Record<Self>> {
        let key = key.to_sql_value();
        Self::find(conn, &key)
            .await?
            .ok_or_else(|| OrmError::ModelNotFound {
                model: Self::TABLE,
                key: key.to_sql_inline(),
            })
    }

    /// Loads every record.
    async fn all(conn: &Connection) -> Result<Vec<Record<Self>>> {
        Self::query(conn).get().await
    }

    /// Builds an unsaved record, mass-assigning `attributes`.
    fn make(attributes: Attributes) -> Result<Record<Self>> {
        let mut record = Record::new();
        record.fill(attributes)?;
        Ok(record)
    }

    /// Builds a record from `attributes` and saves it.
    async fn create(conn: &Connection, attributes: Attributes) -> Result<Record<Self>> {
        let mut record = Self::make(attributes)?;
        record.save(conn).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Open;

    impl Model for Open {
        const TABLE: &'static str = "open";
        const GUARDED: &'static [&'static str] = &["id"];
    }

    struct Listed;

    impl Model for Listed {
        const TABLE: &'static str = "listed";
        const FILLABLE: &'static [&'static str] = &["name"];
        const CASTS: &'static [(&'static str, Cast)] = &[("age", Cast::Int)];
    }

    struct Locked;

    impl Model for Locked {
        const TABLE: &'static str = "locked";
    }

    #[test]
    fn test_mass_assignment_guard() {
        assert!(Open::is_fillable("name"));
        assert!(!Open::is_fillable("id"));

        assert!(Listed::is_fillable("name"));
        assert!(!Listed::is_fillable("age"));

        assert!(!Locked::is_fillable("name"));
    }

    #[test]
    fn test_cast_lookup() {
        assert_eq!(Listed::cast_for("age"), Some(Cast::Int));
        assert_eq!(Listed::cast_for("name"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Locked::PRIMARY_KEY, "id");
        assert!(Locked::INCREMENTING);
        assert!(Locked::TIMESTAMPS);
        assert_eq!(Locked::GUARDED, &["*"]);
    }
}

//! Column definitions.
//!
//! A [`ColumnDefinition`] is created by one of the typed [`crate::Blueprint`]
//! helpers and then refined with chained setters:
//!
//! ```rust
//! use quarry_schema::Blueprint;
//!
//! let mut table = Blueprint::new("users");
//! table.string("email", 255).unique().comment("login name");
//! table.integer("logins").unsigned().default(0);
//! ```

use quarry_core::{SqlValue, ToSqlValue};

/// Abstract column types, mapped to concrete types by each grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Fixed-length string.
    Char(u32),
    /// Variable-length string.
    String(u32),
    /// Text.
    Text,
    /// Medium text.
    MediumText,
    /// Long text.
    LongText,
    /// 1-byte integer.
    TinyInteger,
    /// 2-byte integer.
    SmallInteger,
    /// 4-byte integer.
    Integer,
    /// 8-byte integer.
    BigInteger,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Fixed-point number.
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// Boolean.
    Boolean,
    /// One of a fixed set of strings.
    Enum(Vec<String>),
    /// JSON document.
    Json,
    /// Binary JSON document (PostgreSQL), plain JSON elsewhere.
    Jsonb,
    /// Date.
    Date,
    /// Date and time.
    DateTime,
    /// Time of day.
    Time,
    /// Timestamp.
    Timestamp,
    /// Binary data.
    Binary,
    /// UUID.
    Uuid,
}

impl ColumnType {
    /// Returns whether this is one of the integer types.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::TinyInteger | Self::SmallInteger | Self::Integer | Self::BigInteger
        )
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A literal value, rendered inline.
    Value(SqlValue),
    /// Raw SQL expression (e.g. `CURRENT_TIMESTAMP`).
    Expression(String),
}

/// A column under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Abstract type.
    pub column_type: ColumnType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Unsigned integer (MySQL only).
    pub unsigned: bool,
    /// Auto-incrementing primary key.
    pub auto_increment: bool,
    /// Fluent PRIMARY KEY flag.
    pub primary: bool,
    /// Fluent UNIQUE flag.
    pub unique: bool,
    /// Fluent INDEX flag.
    pub index: bool,
    /// Column comment.
    pub comment: Option<String>,
    /// Place the column after another one (MySQL only).
    pub after: Option<String>,
    /// Place the column first (MySQL only).
    pub first: bool,
    /// Character set (MySQL only).
    pub charset: Option<String>,
    /// Collation.
    pub collation: Option<String>,
}

impl ColumnDefinition {
    /// Creates a NOT NULL column without modifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
            unsigned: false,
            auto_increment: false,
            primary: false,
            unique: false,
            index: false,
            comment: None,
            after: None,
            first: false,
            charset: None,
            collation: None,
        }
    }

    /// Allows NULL.
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Sets a literal default.
    pub fn default(&mut self, value: impl ToSqlValue) -> &mut Self {
        self.default = Some(DefaultValue::Value(value.to_sql_value()));
        self
    }

    /// Sets a raw SQL default expression.
    pub fn default_raw(&mut self, expression: impl Into<String>) -> &mut Self {
        self.default = Some(DefaultValue::Expression(expression.into()));
        self
    }

    /// Sets `DEFAULT CURRENT_TIMESTAMP`.
    pub fn use_current(&mut self) -> &mut Self {
        self.default_raw("CURRENT_TIMESTAMP")
    }

    /// Marks the column unsigned.
    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    /// Makes the column an auto-incrementing primary key.
    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }

    /// Adds a primary key on this column.
    pub fn primary(&mut self) -> &mut Self {
        self.primary = true;
        self
    }

    /// Adds a unique index on this column.
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Adds a plain index on this column.
    pub fn index(&mut self) -> &mut Self {
        self.index = true;
        self
    }

    /// Sets the column comment.
    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    /// Places the column after `column`.
    pub fn after(&mut self, column: impl Into<String>) -> &mut Self {
        self.after = Some(column.into());
        self
    }

    /// Places the column first.
    pub fn first(&mut self) -> &mut Self {
        self.first = true;
        self
    }

    /// Sets the character set.
    pub fn charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the collation.
    pub fn collation(&mut self, collation: impl Into<String>) -> &mut Self {
        self.collation = Some(collation.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_chain() {
        let mut column = ColumnDefinition::new("votes", ColumnType::Integer);
        column.unsigned().nullable().default(0).comment("upvotes");
        assert!(column.unsigned);
        assert!(column.nullable);
        assert_eq!(column.default, Some(DefaultValue::Value(SqlValue::Int(0))));
        assert_eq!(column.comment.as_deref(), Some("upvotes"));
    }

    #[test]
    fn test_columns_are_not_null_by_default() {
        let column = ColumnDefinition::new("name", ColumnType::String(255));
        assert!(!column.nullable);
        assert!(column.default.is_none());
    }
}

//! Clause types accumulated by the query builder.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::value::SqlValue;

/// Comparison operators accepted by `where_op` and `having`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<>`
    LtGt,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl Operator {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::LtGt => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::NotEq),
            "<>" => Ok(Self::LtGt),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "LIKE" => Ok(Self::Like),
            "NOT LIKE" => Ok(Self::NotLike),
            _ => Err(Error::InvalidOperator(s.to_string())),
        }
    }
}

/// Connector written before a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boolean {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Boolean {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Order direction for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (ASC)
    #[default]
    Asc,
    /// Descending order (DESC)
    Desc,
}

impl OrderDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Join flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
    /// `CROSS JOIN`
    Cross,
}

impl JoinKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A join against another table. The condition compares two column
/// references and never carries a bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Join flavour.
    pub kind: JoinKind,
    /// Joined table.
    pub table: String,
    /// `(first, operator, second)`; absent for cross joins.
    pub on: Option<(String, Operator, String)>,
}

impl Join {
    /// Renders the join fragment.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match &self.on {
            Some((first, op, second)) => {
                format!("{} {} ON {first} {op} {second}", self.kind.as_sql(), self.table)
            }
            None => format!("{} {}", self.kind.as_sql(), self.table),
        }
    }
}

/// The predicate part of a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereKind {
    /// `column op value`
    Basic {
        /// Column reference.
        column: String,
        /// Comparison operator.
        operator: Operator,
        /// Bound value.
        value: SqlValue,
    },
    /// `column [NOT] IN (values)`
    In {
        /// Column reference.
        column: String,
        /// Bound values.
        values: Vec<SqlValue>,
        /// `NOT IN` when set.
        negated: bool,
    },
    /// `column IS [NOT] NULL`
    Null {
        /// Column reference.
        column: String,
        /// `IS NOT NULL` when set.
        negated: bool,
    },
    /// `column [NOT] BETWEEN low AND high`
    Between {
        /// Column reference.
        column: String,
        /// Lower bound.
        low: SqlValue,
        /// Upper bound.
        high: SqlValue,
        /// `NOT BETWEEN` when set.
        negated: bool,
    },
}

/// A WHERE clause with its own connector.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    /// Connector written before this clause (ignored for the first one).
    pub boolean: Boolean,
    /// The predicate.
    pub kind: WhereKind,
}

/// A HAVING clause with its own connector.
#[derive(Debug, Clone, PartialEq)]
pub struct Having {
    /// Connector written before this clause (ignored for the first one).
    pub boolean: Boolean,
    /// Column or aggregate expression.
    pub column: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Bound value.
    pub value: SqlValue,
}

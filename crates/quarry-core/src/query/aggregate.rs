//! Aggregate functions substituted into the SELECT list.

/// An aggregate function that can be applied to a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    /// COUNT aggregate
    Count {
        /// Column to count, or "*" for all rows
        column: String,
        /// Whether to count only distinct values
        distinct: bool,
    },
    /// SUM aggregate
    Sum {
        /// Column to sum
        column: String,
    },
    /// AVG aggregate
    Avg {
        /// Column to average
        column: String,
    },
    /// MAX aggregate
    Max {
        /// Column to find maximum
        column: String,
    },
    /// MIN aggregate
    Min {
        /// Column to find minimum
        column: String,
    },
}

impl Aggregate {
    /// Alias the aggregate result is selected under.
    pub const ALIAS: &'static str = "aggregate";

    /// Creates a COUNT(*) aggregate.
    #[must_use]
    pub fn count_all() -> Self {
        Self::Count {
            column: String::from("*"),
            distinct: false,
        }
    }

    /// Creates a COUNT(DISTINCT column) aggregate.
    #[must_use]
    pub fn count_distinct(column: &str) -> Self {
        Self::Count {
            column: column.to_string(),
            distinct: true,
        }
    }

    /// Creates a SUM(column) aggregate.
    #[must_use]
    pub fn sum(column: &str) -> Self {
        Self::Sum {
            column: column.to_string(),
        }
    }

    /// Creates an AVG(column) aggregate.
    #[must_use]
    pub fn avg(column: &str) -> Self {
        Self::Avg {
            column: column.to_string(),
        }
    }

    /// Creates a MAX(column) aggregate.
    #[must_use]
    pub fn max(column: &str) -> Self {
        Self::Max {
            column: column.to_string(),
        }
    }

    /// Creates a MIN(column) aggregate.
    #[must_use]
    pub fn min(column: &str) -> Self {
        Self::Min {
            column: column.to_string(),
        }
    }

    /// Returns whether the aggregate yields a fractional numeric result.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Sum { .. } | Self::Avg { .. })
    }

    /// Returns the bare SQL expression.
    #[must_use]
    pub fn expression(&self) -> String {
        match self {
            Self::Count { column, distinct } => {
                if *distinct {
                    format!("COUNT(DISTINCT {column})")
                } else {
                    format!("COUNT({column})")
                }
            }
            Self::Sum { column } => format!("SUM({column})"),
            Self::Avg { column } => format!("AVG({column})"),
            Self::Max { column } => format!("MAX({column})"),
            Self::Min { column } => format!("MIN({column})"),
        }
    }

    /// Returns the SQL expression, aliased as [`Aggregate::ALIAS`].
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!("{} AS {}", self.expression(), Self::ALIAS)
    }
}

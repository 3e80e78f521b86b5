//! The migration contract and naming convention.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use quarry_schema::SchemaPlan;
use regex::Regex;

use crate::error::{MigrateError, Result};

const NAME_PATTERN: &str = r"^\d{14}_[a-z0-9_]+$";

/// A reversible, named schema change.
///
/// ```rust
/// use quarry_migrate::Migration;
/// use quarry_schema::SchemaPlan;
///
/// struct CreateUsers;
///
/// impl Migration for CreateUsers {
///     fn name(&self) -> &str {
///         "20240101000000_create_users"
///     }
///
///     fn up(&self, schema: &mut SchemaPlan) {
///         schema.create("users", |t| {
///             t.id();
///             t.string("email", 255).unique();
///             t.timestamps();
///         });
///     }
///
///     fn down(&self, schema: &mut SchemaPlan) {
///         schema.drop_if_exists("users");
///     }
/// }
///
/// let mut plan = SchemaPlan::new();
/// CreateUsers.up(&mut plan);
/// assert_eq!(plan.len(), 1);
/// ```
pub trait Migration: Send + Sync {
    /// Unique name, `<YYYYMMDDHHMMSS>_<snake_case>`. Migrations run in
    /// lexical order of this name.
    fn name(&self) -> &str;

    /// Declares the forward schema change.
    fn up(&self, schema: &mut SchemaPlan);

    /// Declares the reverse schema change.
    fn down(&self, schema: &mut SchemaPlan);

    /// Whether to wrap the migration and its ledger write in a transaction.
    /// Ignored on MySQL, where DDL commits implicitly.
    fn within_transaction(&self) -> bool {
        true
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(NAME_PATTERN).expect("valid migration name pattern"))
}

/// Returns whether `name` follows the migration naming convention.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

/// Checks a migration name against the naming convention.
pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(MigrateError::InvalidMigrationName(name.to_string()))
    }
}

/// Builds a migration name from a free-form description, stamped with `now`.
///
/// The description is lowercased and every run of other characters than
/// ASCII letters and digits becomes a single underscore.
#[must_use]
pub fn timestamped_name(description: &str, now: DateTime<Utc>) -> String {
    let mut slug = String::new();
    for c in description.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    let slug = if slug.is_empty() { "migration" } else { slug };
    format!("{}_{slug}", now.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_name_pattern_compiles() {
        assert!(Regex::new(NAME_PATTERN).is_ok());
        assert_eq!(name_pattern().as_str(), NAME_PATTERN);
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("20240101000000_create_users"));
        assert!(is_valid_name("20240101000000_add_2fa"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_name("create_users"));
        assert!(!is_valid_name("2024_create_users"));
        assert!(!is_valid_name("20240101000000_CreateUsers"));
        assert!(!is_valid_name("20240101000000_create-users"));
        assert!(matches!(
            validate_name("0001_initial"),
            Err(MigrateError::InvalidMigrationName(name)) if name == "0001_initial"
        ));
    }

    #[test]
    fn test_timestamped_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            timestamped_name("Create Users table", now),
            "20240309140507_create_users_table"
        );
        assert_eq!(timestamped_name("  add--index!", now), "20240309140507_add_index");
        assert_eq!(timestamped_name("???", now), "20240309140507_migration");
        assert!(is_valid_name(&timestamped_name("Add 2FA", now)));
    }
}

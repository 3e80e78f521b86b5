//! Migrations written as plain SQL files.
//!
//! A file named `<YYYYMMDDHHMMSS>_<snake_case>.sql` holds an up section and
//! an optional down section, each introduced by a marker line:
//!
//! ```sql
//! -- migrate:up
//! CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL);
//!
//! -- migrate:down
//! DROP TABLE users;
//! ```
//!
//! A file without markers is treated as an up section with no down.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use quarry_schema::SchemaPlan;
use tracing::{debug, warn};

use crate::error::{MigrateError, Result};
use crate::migration::{is_valid_name, timestamped_name, Migration};

/// Marker opening the forward section.
pub const UP_MARKER: &str = "-- migrate:up";
/// Marker opening the reverse section.
pub const DOWN_MARKER: &str = "-- migrate:down";

/// A migration loaded from SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlMigration {
    name: String,
    up: String,
    down: String,
}

enum Section {
    Preamble,
    Up,
    Down,
}

impl SqlMigration {
    /// Creates a migration from its name and both SQL sections.
    #[must_use]
    pub fn new(name: impl Into<String>, up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            up: up.into(),
            down: down.into(),
        }
    }

    /// Splits `contents` into up and down sections.
    #[must_use]
    pub fn parse(name: impl Into<String>, contents: &str) -> Self {
        let has_markers = contents.lines().any(|line| {
            let line = line.trim();
            line == UP_MARKER || line == DOWN_MARKER
        });
        if !has_markers {
            return Self::new(name, contents.trim(), "");
        }

        let mut section = Section::Preamble;
        let mut up = Vec::new();
        let mut down = Vec::new();
        for line in contents.lines() {
            match line.trim() {
                UP_MARKER => section = Section::Up,
                DOWN_MARKER => section = Section::Down,
                _ => match section {
                    Section::Preamble => {}
                    Section::Up => up.push(line),
                    Section::Down => down.push(line),
                },
            }
        }
        Self::new(name, up.join("\n").trim(), down.join("\n").trim())
    }

    /// Loads a migration file. The migration is named after the file stem.
    pub fn from_file(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| MigrateError::ParseError {
                path: path.to_path_buf(),
                message: String::from("file name is not valid UTF-8"),
            })?;
        let contents = fs::read_to_string(path)?;
        Ok(Self::parse(name, &contents))
    }

    /// Returns the forward SQL.
    #[must_use]
    pub fn up_sql(&self) -> &str {
        &self.up
    }

    /// Returns the reverse SQL.
    #[must_use]
    pub fn down_sql(&self) -> &str {
        &self.down
    }
}

impl Migration for SqlMigration {
    fn name(&self) -> &str {
        &self.name
    }

    fn up(&self, schema: &mut SchemaPlan) {
        if !self.up.is_empty() {
            schema.raw(&self.up);
        }
    }

    fn down(&self, schema: &mut SchemaPlan) {
        if !self.down.is_empty() {
            schema.raw(&self.down);
        }
    }
}

/// Loads every migration file in `dir`, sorted by name.
///
/// Entries that are not `.sql` files named after the convention are
/// skipped.
pub fn discover(dir: &Path) -> Result<Vec<SqlMigration>> {
    if !dir.is_dir() {
        return Err(MigrateError::MigrationsDirNotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("sql") {
            continue;
        }
        let valid = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(is_valid_name);
        if valid {
            paths.push(path);
        } else {
            warn!(path = %path.display(), "Ignoring file not named <YYYYMMDDHHMMSS>_<name>.sql");
        }
    }
    paths.sort();

    let migrations = paths
        .iter()
        .map(|path| SqlMigration::from_file(path))
        .collect::<Result<Vec<_>>>()?;
    debug!(dir = %dir.display(), count = migrations.len(), "Discovered SQL migrations");
    Ok(migrations)
}

/// Contents of a freshly generated migration file.
#[must_use]
pub fn skeleton() -> String {
    format!("{UP_MARKER}\n\n\n{DOWN_MARKER}\n\n")
}

/// Writes a new, empty migration file into `dir` and returns its path.
pub fn create_file(dir: &Path, description: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let name = timestamped_name(description, Utc::now());
    let path = dir.join(format!("{name}.sql"));
    if path.exists() {
        return Err(MigrateError::MigrationExists(path));
    }
    fs::write(&path, skeleton())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let migration = SqlMigration::parse(
            "20240101000000_create_users",
            "-- leading comment\n-- migrate:up\nCREATE TABLE users (id INTEGER);\n\n-- migrate:down\nDROP TABLE users;\n",
        );
        assert_eq!(migration.name(), "20240101000000_create_users");
        assert_eq!(migration.up_sql(), "CREATE TABLE users (id INTEGER);");
        assert_eq!(migration.down_sql(), "DROP TABLE users;");
    }

    #[test]
    fn test_parse_without_markers_is_up_only() {
        let migration = SqlMigration::parse("20240101000000_seed", "INSERT INTO t VALUES (1);\n");
        assert_eq!(migration.up_sql(), "INSERT INTO t VALUES (1);");
        assert_eq!(migration.down_sql(), "");

        let mut plan = SchemaPlan::new();
        migration.down(&mut plan);
        assert!(plan.is_empty());
        migration.up(&mut plan);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_skeleton_round_trips_to_empty_sections() {
        let migration = SqlMigration::parse("20240101000000_empty", &skeleton());
        assert_eq!(migration.up_sql(), "");
        assert_eq!(migration.down_sql(), "");
    }
}

//! # quarry-schema
//!
//! Table blueprints and DDL grammars for MySQL, PostgreSQL and SQLite.
//!
//! A [`Blueprint`] records column definitions and structural commands for
//! one table. A [`SchemaGrammar`] compiles it into the statements its
//! engine needs, and [`Schema`] runs them on a connection.
//!
//! ```rust
//! use quarry_core::Driver;
//! use quarry_schema::{grammar_for, Blueprint, Operation};
//!
//! let mut table = Blueprint::new("widgets");
//! table.increments("id");
//! table.string("name", 255).nullable();
//!
//! let statements = grammar_for(Driver::Sqlite).compile(&table, Operation::Create);
//! assert_eq!(
//!     statements,
//!     vec![
//!         "CREATE TABLE \"widgets\" (\"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
//!          \"name\" VARCHAR NULL)"
//!     ]
//! );
//! ```

pub mod blueprint;
pub mod builder;
pub mod column;
pub mod command;
pub mod foreign_key;
pub mod grammar;
pub mod plan;

pub use blueprint::Blueprint;
pub use builder::Schema;
pub use column::{ColumnDefinition, ColumnType, DefaultValue};
pub use command::{Command, IndexCommand};
pub use foreign_key::{ForeignKeyAction, ForeignKeyBuilder, ForeignKeyDefinition};
pub use grammar::{
    grammar_for, MySqlGrammar, Operation, PostgresGrammar, SchemaGrammar, SqliteGrammar,
};
pub use plan::{SchemaOperation, SchemaPlan};

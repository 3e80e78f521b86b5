//! # quarry-orm
//!
//! Active-record models on top of the quarry query builder.
//!
//! This crate provides:
//! - `Model` trait describing a table, its key, guards, casts and visibility
//! - `Record` holding one row's attributes with dirty tracking
//! - `ModelQuery` for chainable queries that hydrate records
//! - `Cast` for typed attribute reads and writes
//!
//! ## Quick Start
//!
//! ```ignore
//! use quarry_core::{row, Connection, ConnectionConfig, Operator};
//! use quarry_orm::{Cast, Model};
//!
//! struct Post;
//!
//! impl Model for Post {
//!     const TABLE: &'static str = "posts";
//!     const FILLABLE: &'static [&'static str] = &["title", "views"];
//!     const CASTS: &'static [(&'static str, Cast)] = &[("views", Cast::Int)];
//! }
//!
//! async fn example(conn: &Connection) -> quarry_orm::Result<()> {
//!     let mut post = Post::create(conn, row! { "title" => "Hello", "views" => 0 }).await?;
//!
//!     post.set("views", 10)?;
//!     post.save(conn).await?;
//!
//!     let popular = Post::where_op(conn, "views", Operator::Gt, 5)
//!         .latest()
//!         .get()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Saving
//!
//! A new record is inserted and receives its generated key. A loaded
//! record only writes the attributes that changed since it was read; when
//! nothing changed, `save` issues no statement at all.

pub mod cast;
pub mod error;
pub mod model;
pub mod query;
pub mod record;

pub use cast::Cast;
pub use error::{OrmError, Result};
pub use model::{Accessor, Model, Mutator};
pub use query::ModelQuery;
pub use record::{Attributes, Record, CREATED_AT, UPDATED_AT};

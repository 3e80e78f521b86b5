//! Model instances.
//!
//! A [`Record`] holds the current attributes of one row together with a
//! snapshot of what was last read from or written to the store. Comparing
//! the two gives the dirty set that `save` writes.

use std::fmt;
use std::marker::PhantomData;

use chrono::{SubsecRound, Utc};
use indexmap::IndexMap;
use quarry_core::{Connection, Row, SqlValue, ToSqlValue};
use tracing::debug;

use crate::error::{OrmError, Result};
use crate::model::Model;

/// Ordered attribute map.
pub type Attributes = IndexMap<String, SqlValue>;

/// Creation timestamp column.
pub const CREATED_AT: &str = "created_at";
/// Update timestamp column.
pub const UPDATED_AT: &str = "updated_at";

/// One row of a model's table.
pub struct Record<M> {
    attributes: Attributes,
    original: Attributes,
    exists: bool,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Record<M> {
    fn clone(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            original: self.original.clone(),
            exists: self.exists,
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Record<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("model", &M::TABLE)
            .field("attributes", &self.attributes)
            .field("exists", &self.exists)
            .finish()
    }
}

impl<M: Model> Default for Record<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Record<M> {
    /// Creates an empty, unsaved record.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attributes: Attributes::new(),
            original: Attributes::new(),
            exists: false,
            _model: PhantomData,
        }
    }

    /// Creates a record for a row read from the store.
    #[must_use]
    pub fn from_row(row: Row) -> Self {
        Self {
            original: row.clone(),
            attributes: row,
            exists: true,
            _model: PhantomData,
        }
    }

    // Attribute access

    /// Mass-assigns `attributes`, skipping those the model guards.
    pub fn fill(&mut self, attributes: Attributes) -> Result<&mut Self> {
        for (name, value) in attributes {
            if M::is_fillable(&name) {
                self.set(&name, value)?;
            } else {
                debug!(model = M::TABLE, attribute = %name, "Skipping guarded attribute");
            }
        }
        Ok(self)
    }

    /// Assigns `attributes` without consulting the guard.
    pub fn force_fill(&mut self, attributes: Attributes) -> Result<&mut Self> {
        for (name, value) in attributes {
            self.set(&name, value)?;
        }
        Ok(self)
    }

    /// Reads an attribute: its accessor if one is registered, otherwise the
    /// stored value with the declared cast applied. Absent attributes read
    /// as `Null`.
    pub fn get(&self, name: &str) -> Result<SqlValue> {
        if let Some((_, accessor)) = M::ACCESSORS.iter().find(|(n, _)| *n == name) {
            return accessor(self);
        }
        let value = self.raw(name).unwrap_or(&SqlValue::Null);
        match M::cast_for(name) {
            Some(cast) => cast.read(name, value),
            None => Ok(value.clone()),
        }
    }

    /// Writes an attribute: through its mutator if one is registered,
    /// otherwise stored in the declared cast's storage form.
    pub fn set(&mut self, name: &str, value: impl ToSqlValue) -> Result<()> {
        let value = value.to_sql_value();
        if let Some((_, mutator)) = M::MUTATORS.iter().find(|(n, _)| *n == name) {
            return mutator(self, value);
        }
        let value = match M::cast_for(name) {
            Some(cast) => cast.write(name, value)?,
            None => value,
        };
        self.set_raw(name, value);
        Ok(())
    }

    /// Returns the stored value, bypassing accessors and casts.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&SqlValue> {
        self.attributes.get(name)
    }

    /// Stores a value as-is, bypassing mutators and casts.
    pub fn set_raw(&mut self, name: &str, value: SqlValue) {
        self.attributes.insert(name.to_string(), value);
    }

    /// Returns the stored attributes.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns the value last synced with the store.
    #[must_use]
    pub fn original(&self, name: &str) -> Option<&SqlValue> {
        self.original.get(name)
    }

    /// Returns the attributes that differ from the last synced state.
    #[must_use]
    pub fn dirty(&self) -> Attributes {
        self.attributes
            .iter()
            .filter(|&(name, value)| self.original.get(name.as_str()) != Some(value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Returns whether any attribute changed since the last sync.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.attributes
            .iter()
            .any(|(name, value)| self.original.get(name.as_str()) != Some(value))
    }

    /// Returns whether the record is persisted.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.exists
    }

    /// Returns the primary key value, if set.
    #[must_use]
    pub fn key(&self) -> Option<&SqlValue> {
        self.raw(M::PRIMARY_KEY).filter(|value| !value.is_null())
    }

    fn key_for_query(&self) -> Result<SqlValue> {
        self.original
            .get(M::PRIMARY_KEY)
            .filter(|value| !value.is_null())
            .or_else(|| self.key())
            .cloned()
            .ok_or(OrmError::MissingKey {
                model: M::TABLE,
                key: M::PRIMARY_KEY,
            })
    }

    /// Marks the current attributes as the synced state.
    pub fn sync_original(&mut self) {
        self.original = self.attributes.clone();
    }

    // Persistence

    /// Inserts or updates the record. Returns whether a statement ran; an
    /// existing record with nothing dirty is left alone.
    pub async fn save(&mut self, conn: &Connection) -> Result<bool> {
        if self.exists {
            self.perform_update(conn).await
        } else {
            self.perform_insert(conn).await?;
            Ok(true)
        }
    }

    async fn perform_insert(&mut self, conn: &Connection) -> Result<()> {
        if M::TIMESTAMPS {
            let now = current_timestamp();
            if self.attribute_is_unset(CREATED_AT) {
                self.set_raw(CREATED_AT, now.clone());
            }
            self.set_raw(UPDATED_AT, now);
        }

        let query = conn.table(M::TABLE);
        if M::INCREMENTING {
            let id = query
                .insert_get_id_with_key(&self.attributes, M::PRIMARY_KEY)
                .await?;
            self.set_raw(M::PRIMARY_KEY, SqlValue::Int(id));
        } else {
            query.insert(&self.attributes).await?;
        }
        debug!(model = M::TABLE, "Inserted record");

        self.exists = true;
        self.sync_original();
        Ok(())
    }

    async fn perform_update(&mut self, conn: &Connection) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        if M::TIMESTAMPS {
            self.set_raw(UPDATED_AT, current_timestamp());
        }

        let key = self.key_for_query()?;
        let dirty = self.dirty();
        conn.table(M::TABLE)
            .where_eq(M::PRIMARY_KEY, key)
            .update(&dirty)
            .await?;
        debug!(model = M::TABLE, columns = dirty.len(), "Updated record");

        self.sync_original();
        Ok(true)
    }

    fn attribute_is_unset(&self, name: &str) -> bool {
        self.raw(name).map_or(true, SqlValue::is_null)
    }

    /// Deletes the record by primary key. Returns `false` without touching
    /// the store when the record was never persisted. The attributes stay
    /// readable afterwards.
    pub async fn delete(&mut self, conn: &Connection) -> Result<bool> {
        if !self.exists {
            return Ok(false);
        }
        let key = self.key_for_query()?;
        conn.table(M::TABLE)
            .where_eq(M::PRIMARY_KEY, key)
            .delete()
            .await?;
        self.exists = false;
        Ok(true)
    }

    /// Reloads every attribute from the store.
    pub async fn refresh(&mut self, conn: &Connection) -> Result<()> {
        let key = self.key_for_query()?;
        let row = conn
            .table(M::TABLE)
            .where_eq(M::PRIMARY_KEY, &key)
            .first()
            .await?
            .ok_or_else(|| OrmError::ModelNotFound {
                model: M::TABLE,
                key: key.to_sql_inline(),
            })?;
        self.attributes = row;
        self.exists = true;
        self.sync_original();
        Ok(())
    }

    // Serialization

    fn is_visible(name: &str) -> bool {
        if M::HIDDEN.iter().any(|hidden| *hidden == name) {
            return false;
        }
        M::VISIBLE.is_empty() || M::VISIBLE.iter().any(|visible| *visible == name)
    }

    /// Returns the visible attributes, read through accessors and casts.
    pub fn to_array(&self) -> Result<Attributes> {
        self.attributes
            .keys()
            .filter(|name| Self::is_visible(name))
            .map(|name| self.get(name).map(|value| (name.clone(), value)))
            .collect()
    }

    /// Returns the visible attributes as a JSON object.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut object = serde_json::Map::new();
        for (name, value) in self.to_array()? {
            object.insert(name, serde_json::to_value(&value)?);
        }
        Ok(serde_json::Value::Object(object))
    }
}

fn current_timestamp() -> SqlValue {
    SqlValue::DateTime(Utc::now().naive_utc().trunc_subsecs(0))
}

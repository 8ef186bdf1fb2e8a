//! # Schema Registry
//!
//! Content-addressed store of validated schemas. A schema's id is derived
//! from its canonical form, so registration is idempotent: registering a
//! byte-identical schema again returns the same id and leaves the stored
//! schema untouched.
//!
//! Registered schemas are immutable and handed out as `Arc<Schema>`. The
//! lock is `parking_lot` and is never held across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use imprint_core::SchemaId;

use crate::error::SchemaError;
use crate::schema::Schema;

/// Thread-safe, cloneable schema registry.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Arc<RwLock<HashMap<SchemaId, Arc<Schema>>>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a schema, returning its content-derived id.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema is structurally invalid or
    /// cannot be canonicalized.
    pub fn register(&self, schema: Schema) -> Result<SchemaId, SchemaError> {
        schema.validate()?;
        let id = schema.id()?;
        let mut guard = self.schemas.write();
        if guard.contains_key(&id) {
            tracing::debug!(schema_id = %id, name = %schema.name, "schema already registered");
            return Ok(id);
        }
        tracing::info!(
            schema_id = %id,
            name = %schema.name,
            version = schema.version,
            leaves = schema.leaf_count(),
            "schema registered"
        );
        guard.insert(id, Arc::new(schema));
        Ok(id)
    }

    /// Look up a registered schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownSchema`] if no schema has this id.
    pub fn resolve(&self, id: &SchemaId) -> Result<Arc<Schema>, SchemaError> {
        self.schemas
            .read()
            .get(id)
            .cloned()
            .ok_or(SchemaError::UnknownSchema(*id))
    }

    /// Whether a schema with this id is registered.
    pub fn contains(&self, id: &SchemaId) -> bool {
        self.schemas.read().contains_key(id)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

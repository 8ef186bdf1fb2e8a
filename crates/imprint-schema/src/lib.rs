//! # imprint-schema: Schemas, Registry, Records
//!
//! A schema fixes the property layout that an asset record is fingerprinted
//! against. Property order is significant: it determines the leaf order of
//! the imprint tree, so a schema version always yields the same layout.
//!
//! - [`Schema`] / [`Property`]: ordered property declarations, with inline
//!   nested sub-schemas flattened depth-first into [`LeafSlot`]s.
//! - [`SchemaRegistry`]: idempotent, content-addressed, thread-safe store.
//! - [`AssetRecord`]: concrete values plus recursive conformance checks.

pub mod error;
pub mod record;
pub mod registry;
pub mod schema;

pub use error::{KindMismatch, RecordSchemaMismatch, SchemaError};
pub use record::{AssetRecord, FieldValue};
pub use registry::SchemaRegistry;
pub use schema::{LeafSlot, Property, PropertyPath, Schema, ValueKind};

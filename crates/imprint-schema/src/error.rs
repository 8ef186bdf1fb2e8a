//! # Schema and Record Errors
//!
//! [`SchemaError`] is raised at registration time and is fatal to that
//! schema. [`RecordSchemaMismatch`] is raised when a record does not conform
//! to the schema it is fingerprinted against; it lists every offending path
//! so the caller can fix the record in one pass.

use std::fmt;

use thiserror::Error;

use imprint_core::{CanonicalizationError, SchemaId};

use crate::schema::{PropertyPath, ValueKind};

/// Schema definition or lookup failure.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema (or nested sub-schema at the root) declares no properties.
    #[error("schema declares no properties")]
    EmptySchema,

    /// A property has an empty name.
    #[error("property at {path} has an empty name")]
    EmptyPropertyName {
        /// Path of the parent, with the offending position appended as `""`.
        path: PropertyPath,
    },

    /// A property name contains the path separator.
    #[error("property name {path} must not contain '.'")]
    InvalidPropertyName {
        /// Path of the offending property.
        path: PropertyPath,
    },

    /// Two properties at the same level share a name.
    #[error("duplicate property {path}")]
    DuplicateProperty {
        /// Path of the duplicated property.
        path: PropertyPath,
    },

    /// A nested property declares no sub-properties.
    #[error("nested property {path} declares no sub-properties")]
    EmptyNested {
        /// Path of the empty nested property.
        path: PropertyPath,
    },

    /// A scalar property declares sub-properties.
    #[error("{kind} property {path} must not declare sub-properties")]
    UnexpectedChildren {
        /// Path of the scalar property.
        path: PropertyPath,
        /// Its declared kind.
        kind: ValueKind,
    },

    /// The flattened leaf count does not fit the `u32` leaf index space.
    #[error("schema flattens to {0} leaves, exceeding the u32 index space")]
    TooManyLeaves(usize),

    /// No schema is registered under this id.
    #[error("unknown schema {0}")]
    UnknownSchema(SchemaId),

    /// Schema could not be canonicalized for hashing.
    #[error("schema canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A schema document could not be parsed.
    #[error("schema document parse error: {0}")]
    Parse(String),
}

/// A property whose value kind differs from the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindMismatch {
    /// Path of the property.
    pub path: PropertyPath,
    /// Kind declared by the schema.
    pub expected: ValueKind,
    /// Description of what was found.
    pub found: String,
}

/// A record does not conform to its schema.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSchemaMismatch {
    /// Schema properties absent from the record.
    pub missing: Vec<PropertyPath>,
    /// Record properties the schema does not declare.
    pub unexpected: Vec<PropertyPath>,
    /// Properties present with the wrong kind of value.
    pub wrong_kind: Vec<KindMismatch>,
}

impl RecordSchemaMismatch {
    /// Whether no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.wrong_kind.is_empty()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), RecordSchemaMismatch> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for RecordSchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record does not match schema")?;
        let mut sep = ":";
        if !self.missing.is_empty() {
            let list: Vec<String> = self.missing.iter().map(|p| p.to_string()).collect();
            write!(f, "{sep} missing [{}]", list.join(", "))?;
            sep = ";";
        }
        if !self.unexpected.is_empty() {
            let list: Vec<String> = self.unexpected.iter().map(|p| p.to_string()).collect();
            write!(f, "{sep} unexpected [{}]", list.join(", "))?;
            sep = ";";
        }
        if !self.wrong_kind.is_empty() {
            let list: Vec<String> = self
                .wrong_kind
                .iter()
                .map(|m| format!("{} (expected {}, found {})", m.path, m.expected, m.found))
                .collect();
            write!(f, "{sep} wrong kind [{}]", list.join(", "))?;
        }
        Ok(())
    }
}

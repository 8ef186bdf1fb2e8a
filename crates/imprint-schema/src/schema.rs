//! # Asset Schemas
//!
//! A [`Schema`] is an ordered list of named properties. Scalar properties
//! become leaves of the imprint tree; `nested` properties carry an inline
//! ordered sub-schema whose leaves are flattened depth-first in place.
//!
//! ```text
//! name: string            -> leaf 0, path [name]
//! owner: nested
//!   handle: string        -> leaf 1, path [owner, handle]
//!   since: number         -> leaf 2, path [owner, since]
//! image: bytes            -> leaf 3, path [image]
//! ```
//!
//! The leaf layout is a pure function of the schema, so the same schema
//! version always yields the same ordering.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use imprint_core::{sha256_digest, CanonicalBytes, LeafKind, SchemaId};

use crate::error::SchemaError;

/// The declared kind of a schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// UTF-8 text leaf.
    String,
    /// Raw bytes leaf.
    Bytes,
    /// Signed 64-bit integer leaf.
    Number,
    /// Inline sub-schema.
    Nested,
}

impl ValueKind {
    /// The leaf kind for scalar kinds; `None` for `Nested`.
    pub fn leaf_kind(&self) -> Option<LeafKind> {
        match self {
            Self::String => Some(LeafKind::String),
            Self::Bytes => Some(LeafKind::Bytes),
            Self::Number => Some(LeafKind::Number),
            Self::Nested => None,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Number => "number",
            Self::Nested => "nested",
        }
    }
}

impl From<LeafKind> for ValueKind {
    fn from(kind: LeafKind) -> Self {
        match kind {
            LeafKind::String => Self::String,
            LeafKind::Bytes => Self::Bytes,
            LeafKind::Number => Self::Number,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sequence of property names from the schema root to a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    /// Build a path from its segments.
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Parse a dotted path such as `owner.handle`.
    pub fn from_dotted(s: &str) -> Self {
        Self(
            s.split('.')
                .filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// The path segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    /// Whether `self` equals `prefix` or lies underneath it.
    pub fn starts_with(&self, prefix: &PropertyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Whether this is the root (empty) path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for PropertyPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_dotted(s))
    }
}

impl From<&str> for PropertyPath {
    fn from(s: &str) -> Self {
        Self::from_dotted(s)
    }
}

/// A named property of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name, unique within its level.
    pub name: String,
    /// Declared kind.
    pub kind: ValueKind,
    /// Sub-properties; non-empty exactly when `kind` is `Nested`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

impl Property {
    /// A scalar property.
    pub fn scalar(name: impl Into<String>, kind: LeafKind) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            properties: Vec::new(),
        }
    }

    /// A string property.
    pub fn string(name: impl Into<String>) -> Self {
        Self::scalar(name, LeafKind::String)
    }

    /// A bytes property.
    pub fn bytes(name: impl Into<String>) -> Self {
        Self::scalar(name, LeafKind::Bytes)
    }

    /// A number property.
    pub fn number(name: impl Into<String>) -> Self {
        Self::scalar(name, LeafKind::Number)
    }

    /// A nested property with an inline sub-schema.
    pub fn nested(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::Nested,
            properties,
        }
    }
}

/// One leaf position of a schema's flattened layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSlot {
    /// Position in the imprint tree.
    pub index: u32,
    /// Path from the schema root.
    pub path: PropertyPath,
    /// Scalar kind held at this position.
    pub kind: LeafKind,
}

/// An ordered asset schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name.
    pub name: String,
    /// Schema version; part of the schema's identity.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Ordered top-level properties.
    pub properties: Vec<Property>,
}

fn default_version() -> u32 {
    1
}

impl Schema {
    /// Build a schema. Call [`Schema::validate`] (or register it) before use.
    pub fn new(name: impl Into<String>, version: u32, properties: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            version,
            properties,
        }
    }

    /// Parse a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] on malformed input.
    pub fn from_json_str(s: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(s).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    /// Parse a schema from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] on malformed input.
    pub fn from_yaml_str(s: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(s).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    /// Check structural validity: non-empty, named, unique per level,
    /// well-formed nesting, and a leaf count that fits `u32`.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.properties.is_empty() {
            return Err(SchemaError::EmptySchema);
        }
        validate_level(&self.properties, &PropertyPath::default())?;
        let count = self.leaf_slots().len();
        if u32::try_from(count).is_err() {
            return Err(SchemaError::TooManyLeaves(count));
        }
        Ok(())
    }

    /// Content-derived id: SHA-256 over the JCS canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Canonicalization`] if the schema cannot be
    /// canonicalized.
    pub fn id(&self) -> Result<SchemaId, SchemaError> {
        let canonical = CanonicalBytes::new(self)?;
        Ok(SchemaId::from_digest(sha256_digest(&canonical)))
    }

    /// The flattened leaf layout, in tree order.
    pub fn leaf_slots(&self) -> Vec<LeafSlot> {
        let mut out = Vec::new();
        flatten(&self.properties, &PropertyPath::default(), &mut out);
        out
    }

    /// Number of leaves in the flattened layout.
    pub fn leaf_count(&self) -> usize {
        self.leaf_slots().len()
    }

    /// The slot at exactly `path`, if it names a leaf.
    pub fn leaf_slot(&self, path: &PropertyPath) -> Option<LeafSlot> {
        self.leaf_slots().into_iter().find(|s| &s.path == path)
    }

    /// Leaf paths in tree order.
    pub fn leaf_paths(&self) -> Vec<PropertyPath> {
        self.leaf_slots().into_iter().map(|s| s.path).collect()
    }

    /// Tree index of the leaf at `path`.
    pub fn leaf_index(&self, path: &PropertyPath) -> Option<u32> {
        self.leaf_slot(path).map(|s| s.index)
    }

    /// Scalar kind of the leaf at `path`.
    pub fn leaf_kind(&self, path: &PropertyPath) -> Option<LeafKind> {
        self.leaf_slot(path).map(|s| s.kind)
    }

    /// All leaf slots at or under `prefix`.
    pub fn slots_under(&self, prefix: &PropertyPath) -> Vec<LeafSlot> {
        self.leaf_slots()
            .into_iter()
            .filter(|s| s.path.starts_with(prefix))
            .collect()
    }
}

fn validate_level(properties: &[Property], parent: &PropertyPath) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for prop in properties {
        if prop.name.is_empty() {
            return Err(SchemaError::EmptyPropertyName {
                path: parent.child(""),
            });
        }
        let path = parent.child(&prop.name);
        if prop.name.contains('.') {
            return Err(SchemaError::InvalidPropertyName { path });
        }
        if !seen.insert(prop.name.as_str()) {
            return Err(SchemaError::DuplicateProperty { path });
        }
        match prop.kind {
            ValueKind::Nested => {
                if prop.properties.is_empty() {
                    return Err(SchemaError::EmptyNested { path });
                }
                validate_level(&prop.properties, &path)?;
            }
            kind => {
                if !prop.properties.is_empty() {
                    return Err(SchemaError::UnexpectedChildren { path, kind });
                }
            }
        }
    }
    Ok(())
}

fn flatten(properties: &[Property], parent: &PropertyPath, out: &mut Vec<LeafSlot>) {
    for prop in properties {
        let path = parent.child(&prop.name);
        match prop.kind.leaf_kind() {
            Some(kind) => {
                let index = u32::try_from(out.len()).unwrap_or(u32::MAX);
                out.push(LeafSlot { index, path, kind });
            }
            None => flatten(&prop.properties, &path, out),
        }
    }
}

//! # Asset Records
//!
//! An [`AssetRecord`] maps property names to concrete values: a scalar
//! [`LeafValue`] or a nested record. Conformance against a [`Schema`] is
//! checked recursively and reports every offending path in one
//! [`RecordSchemaMismatch`] rather than stopping at the first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use imprint_core::{LeafKind, LeafValue};

use crate::error::{KindMismatch, RecordSchemaMismatch};
use crate::schema::{Property, PropertyPath, Schema, ValueKind};

/// The value of one record property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A scalar value.
    Leaf(LeafValue),
    /// A nested record for a `nested` property.
    Nested(AssetRecord),
}

impl FieldValue {
    fn describe(&self) -> String {
        match self {
            Self::Leaf(v) => v.kind().to_string(),
            Self::Nested(_) => ValueKind::Nested.to_string(),
        }
    }
}

impl From<LeafValue> for FieldValue {
    fn from(v: LeafValue) -> Self {
        Self::Leaf(v)
    }
}

impl From<AssetRecord> for FieldValue {
    fn from(r: AssetRecord) -> Self {
        Self::Nested(r)
    }
}

/// A concrete asset record keyed by property name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl AssetRecord {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a property, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// The value of a top-level property.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Follow a path through nested records.
    pub fn get_path(&self, path: &PropertyPath) -> Option<&FieldValue> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.fields.get(first)?;
        for seg in rest {
            match current {
                FieldValue::Nested(inner) => current = inner.fields.get(seg)?,
                FieldValue::Leaf(_) => return None,
            }
        }
        Some(current)
    }

    /// Number of top-level properties.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no properties.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check that this record has exactly the schema's properties with
    /// matching kinds, recursively.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordSchemaMismatch`] listing every offending path.
    pub fn check_conformance(&self, schema: &Schema) -> Result<(), RecordSchemaMismatch> {
        self.leaf_values(schema).map(|_| ())
    }

    /// The record's leaf values in the schema's flattened leaf order.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordSchemaMismatch`] listing every offending path.
    pub fn leaf_values(&self, schema: &Schema) -> Result<Vec<&LeafValue>, RecordSchemaMismatch> {
        let mut mismatch = RecordSchemaMismatch::default();
        let mut out = Vec::new();
        collect(
            self,
            &schema.properties,
            &PropertyPath::default(),
            &mut out,
            &mut mismatch,
        );
        mismatch.into_result().map(|()| out)
    }

    /// Build a record from plain JSON, guided by the schema.
    ///
    /// Strings map to `string`, integers to `number`, and `bytes`
    /// properties are read from hex strings (optionally `0x`-prefixed).
    ///
    /// # Errors
    ///
    /// Returns a [`RecordSchemaMismatch`] listing every offending path.
    pub fn from_json(schema: &Schema, value: &Value) -> Result<Self, RecordSchemaMismatch> {
        let mut mismatch = RecordSchemaMismatch::default();
        let record = from_json_level(
            &schema.properties,
            value,
            &PropertyPath::default(),
            &mut mismatch,
        );
        mismatch.into_result().map(|()| record)
    }
}

fn collect<'a>(
    record: &'a AssetRecord,
    properties: &[Property],
    parent: &PropertyPath,
    out: &mut Vec<&'a LeafValue>,
    mismatch: &mut RecordSchemaMismatch,
) {
    for prop in properties {
        let path = parent.child(&prop.name);
        let Some(value) = record.fields.get(&prop.name) else {
            mismatch.missing.push(path);
            continue;
        };
        match (prop.kind.leaf_kind(), value) {
            (Some(kind), FieldValue::Leaf(leaf)) if leaf.kind() == kind => out.push(leaf),
            (None, FieldValue::Nested(inner)) => {
                collect(inner, &prop.properties, &path, out, mismatch);
            }
            _ => mismatch.wrong_kind.push(KindMismatch {
                path,
                expected: prop.kind,
                found: value.describe(),
            }),
        }
    }
    for name in record.fields.keys() {
        if !properties.iter().any(|p| &p.name == name) {
            mismatch.unexpected.push(parent.child(name));
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(_) => "non-integer number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn from_json_level(
    properties: &[Property],
    value: &Value,
    parent: &PropertyPath,
    mismatch: &mut RecordSchemaMismatch,
) -> AssetRecord {
    let mut record = AssetRecord::new();
    let Some(obj) = value.as_object() else {
        mismatch.wrong_kind.push(KindMismatch {
            path: parent.clone(),
            expected: ValueKind::Nested,
            found: json_kind(value).to_string(),
        });
        return record;
    };

    for prop in properties {
        let path = parent.child(&prop.name);
        let Some(field) = obj.get(&prop.name) else {
            mismatch.missing.push(path);
            continue;
        };
        let parsed: Option<FieldValue> = match (prop.kind.leaf_kind(), field) {
            (Some(LeafKind::String), Value::String(s)) => Some(LeafValue::String(s.clone()).into()),
            (Some(LeafKind::Number), Value::Number(n)) => n.as_i64().map(|n| LeafValue::Number(n).into()),
            (Some(LeafKind::Bytes), Value::String(s)) => {
                hex::decode(s.strip_prefix("0x").unwrap_or(s))
                    .ok()
                    .map(|b| LeafValue::Bytes(b).into())
            }
            (None, Value::Object(_)) => Some(
                from_json_level(&prop.properties, field, &path, mismatch).into(),
            ),
            _ => None,
        };
        match parsed {
            Some(v) => {
                record.insert(prop.name.clone(), v);
            }
            None => {
                let found = match (prop.kind, field) {
                    (ValueKind::Bytes, Value::String(_)) => "non-hex string".to_string(),
                    _ => json_kind(field).to_string(),
                };
                mismatch.wrong_kind.push(KindMismatch {
                    path,
                    expected: prop.kind,
                    found,
                });
            }
        }
    }
    for name in obj.keys() {
        if !properties.iter().any(|p| &p.name == name) {
            mismatch.unexpected.push(parent.child(name));
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(
            "artwork",
            1,
            vec![
                Property::string("name"),
                Property::nested(
                    "owner",
                    vec![Property::string("handle"), Property::number("since")],
                ),
                Property::bytes("image"),
            ],
        )
    }

    fn record() -> AssetRecord {
        AssetRecord::new()
            .with("name", LeafValue::from("Lighthouse"))
            .with(
                "owner",
                AssetRecord::new()
                    .with("handle", LeafValue::from("@ada"))
                    .with("since", LeafValue::Number(2021)),
            )
            .with("image", LeafValue::Bytes(vec![0xca, 0xfe]))
    }

    #[test]
    fn conforming_record_yields_leaves_in_schema_order() {
        let r = record();
        let s = schema();
        let leaves = r.leaf_values(&s).unwrap();
        assert_eq!(
            leaves,
            vec![
                &LeafValue::from("Lighthouse"),
                &LeafValue::from("@ada"),
                &LeafValue::Number(2021),
                &LeafValue::Bytes(vec![0xca, 0xfe]),
            ]
        );
    }

    #[test]
    fn reports_every_violation() {
        let r = AssetRecord::new()
            .with("name", LeafValue::Number(1))
            .with("owner", AssetRecord::new().with("handle", LeafValue::from("x")))
            .with("extra", LeafValue::from("y"));
        let err = r.check_conformance(&schema()).unwrap_err();
        assert_eq!(
            err.missing,
            vec![
                PropertyPath::from_dotted("owner.since"),
                PropertyPath::from_dotted("image"),
            ]
        );
        assert_eq!(err.unexpected, vec![PropertyPath::from_dotted("extra")]);
        assert_eq!(err.wrong_kind.len(), 1);
        assert_eq!(err.wrong_kind[0].path, PropertyPath::from_dotted("name"));
        assert_eq!(err.wrong_kind[0].expected, ValueKind::String);
        assert_eq!(err.wrong_kind[0].found, "number");
    }

    #[test]
    fn leaf_in_place_of_nested_is_wrong_kind() {
        let r = record().with("owner", LeafValue::from("flat"));
        let err = r.check_conformance(&schema()).unwrap_err();
        assert_eq!(err.wrong_kind[0].expected, ValueKind::Nested);
        assert_eq!(err.wrong_kind[0].found, "string");
    }

    #[test]
    fn from_json_builds_conforming_record() {
        let v = json!({
            "name": "Lighthouse",
            "owner": {"handle": "@ada", "since": 2021},
            "image": "0xcafe"
        });
        let r = AssetRecord::from_json(&schema(), &v).unwrap();
        assert_eq!(r, record());
    }

    #[test]
    fn from_json_accumulates_errors() {
        let v = json!({
            "name": 3,
            "owner": {"handle": "@ada", "since": 1.5},
            "image": "not-hex",
            "bonus": true
        });
        let err = AssetRecord::from_json(&schema(), &v).unwrap_err();
        let paths: Vec<String> = err.wrong_kind.iter().map(|m| m.path.to_string()).collect();
        assert_eq!(paths, ["name", "owner.since", "image"]);
        assert_eq!(err.wrong_kind[2].found, "non-hex string");
        assert_eq!(err.unexpected, vec![PropertyPath::from_dotted("bonus")]);
    }

    #[test]
    fn get_path_walks_nested_records() {
        let r = record();
        assert_eq!(
            r.get_path(&PropertyPath::from_dotted("owner.since")),
            Some(&FieldValue::Leaf(LeafValue::Number(2021)))
        );
        assert!(r.get_path(&PropertyPath::from_dotted("name.x")).is_none());
    }

    #[test]
    fn serde_round_trip_keeps_nesting() {
        let r = record();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["owner"]["since"], json!({"kind": "number", "value": 2021}));
        let back: AssetRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed Property Values
//!
//! Resource properties are either literals or references to other resources.
//! References double as implicit dependency edges: a resource that reads
//! another resource's attribute cannot be realized before it.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::domain::LogicalId;

/// A property value inside a resource declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<PropertyValue>),
    Map(IndexMap<String, PropertyValue>),
    /// The primary identifier of another resource in the same stack
    Ref(LogicalId),
    /// A named attribute of another resource in the same stack
    GetAtt(LogicalId, String),
    /// Concatenation of parts with a separator
    Join(String, Vec<PropertyValue>),
    /// A value exported by another stack
    ImportValue(String),
}

impl PropertyValue {
    /// Build a map value from key/value pairs, preserving order
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list value
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<PropertyValue>,
        I: IntoIterator<Item = V>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Reference to another resource
    pub fn reference(id: &LogicalId) -> Self {
        Self::Ref(id.clone())
    }

    /// Attribute of another resource
    pub fn attribute(id: &LogicalId, attribute: impl Into<String>) -> Self {
        Self::GetAtt(id.clone(), attribute.into())
    }

    /// Literal string, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Items, if this is a list
    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Value under `key`, if this is a map
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        match self {
            Self::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Collect every resource this value refers to
    pub fn collect_references(&self, out: &mut BTreeSet<LogicalId>) {
        match self {
            Self::Ref(id) | Self::GetAtt(id, _) => {
                out.insert(id.clone());
            }
            Self::List(items) | Self::Join(_, items) => {
                items.iter().for_each(|item| item.collect_references(out));
            }
            Self::Map(entries) => {
                entries.values().for_each(|v| v.collect_references(out));
            }
            Self::Str(_) | Self::Int(_) | Self::Bool(_) | Self::ImportValue(_) => {}
        }
    }

    /// Render to template JSON
    pub fn to_json(&self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.clone()),
            Self::Int(i) => json!(i),
            Self::Bool(b) => Value::Bool(*b),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Ref(id) => json!({ "Ref": id.as_str() }),
            Self::GetAtt(id, attribute) => json!({ "Fn::GetAtt": [id.as_str(), attribute] }),
            Self::Join(separator, parts) => json!({
                "Fn::Join": [separator, parts.iter().map(Self::to_json).collect::<Vec<_>>()]
            }),
            Self::ImportValue(name) => json!({ "Fn::ImportValue": name }),
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u16> for PropertyValue {
    fn from(i: u16) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> LogicalId {
        LogicalId::new(s).unwrap()
    }

    #[test]
    fn test_render_intrinsics() {
        let role = id("Role");
        assert_eq!(PropertyValue::reference(&role).to_json(), json!({"Ref": "Role"}));
        assert_eq!(
            PropertyValue::attribute(&role, "Arn").to_json(),
            json!({"Fn::GetAtt": ["Role", "Arn"]})
        );
        assert_eq!(
            PropertyValue::Join("".into(), vec!["arn:".into(), PropertyValue::reference(&role)]).to_json(),
            json!({"Fn::Join": ["", ["arn:", {"Ref": "Role"}]]})
        );
    }

    #[test]
    fn test_collect_nested_references() {
        let value = PropertyValue::map([
            ("ExecutionRole", PropertyValue::attribute(&id("Role"), "Arn")),
            (
                "SecurityGroups",
                PropertyValue::list(vec![PropertyValue::attribute(&id("Group"), "GroupId")]),
            ),
            ("Name", "literal".into()),
        ]);

        let mut refs = BTreeSet::new();
        value.collect_references(&mut refs);
        assert_eq!(refs, BTreeSet::from([id("Group"), id("Role")]));
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let value = PropertyValue::map([("b", 1i64), ("a", 2i64)]);
        let rendered = serde_json::to_string(&value).unwrap();
        assert_eq!(rendered, r#"{"b":1,"a":2}"#);
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declared Resource
//!
//! One node of the resource graph: a kind, ordered properties, explicit
//! dependency edges and a deletion policy. Resources are never mutated
//! after they are added to a graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::PropertyValue;
use crate::domain::{LogicalId, ResourceKind};

/// What happens to a resource when its stack is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemovalPolicy {
    /// Delete with the stack
    #[default]
    Destroy,
    /// Keep after the stack is gone
    Retain,
}

impl RemovalPolicy {
    /// Value for the template's `DeletionPolicy` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Destroy => "Delete",
            Self::Retain => "Retain",
        }
    }
}

/// A resource declaration
///
/// # Examples
///
/// ```rust
/// use cim_studio_stack::domain::{LogicalId, ResourceKind};
/// use cim_studio_stack::graph::{PropertyValue, Resource};
///
/// let domain = LogicalId::new("SageMakerDomain").unwrap();
/// let profile = Resource::new(LogicalId::new("SageMakerUserProfile").unwrap(), ResourceKind::UserProfile)
///     .with("DomainId", PropertyValue::attribute(&domain, "DomainId"))
///     .depends_on(&domain);
/// assert!(profile.explicit_dependencies().contains(&domain));
/// assert!(profile.references().contains(&domain));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    logical_id: LogicalId,
    kind: ResourceKind,
    properties: IndexMap<String, PropertyValue>,
    depends_on: BTreeSet<LogicalId>,
    removal_policy: RemovalPolicy,
}

impl Resource {
    /// Declare a resource with no properties
    pub fn new(logical_id: LogicalId, kind: ResourceKind) -> Self {
        Self {
            logical_id,
            kind,
            properties: IndexMap::new(),
            depends_on: BTreeSet::new(),
            removal_policy: RemovalPolicy::default(),
        }
    }

    /// Set a property
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Add an explicit dependency edge
    pub fn depends_on(mut self, id: &LogicalId) -> Self {
        self.depends_on.insert(id.clone());
        self
    }

    /// Set the removal policy
    pub fn removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Get a property by key
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    pub fn explicit_dependencies(&self) -> &BTreeSet<LogicalId> {
        &self.depends_on
    }

    pub fn policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    /// Resources referenced from properties (implicit edges)
    pub fn references(&self) -> BTreeSet<LogicalId> {
        let mut refs = BTreeSet::new();
        for value in self.properties.values() {
            value.collect_references(&mut refs);
        }
        refs
    }

    /// Every resource this one must wait for, explicit and implicit
    pub fn all_dependencies(&self) -> BTreeSet<LogicalId> {
        let mut deps = self.references();
        deps.extend(self.depends_on.iter().cloned());
        deps.remove(&self.logical_id);
        deps
    }

    pub(super) fn add_explicit_dependency(&mut self, id: LogicalId) {
        self.depends_on.insert(id);
    }

    /// Render the template entry for this resource
    pub fn to_template(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("Type".into(), Value::String(self.kind.type_name().into()));
        if !self.properties.is_empty() {
            let props: Map<String, Value> = self
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect();
            entry.insert("Properties".into(), Value::Object(props));
        }
        if !self.depends_on.is_empty() {
            entry.insert(
                "DependsOn".into(),
                Value::Array(
                    self.depends_on
                        .iter()
                        .map(|id| Value::String(id.to_string()))
                        .collect(),
                ),
            );
        }
        let policy = Value::String(self.removal_policy.as_str().into());
        entry.insert("UpdateReplacePolicy".into(), policy.clone());
        entry.insert("DeletionPolicy".into(), policy);
        Value::Object(entry)
    }
}

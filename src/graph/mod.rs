// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Graph
//!
//! The desired-state graph handed to the provisioning engine. The engine
//! realizes resources in parallel, constrained only by the edges declared
//! here, so creation order is carried by edges and never by the order in
//! which resources were added.
//!
//! # Edges
//!
//! - **Explicit**: `DependsOn`, added with [`Resource::depends_on`] or
//!   [`ResourceGraph::add_dependency`]
//! - **Implicit**: any `Ref` / `GetAtt` inside a resource's properties
//!
//! # Invariants
//!
//! - Logical ids are unique within a graph
//! - Every edge points at a declared resource
//! - The graph is acyclic; [`ResourceGraph::add_dependency`] refuses an
//!   edge that would close a cycle

pub mod resource;
pub mod value;

pub use resource::{RemovalPolicy, Resource};
pub use value::PropertyValue;

use indexmap::IndexMap;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::domain::{LogicalId, ResourceKind};

/// Template format written into every rendered template
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Resource graph invariant violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(LogicalId),

    #[error("Duplicate output: {0}")]
    DuplicateOutput(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(LogicalId),

    #[error("{from} refers to undeclared resource {to}")]
    DanglingReference { from: LogicalId, to: LogicalId },

    #[error("Resource {0} cannot depend on itself")]
    SelfDependency(LogicalId),

    #[error("Dependency {from} -> {on} would create a cycle")]
    WouldCreateCycle { from: LogicalId, on: LogicalId },

    #[error("Dependency cycle through {0}")]
    Cycle(LogicalId),
}

/// A stack output, optionally exported for other stacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub value: PropertyValue,
    pub description: Option<String>,
    pub export_name: Option<String>,
}

impl Output {
    pub fn new(value: PropertyValue) -> Self {
        Self {
            value,
            description: None,
            export_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn exported_as(mut self, name: impl Into<String>) -> Self {
        self.export_name = Some(name.into());
        self
    }
}

/// Ordered collection of declared resources and outputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceGraph {
    resources: IndexMap<LogicalId, Resource>,
    outputs: IndexMap<String, Output>,
}

type Built = (DiGraph<LogicalId, ()>, HashMap<LogicalId, NodeIndex>);

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource; returns its logical id
    pub fn add(&mut self, resource: Resource) -> Result<LogicalId, GraphError> {
        let id = resource.logical_id().clone();
        if self.resources.contains_key(&id) {
            return Err(GraphError::DuplicateLogicalId(id));
        }
        debug!(logical_id = %id, kind = %resource.kind(), "declared resource");
        self.resources.insert(id.clone(), resource);
        Ok(id)
    }

    /// Declare that `from` must not be realized before `on`
    pub fn add_dependency(&mut self, from: &LogicalId, on: &LogicalId) -> Result<(), GraphError> {
        if from == on {
            return Err(GraphError::SelfDependency(from.clone()));
        }
        if !self.resources.contains_key(on) {
            return Err(GraphError::UnknownResource(on.clone()));
        }
        if !self.resources.contains_key(from) {
            return Err(GraphError::UnknownResource(from.clone()));
        }
        if self.depends_transitively(on, from) {
            return Err(GraphError::WouldCreateCycle {
                from: from.clone(),
                on: on.clone(),
            });
        }
        if let Some(resource) = self.resources.get_mut(from) {
            resource.add_explicit_dependency(on.clone());
        }
        Ok(())
    }

    /// Add a stack output
    pub fn add_output(&mut self, name: impl Into<String>, output: Output) -> Result<(), GraphError> {
        let name = name.into();
        if self.outputs.contains_key(&name) {
            return Err(GraphError::DuplicateOutput(name));
        }
        self.outputs.insert(name, output);
        Ok(())
    }

    pub fn get(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn contains(&self, id: &LogicalId) -> bool {
        self.resources.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources in declaration order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Resources of one kind, in declaration order
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.values().filter(move |r| r.kind() == kind)
    }

    pub fn outputs(&self) -> &IndexMap<String, Output> {
        &self.outputs
    }

    /// All edges as `(dependent, dependency)` pairs, explicit and implicit
    pub fn edges(&self) -> Vec<(LogicalId, LogicalId)> {
        self.resources
            .values()
            .flat_map(|r| {
                r.all_dependencies()
                    .into_iter()
                    .map(move |dep| (r.logical_id().clone(), dep))
            })
            .collect()
    }

    /// Check that every edge resolves and the graph is acyclic
    pub fn validate(&self) -> Result<(), GraphError> {
        self.realization_order().map(|_| ())
    }

    /// A realization order in which every resource follows its dependencies
    pub fn realization_order(&self) -> Result<Vec<LogicalId>, GraphError> {
        let (graph, _) = self.build(true)?;
        let order = toposort(&graph, None).map_err(|cycle| GraphError::Cycle(graph[cycle.node_id()].clone()))?;
        Ok(order.into_iter().map(|idx| graph[idx].clone()).collect())
    }

    /// Resources grouped into waves; everything within a wave may be
    /// realized concurrently once the previous waves are done
    pub fn realization_waves(&self) -> Result<Vec<Vec<LogicalId>>, GraphError> {
        let order = self.realization_order()?;
        let mut depth: HashMap<&LogicalId, usize> = HashMap::new();
        for id in &order {
            let level = self.resources[id]
                .all_dependencies()
                .iter()
                .filter_map(|dep| depth.get(dep).map(|d| d + 1))
                .max()
                .unwrap_or(0);
            depth.insert(id, level);
        }

        let mut waves: Vec<Vec<LogicalId>> = Vec::new();
        // Declaration order within a wave keeps output stable
        for id in self.resources.keys() {
            let level = depth[id];
            if waves.len() <= level {
                waves.resize_with(level + 1, Vec::new);
            }
            waves[level].push(id.clone());
        }
        Ok(waves)
    }

    /// Whether `dependent` (directly or transitively) waits for `dependency`
    pub fn depends_transitively(&self, dependent: &LogicalId, dependency: &LogicalId) -> bool {
        let Ok((graph, index)) = self.build(false) else {
            return false;
        };
        match (index.get(dependency), index.get(dependent)) {
            (Some(&from), Some(&to)) => from != to && has_path_connecting(&graph, from, to, None),
            _ => false,
        }
    }

    /// Render the provider template
    pub fn to_template(&self, description: &str) -> Value {
        let resources: Map<String, Value> = self
            .resources
            .iter()
            .map(|(id, r)| (id.to_string(), r.to_template()))
            .collect();

        let mut template = Map::new();
        template.insert("AWSTemplateFormatVersion".into(), json!(TEMPLATE_FORMAT_VERSION));
        template.insert("Description".into(), json!(description));
        template.insert(
            "Metadata".into(),
            json!({
                "GeneratedBy": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }
            }),
        );
        template.insert("Resources".into(), Value::Object(resources));

        if !self.outputs.is_empty() {
            let outputs: Map<String, Value> = self
                .outputs
                .iter()
                .map(|(name, output)| {
                    let mut entry = Map::new();
                    entry.insert("Value".into(), output.value.to_json());
                    if let Some(description) = &output.description {
                        entry.insert("Description".into(), json!(description));
                    }
                    if let Some(export) = &output.export_name {
                        entry.insert("Export".into(), json!({ "Name": export }));
                    }
                    (name.clone(), Value::Object(entry))
                })
                .collect();
            template.insert("Outputs".into(), Value::Object(outputs));
        }

        Value::Object(template)
    }

    /// Build a petgraph view with edges running dependency -> dependent.
    /// In strict mode a reference to an undeclared resource is an error,
    /// otherwise such edges are skipped.
    fn build(&self, strict: bool) -> Result<Built, GraphError> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for id in self.resources.keys() {
            index.insert(id.clone(), graph.add_node(id.clone()));
        }
        for (dependent, dependency) in self.edges() {
            match index.get(&dependency) {
                Some(&from) => {
                    graph.add_edge(from, index[&dependent], ());
                }
                None if strict => {
                    return Err(GraphError::DanglingReference {
                        from: dependent,
                        to: dependency,
                    })
                }
                None => {}
            }
        }
        Ok((graph, index))
    }
}

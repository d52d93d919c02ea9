// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack
//!
//! A named resource graph plus the stacks it must be deployed after.

use serde_json::Value;

use crate::domain::StackId;
use crate::graph::ResourceGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    id: StackId,
    description: String,
    graph: ResourceGraph,
    dependencies: Vec<StackId>,
}

impl Stack {
    pub fn new(id: StackId, description: impl Into<String>, graph: ResourceGraph) -> Self {
        Self {
            id,
            description: description.into(),
            graph,
            dependencies: Vec::new(),
        }
    }

    /// Deploy this stack only after `other`
    pub fn add_dependency(&mut self, other: StackId) {
        if !self.dependencies.contains(&other) {
            self.dependencies.push(other);
        }
    }

    pub fn id(&self) -> &StackId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn dependencies(&self) -> &[StackId] {
        &self.dependencies
    }

    /// Render the provider template
    pub fn template(&self) -> Value {
        self.graph.to_template(&self.description)
    }
}

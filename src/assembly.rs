// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud Assembly
//!
//! Orders composed stacks for deployment and writes one template per stack
//! plus a `manifest.json` describing the run.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::composer::Stack;
use crate::domain::StackId;
use crate::errors::{StackError, StackResult};

/// Manifest format version
pub const MANIFEST_VERSION: &str = "1.0";

/// Manifest file written next to the templates
pub const MANIFEST_FILE: &str = "manifest.json";

/// A set of stacks ready to be written out
#[derive(Debug, Clone)]
pub struct Assembly {
    run_id: Uuid,
    synthesized_at: DateTime<Utc>,
    stacks: IndexMap<StackId, Stack>,
    order: Vec<StackId>,
}

/// Manifest entry for one stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: StackId,
    pub template_file: String,
    pub dependencies: Vec<StackId>,
    pub resource_count: usize,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: &'static str,
    pub run_id: Uuid,
    pub synthesized_at: DateTime<Utc>,
    /// Entries in deployment order
    pub stacks: Vec<ManifestEntry>,
}

impl Assembly {
    /// Collect stacks, rejecting duplicates, unknown dependencies and cycles
    pub fn new(stacks: impl IntoIterator<Item = Stack>) -> StackResult<Self> {
        let mut by_id = IndexMap::new();
        for stack in stacks {
            let id = stack.id().clone();
            if by_id.insert(id.clone(), stack).is_some() {
                return Err(StackError::Composition(format!("duplicate stack {id}")));
            }
        }

        let mut graph = DiGraph::<StackId, ()>::new();
        let nodes: HashMap<StackId, NodeIndex> = by_id
            .keys()
            .map(|id| (id.clone(), graph.add_node(id.clone())))
            .collect();
        for (id, stack) in &by_id {
            for dependency in stack.dependencies() {
                let Some(&on) = nodes.get(dependency) else {
                    return Err(StackError::Composition(format!(
                        "stack {id} depends on unknown stack {dependency}"
                    )));
                };
                graph.add_edge(on, nodes[id], ());
            }
        }
        let order = toposort(&graph, None)
            .map_err(|cycle| {
                StackError::Composition(format!("stack dependency cycle through {}", graph[cycle.node_id()]))
            })?
            .into_iter()
            .map(|idx| graph[idx].clone())
            .collect();

        Ok(Self {
            run_id: Uuid::now_v7(),
            synthesized_at: Utc::now(),
            stacks: by_id,
            order,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn stack(&self, id: &StackId) -> Option<&Stack> {
        self.stacks.get(id)
    }

    /// Stacks in declaration order
    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.stacks.values()
    }

    /// Every stack after the stacks it depends on
    pub fn deployment_order(&self) -> &[StackId] {
        &self.order
    }

    pub fn manifest(&self) -> Manifest {
        let stacks = self
            .order
            .iter()
            .filter_map(|id| self.stacks.get(id))
            .map(|stack| ManifestEntry {
                id: stack.id().clone(),
                template_file: template_file_name(stack.id()),
                dependencies: stack.dependencies().to_vec(),
                resource_count: stack.graph().len(),
                description: stack.description().to_string(),
            })
            .collect();
        Manifest {
            version: MANIFEST_VERSION,
            run_id: self.run_id,
            synthesized_at: self.synthesized_at,
            stacks,
        }
    }

    /// Write every template and the manifest into `dir`, returning the paths written
    pub fn write_to(&self, dir: impl AsRef<Path>) -> StackResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.stacks.len() + 1);
        for id in &self.order {
            let Some(stack) = self.stacks.get(id) else {
                continue;
            };
            let path = dir.join(template_file_name(id));
            std::fs::write(&path, serde_json::to_string_pretty(&stack.template())?)?;
            written.push(path);
        }

        let manifest_path = dir.join(MANIFEST_FILE);
        std::fs::write(&manifest_path, serde_json::to_string_pretty(&self.manifest())?)?;
        written.push(manifest_path);

        info!(
            run_id = %self.run_id,
            dir = %dir.display(),
            stacks = self.stacks.len(),
            "wrote cloud assembly"
        );
        Ok(written)
    }
}

pub fn template_file_name(id: &StackId) -> String {
    format!("{id}.template.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ResourceGraph;

    fn stack(name: &str, deps: &[&str]) -> Stack {
        let mut stack = Stack::new(StackId::new(name).unwrap(), name, ResourceGraph::new());
        for dep in deps {
            stack.add_dependency(StackId::new(*dep).unwrap());
        }
        stack
    }

    #[test]
    fn test_dependencies_deploy_first() {
        let assembly = Assembly::new([stack("Studio", &["Network"]), stack("Network", &[])]).unwrap();
        let order: Vec<&str> = assembly.deployment_order().iter().map(|id| id.as_str()).collect();
        assert_eq!(order, vec!["Network", "Studio"]);
    }

    #[test]
    fn test_duplicate_stack_rejected() {
        assert!(Assembly::new([stack("Studio", &[]), stack("Studio", &[])]).is_err());
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        assert!(Assembly::new([stack("Studio", &["Missing"])]).is_err());
    }

    #[test]
    fn test_cycle_rejected() {
        let result = Assembly::new([stack("A", &["B"]), stack("B", &["A"])]);
        assert!(matches!(result, Err(StackError::Composition(_))));
    }

    #[test]
    fn test_manifest_lists_templates() {
        let assembly = Assembly::new([stack("Studio", &["Network"]), stack("Network", &[])]).unwrap();
        let manifest = assembly.manifest();
        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.stacks[0].template_file, "Network.template.json");
        assert_eq!(manifest.stacks[1].dependencies, vec![StackId::new("Network").unwrap()]);
    }
}

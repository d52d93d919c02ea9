// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Resource Graph Ordering
//!
//! Random acyclic graphs: every realization order and every wave layout
//! must place a resource after everything it depends on, and no added edge
//! may close a cycle.

use cim_studio_stack::domain::ResourceKind;
use cim_studio_stack::graph::GraphError;
use cim_studio_stack::{LogicalId, PropertyValue, Resource, ResourceGraph};
use proptest::prelude::*;
use std::collections::HashMap;

fn id(n: usize) -> LogicalId {
    LogicalId::new(format!("Resource{n}")).unwrap()
}

/// Each resource may depend on any earlier one, either through `DependsOn`
/// or through a `Ref` in its properties
fn arb_dag() -> impl Strategy<Value = Vec<Vec<(usize, bool)>>> {
    (1usize..24).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    prop::collection::vec((0..i, any::<bool>()), 0..4).boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn build(dag: &[Vec<(usize, bool)>]) -> ResourceGraph {
    let mut graph = ResourceGraph::new();
    for (i, deps) in dag.iter().enumerate() {
        let mut resource = Resource::new(id(i), ResourceKind::Bucket);
        let mut refs = Vec::new();
        for (dep, explicit) in deps {
            if *explicit {
                resource = resource.depends_on(&id(*dep));
            } else {
                refs.push(PropertyValue::reference(&id(*dep)));
            }
        }
        if !refs.is_empty() {
            resource = resource.with("Tags", refs);
        }
        graph.add(resource).unwrap();
    }
    graph
}

proptest! {
    #[test]
    fn prop_order_respects_every_edge(dag in arb_dag()) {
        let graph = build(&dag);
        let order = graph.realization_order().unwrap();
        prop_assert_eq!(order.len(), graph.len());

        let position: HashMap<_, _> = order.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();
        for (dependent, dependency) in graph.edges() {
            prop_assert!(position[&dependency] < position[&dependent]);
        }
    }

    #[test]
    fn prop_waves_follow_dependencies(dag in arb_dag()) {
        let graph = build(&dag);
        let waves = graph.realization_waves().unwrap();
        prop_assert_eq!(waves.iter().map(Vec::len).sum::<usize>(), graph.len());

        let wave_of: HashMap<_, _> = waves
            .iter()
            .enumerate()
            .flat_map(|(w, ids)| ids.iter().map(move |id| (id.clone(), w)))
            .collect();
        for (dependent, dependency) in graph.edges() {
            prop_assert!(wave_of[&dependency] < wave_of[&dependent]);
        }
        prop_assert!(waves.iter().all(|wave| !wave.is_empty()));
    }

    #[test]
    fn prop_backward_edge_refused(dag in arb_dag()) {
        let mut graph = build(&dag);
        for (dependent, dependency) in graph.edges() {
            let result = graph.add_dependency(&dependency, &dependent);
            let is_cycle = matches!(result, Err(GraphError::WouldCreateCycle { .. }));
            prop_assert!(is_cycle);
        }
        prop_assert!(graph.validate().is_ok());
    }
}

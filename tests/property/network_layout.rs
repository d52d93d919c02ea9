// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Managed Network Layout

use cim_studio_stack::domain::ResourceKind;
use cim_studio_stack::provisioning::network::subnet_cidrs;
use cim_studio_stack::provisioning::NetworkProvider;
use cim_studio_stack::{NetworkDescriptor, Region, ResourceGraph};
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #[test]
    fn prop_subnet_cidrs_are_distinct(count in 1usize..=12) {
        let cidrs = subnet_cidrs(count);
        prop_assert_eq!(cidrs.len(), count);
        let unique: HashSet<_> = cidrs.iter().collect();
        prop_assert_eq!(unique.len(), count);
        for cidr in &cidrs {
            prop_assert!(cidr.starts_with("10.0."));
        }
    }

    #[test]
    fn prop_managed_network_has_one_tier_per_zone(az_count in NetworkDescriptor::MIN_MANAGED_AZS..=NetworkDescriptor::MAX_MANAGED_AZS) {
        let provider = NetworkProvider::new(Region::new("us-east-1").unwrap()).unwrap();
        let mut graph = ResourceGraph::new();
        let handle = provider
            .resolve(&NetworkDescriptor::Managed { az_count }, &mut graph)
            .unwrap();

        prop_assert!(handle.is_managed());
        prop_assert_eq!(handle.private_subnet_ids.len(), az_count);
        prop_assert_eq!(handle.private_route_table_ids.len(), az_count);
        prop_assert_eq!(handle.availability_zones.len(), az_count);
        prop_assert_eq!(graph.of_kind(ResourceKind::Subnet).count(), az_count * 2);
        prop_assert_eq!(graph.of_kind(ResourceKind::NatGateway).count(), az_count);
        prop_assert!(graph.validate().is_ok());
    }

    #[test]
    fn prop_out_of_range_zone_count_rejected(az_count in 0usize..32) {
        let valid = (NetworkDescriptor::MIN_MANAGED_AZS..=NetworkDescriptor::MAX_MANAGED_AZS).contains(&az_count);
        prop_assert_eq!(NetworkDescriptor::managed(az_count).is_ok(), valid);
    }
}

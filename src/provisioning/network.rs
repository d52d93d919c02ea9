// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Provider
//!
//! Resolves a [`NetworkDescriptor`] into a [`NetworkHandle`]. An imported
//! network adds nothing to the graph; its identifiers are passed through as
//! literals and only checked by the provisioning engine. A managed network
//! declares a two-tier layout: per zone one public subnet with a NAT gateway
//! and one private subnet routed through it.

use serde::Serialize;
use std::net::Ipv4Addr;
use tracing::{debug, info};

use crate::domain::{AvailabilityZone, LogicalId, NetworkDescriptor, Region, ResourceKind};
use crate::errors::StackResult;
use crate::graph::{Output, PropertyValue, Resource, ResourceGraph};

/// Address block of a managed network
pub const MANAGED_CIDR: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 0);

/// Prefix length of a managed network's address block
pub const MANAGED_PREFIX: u8 = 16;

/// Where a network handle came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkOrigin {
    /// Imported by identifier
    Imported,
    /// Declared in this graph
    Managed,
    /// Declared in another stack and consumed through its exports
    CrossStack,
}

/// A usable private network
///
/// Values are literals for imported networks and references for managed
/// ones. Subnets and route tables are ordered by zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHandle {
    pub id: PropertyValue,
    pub private_subnet_ids: Vec<PropertyValue>,
    pub private_route_table_ids: Vec<PropertyValue>,
    pub availability_zones: Vec<AvailabilityZone>,
    pub origin: NetworkOrigin,
}

impl NetworkHandle {
    pub fn is_managed(&self) -> bool {
        self.origin == NetworkOrigin::Managed
    }

    /// Publish this handle as exported outputs of the graph that owns it
    ///
    /// Exports are named `{export_prefix}:VpcId`,
    /// `{export_prefix}:PrivateSubnet{n}` and
    /// `{export_prefix}:PrivateRouteTable{n}`.
    pub fn export(&self, graph: &mut ResourceGraph, export_prefix: &str) -> StackResult<()> {
        graph.add_output(
            "VpcId",
            Output::new(self.id.clone())
                .with_description("Private network id")
                .exported_as(format!("{export_prefix}:VpcId")),
        )?;
        for (n, subnet) in self.private_subnet_ids.iter().enumerate() {
            let name = format!("PrivateSubnet{}", n + 1);
            graph.add_output(
                name.clone(),
                Output::new(subnet.clone()).exported_as(format!("{export_prefix}:{name}")),
            )?;
        }
        for (n, table) in self.private_route_table_ids.iter().enumerate() {
            let name = format!("PrivateRouteTable{}", n + 1);
            graph.add_output(
                name.clone(),
                Output::new(table.clone()).exported_as(format!("{export_prefix}:{name}")),
            )?;
        }
        let zones: Vec<String> = self.availability_zones.iter().map(|z| z.to_string()).collect();
        graph.add_output(
            "AvailabilityZones",
            Output::new(PropertyValue::Str(zones.join(","))).with_description("Availability zones"),
        )?;
        Ok(())
    }

    /// The handle as seen from a stack that imports this one's exports
    pub fn consumed_via_exports(&self, export_prefix: &str) -> NetworkHandle {
        let import = |name: String| PropertyValue::ImportValue(format!("{export_prefix}:{name}"));
        NetworkHandle {
            id: import("VpcId".into()),
            private_subnet_ids: (1..=self.private_subnet_ids.len())
                .map(|n| import(format!("PrivateSubnet{n}")))
                .collect(),
            private_route_table_ids: (1..=self.private_route_table_ids.len())
                .map(|n| import(format!("PrivateRouteTable{n}")))
                .collect(),
            availability_zones: self.availability_zones.clone(),
            origin: NetworkOrigin::CrossStack,
        }
    }
}

/// Resolves network descriptors
#[derive(Debug, Clone)]
pub struct NetworkProvider {
    region: Region,
    base_id: LogicalId,
}

impl NetworkProvider {
    pub fn new(region: Region) -> StackResult<Self> {
        Ok(Self {
            region,
            base_id: LogicalId::new("Vpc")?,
        })
    }

    /// Resolve a descriptor, declaring a network only for `Managed`
    pub fn resolve(
        &self,
        descriptor: &NetworkDescriptor,
        graph: &mut ResourceGraph,
    ) -> StackResult<NetworkHandle> {
        descriptor.validate()?;
        match descriptor {
            NetworkDescriptor::Imported(network) => {
                debug!(vpc = %network.id, "importing network");
                Ok(NetworkHandle {
                    id: PropertyValue::Str(network.id.to_string()),
                    private_subnet_ids: network
                        .private_subnet_ids
                        .iter()
                        .map(|s| PropertyValue::Str(s.to_string()))
                        .collect(),
                    private_route_table_ids: network
                        .private_route_table_ids
                        .iter()
                        .map(|r| PropertyValue::Str(r.to_string()))
                        .collect(),
                    availability_zones: network.availability_zones.clone(),
                    origin: NetworkOrigin::Imported,
                })
            }
            NetworkDescriptor::Managed { az_count } => self.declare_managed(*az_count, graph),
        }
    }

    fn declare_managed(&self, az_count: usize, graph: &mut ResourceGraph) -> StackResult<NetworkHandle> {
        let zones = self.region.zones(az_count);
        let cidrs = subnet_cidrs(az_count * 2);
        let vpc = &self.base_id;

        graph.add(
            Resource::new(vpc.clone(), ResourceKind::Vpc)
                .with("CidrBlock", format!("{MANAGED_CIDR}/{MANAGED_PREFIX}"))
                .with("EnableDnsHostnames", true)
                .with("EnableDnsSupport", true)
                .with("InstanceTenancy", "default"),
        )?;

        let igw = graph.add(Resource::new(vpc.child("IGW")?, ResourceKind::InternetGateway))?;
        let attachment = graph.add(
            Resource::new(vpc.child("VPCGW")?, ResourceKind::GatewayAttachment)
                .with("VpcId", PropertyValue::reference(vpc))
                .with("InternetGatewayId", PropertyValue::reference(&igw)),
        )?;

        let mut private_subnets = Vec::with_capacity(az_count);
        let mut private_tables = Vec::with_capacity(az_count);

        for (i, zone) in zones.iter().enumerate() {
            let n = i + 1;

            // Public tier: subnet, route to the internet gateway, NAT gateway
            let public = self.declare_subnet(graph, &format!("PublicSubnet{n}"), zone, &cidrs[i], true)?;
            let public_table = public.child("RouteTable")?;
            let public_route = graph.add(
                Resource::new(public.child("DefaultRoute")?, ResourceKind::Route)
                    .with("RouteTableId", PropertyValue::reference(&public_table))
                    .with("DestinationCidrBlock", "0.0.0.0/0")
                    .with("GatewayId", PropertyValue::reference(&igw))
                    .depends_on(&attachment),
            )?;
            let eip = graph.add(Resource::new(public.child("EIP")?, ResourceKind::ElasticIp).with("Domain", "vpc"))?;
            let nat = graph.add(
                Resource::new(public.child("NATGateway")?, ResourceKind::NatGateway)
                    .with("SubnetId", PropertyValue::reference(&public))
                    .with("AllocationId", PropertyValue::attribute(&eip, "AllocationId"))
                    .depends_on(&public_route)
                    .depends_on(&public.child("RouteTableAssociation")?),
            )?;

            // Private tier: subnet routed through this zone's NAT gateway
            let private =
                self.declare_subnet(graph, &format!("PrivateSubnet{n}"), zone, &cidrs[az_count + i], false)?;
            let private_table = private.child("RouteTable")?;
            graph.add(
                Resource::new(private.child("DefaultRoute")?, ResourceKind::Route)
                    .with("RouteTableId", PropertyValue::reference(&private_table))
                    .with("DestinationCidrBlock", "0.0.0.0/0")
                    .with("NatGatewayId", PropertyValue::reference(&nat)),
            )?;

            private_subnets.push(PropertyValue::reference(&private));
            private_tables.push(PropertyValue::reference(&private_table));
        }

        info!(zones = az_count, region = %self.region, "declared managed network");

        Ok(NetworkHandle {
            id: PropertyValue::reference(vpc),
            private_subnet_ids: private_subnets,
            private_route_table_ids: private_tables,
            availability_zones: zones,
            origin: NetworkOrigin::Managed,
        })
    }

    /// Subnet plus its own route table and association
    fn declare_subnet(
        &self,
        graph: &mut ResourceGraph,
        name: &str,
        zone: &AvailabilityZone,
        cidr: &str,
        public: bool,
    ) -> StackResult<LogicalId> {
        let vpc = &self.base_id;
        let subnet = graph.add(
            Resource::new(vpc.child(name)?, ResourceKind::Subnet)
                .with("VpcId", PropertyValue::reference(vpc))
                .with("AvailabilityZone", zone.to_string())
                .with("CidrBlock", cidr.to_string())
                .with("MapPublicIpOnLaunch", public),
        )?;
        let table = graph.add(
            Resource::new(subnet.child("RouteTable")?, ResourceKind::RouteTable)
                .with("VpcId", PropertyValue::reference(vpc)),
        )?;
        graph.add(
            Resource::new(subnet.child("RouteTableAssociation")?, ResourceKind::SubnetRouteTableAssociation)
                .with("RouteTableId", PropertyValue::reference(&table))
                .with("SubnetId", PropertyValue::reference(&subnet)),
        )?;
        Ok(subnet)
    }
}

/// Split the managed block into `count` equal subnets
///
/// The prefix grows by the bits needed to address `count` slices, so four
/// subnets of a /16 are /18s.
pub fn subnet_cidrs(count: usize) -> Vec<String> {
    let extra_bits = count.max(1).next_power_of_two().trailing_zeros() as u8;
    let prefix = MANAGED_PREFIX + extra_bits;
    let size = 1u32 << (32 - prefix);
    let base = u32::from(MANAGED_CIDR);
    (0..count as u32)
        .map(|i| format!("{}/{}", Ipv4Addr::from(base + i * size), prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImportedNetwork, SubnetId, VpcId};

    fn provider() -> NetworkProvider {
        NetworkProvider::new(Region::new("us-east-1").unwrap()).unwrap()
    }

    #[test]
    fn test_subnet_cidrs() {
        assert_eq!(
            subnet_cidrs(4),
            vec!["10.0.0.0/18", "10.0.64.0/18", "10.0.128.0/18", "10.0.192.0/18"]
        );
        let six = subnet_cidrs(6);
        assert_eq!(six.len(), 6);
        assert_eq!(six[5], "10.0.160.0/19");
    }

    #[test]
    fn test_imported_declares_nothing() {
        let mut graph = ResourceGraph::new();
        let descriptor = NetworkDescriptor::imported(
            ImportedNetwork::new(
                VpcId::new("vpc-1").unwrap(),
                vec![AvailabilityZone::new("a").unwrap(), AvailabilityZone::new("b").unwrap()],
            )
            .with_private_subnets(vec![SubnetId::new("subnet-a").unwrap(), SubnetId::new("subnet-b").unwrap()]),
        )
        .unwrap();

        let handle = provider().resolve(&descriptor, &mut graph).unwrap();
        assert!(graph.is_empty());
        assert_eq!(handle.id, PropertyValue::from("vpc-1"));
        assert_eq!(handle.private_subnet_ids.len(), 2);
        assert_eq!(handle.origin, NetworkOrigin::Imported);
    }

    #[test]
    fn test_imported_resolves_identically_twice() {
        let descriptor = NetworkDescriptor::imported(
            ImportedNetwork::new(
                VpcId::new("vpc-1").unwrap(),
                vec![AvailabilityZone::new("us-east-1a").unwrap(), AvailabilityZone::new("us-east-1b").unwrap()],
            )
            .with_private_subnets(vec![SubnetId::new("subnet-a").unwrap(), SubnetId::new("subnet-b").unwrap()]),
        )
        .unwrap();

        let provider = provider();
        let (mut first_graph, mut second_graph) = (ResourceGraph::new(), ResourceGraph::new());
        let first = provider.resolve(&descriptor, &mut first_graph).unwrap();
        let second = provider.resolve(&descriptor, &mut second_graph).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.availability_zones, second.availability_zones);
        assert_eq!(first, second);
        assert_eq!(first_graph, second_graph);
    }

    #[test]
    fn test_managed_layout() {
        let mut graph = ResourceGraph::new();
        let handle = provider()
            .resolve(&NetworkDescriptor::Managed { az_count: 2 }, &mut graph)
            .unwrap();

        assert!(handle.is_managed());
        assert_eq!(handle.availability_zones.len(), 2);
        assert_eq!(graph.of_kind(ResourceKind::Vpc).count(), 1);
        assert_eq!(graph.of_kind(ResourceKind::Subnet).count(), 4);
        assert_eq!(graph.of_kind(ResourceKind::NatGateway).count(), 2);
        assert_eq!(
            handle.private_subnet_ids[0],
            PropertyValue::reference(&LogicalId::new("VpcPrivateSubnet1").unwrap())
        );
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_managed_rejects_single_zone() {
        let mut graph = ResourceGraph::new();
        assert!(provider()
            .resolve(&NetworkDescriptor::Managed { az_count: 1 }, &mut graph)
            .is_err());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_export_and_consume() {
        let mut graph = ResourceGraph::new();
        let handle = provider()
            .resolve(&NetworkDescriptor::Managed { az_count: 2 }, &mut graph)
            .unwrap();
        handle.export(&mut graph, "DemoDevVpcStack").unwrap();
        assert!(graph.outputs().contains_key("PrivateSubnet2"));

        let consumed = handle.consumed_via_exports("DemoDevVpcStack");
        assert_eq!(consumed.id, PropertyValue::ImportValue("DemoDevVpcStack:VpcId".into()));
        assert_eq!(consumed.private_subnet_ids.len(), 2);
        assert_eq!(consumed.availability_zones, handle.availability_zones);
        assert_eq!(consumed.origin, NetworkOrigin::CrossStack);
    }
}

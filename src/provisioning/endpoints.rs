// Copyright (c) 2025 - Cowboy AI, Inc.
//! Private Connectivity
//!
//! The endpoints a VPC-only domain needs to reach its services without a
//! public route. The list is a fixed table per access mode rather than a
//! caller option: dropping an entry breaks one specific studio capability
//! (no log endpoint, no log shipping) without breaking connectivity in
//! general, which makes a short list look like it works.
//!
//! Interface endpoints sit in the private subnets behind the shared security
//! group with private DNS on. The object storage endpoint is a gateway bound
//! to route tables and never carries a security group.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::network::NetworkHandle;
use super::perimeter::SecurityPerimeter;
use crate::domain::{LogicalId, NetworkAccessType, Region, ResourceKind};
use crate::errors::{StackError, StackResult};
use crate::graph::{PropertyValue, Resource, ResourceGraph};

/// Endpoint flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    /// Network interface in each subnet, gated by a security group
    Interface,
    /// Route table entry, no security group
    Gateway,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interface => "Interface",
            Self::Gateway => "Gateway",
        }
    }
}

/// Whether an endpoint is always declared or can be switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Requirement {
    Required,
    ImageRecognition,
    ServiceCatalog,
}

/// How the provider names a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ServiceNaming {
    /// `com.amazonaws.{region}.{suffix}`
    Standard(&'static str),
    /// `aws.sagemaker.{region}.notebook`
    StudioNotebook,
}

impl ServiceNaming {
    pub fn service_name(&self, region: &Region) -> String {
        match self {
            Self::Standard(suffix) => format!("com.amazonaws.{region}.{suffix}"),
            Self::StudioNotebook => format!("aws.sagemaker.{region}.notebook"),
        }
    }
}

/// One row of the endpoint table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EndpointService {
    /// Logical id of the declared endpoint
    pub name: &'static str,
    pub naming: ServiceNaming,
    pub kind: EndpointKind,
    pub requirement: Requirement,
}

const fn interface(name: &'static str, naming: ServiceNaming, requirement: Requirement) -> EndpointService {
    EndpointService {
        name,
        naming,
        kind: EndpointKind::Interface,
        requirement,
    }
}

/// Endpoints for a VPC-only domain
pub const VPC_ONLY_ENDPOINTS: &[EndpointService] = &[
    interface("SageMakerNotebookEndpoint", ServiceNaming::StudioNotebook, Requirement::Required),
    interface("SageMakerApiEndpoint", ServiceNaming::Standard("sagemaker.api"), Requirement::Required),
    interface(
        "SageMakerRuntimeEndpoint",
        ServiceNaming::Standard("sagemaker.runtime"),
        Requirement::Required,
    ),
    EndpointService {
        name: "S3GatewayEndpoint",
        naming: ServiceNaming::Standard("s3"),
        kind: EndpointKind::Gateway,
        requirement: Requirement::Required,
    },
    interface("StsEndpoint", ServiceNaming::Standard("sts"), Requirement::Required),
    interface("CloudWatchLogsEndpoint", ServiceNaming::Standard("logs"), Requirement::Required),
    interface(
        "RekognitionEndpoint",
        ServiceNaming::Standard("rekognition"),
        Requirement::ImageRecognition,
    ),
    interface(
        "ServiceCatalogEndpoint",
        ServiceNaming::Standard("servicecatalog"),
        Requirement::ServiceCatalog,
    ),
];

/// Endpoints for a public-internet domain
pub const PUBLIC_INTERNET_ENDPOINTS: &[EndpointService] = &[];

/// The endpoint table for an access mode
pub fn endpoint_table(access: NetworkAccessType) -> &'static [EndpointService] {
    match access {
        NetworkAccessType::VpcOnly => VPC_ONLY_ENDPOINTS,
        NetworkAccessType::PublicInternetOnly => PUBLIC_INTERNET_ENDPOINTS,
    }
}

/// Switches for the endpoints that are not strictly required
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionalEndpoints {
    pub image_recognition: bool,
    pub service_catalog: bool,
}

impl Default for OptionalEndpoints {
    fn default() -> Self {
        Self {
            image_recognition: true,
            service_catalog: true,
        }
    }
}

impl OptionalEndpoints {
    fn allows(&self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::Required => true,
            Requirement::ImageRecognition => self.image_recognition,
            Requirement::ServiceCatalog => self.service_catalog,
        }
    }
}

/// Where an endpoint attaches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubnetScope {
    PrivateSubnets(Vec<PropertyValue>),
    RouteTables(Vec<PropertyValue>),
}

/// A declared endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub logical_id: LogicalId,
    pub service_name: String,
    pub kind: EndpointKind,
    pub subnet_scope: SubnetScope,
    pub security_groups: Vec<PropertyValue>,
    pub private_dns_enabled: bool,
}

impl EndpointSpec {
    fn to_resource(&self, vpc: &PropertyValue) -> Resource {
        let resource = Resource::new(self.logical_id.clone(), ResourceKind::VpcEndpoint)
            .with("ServiceName", self.service_name.clone())
            .with("VpcId", vpc.clone())
            .with("VpcEndpointType", self.kind.as_str());
        match &self.subnet_scope {
            SubnetScope::PrivateSubnets(subnets) => resource
                .with("SubnetIds", subnets.clone())
                .with("SecurityGroupIds", self.security_groups.clone())
                .with("PrivateDnsEnabled", self.private_dns_enabled),
            SubnetScope::RouteTables(tables) => resource.with("RouteTableIds", tables.clone()),
        }
    }
}

/// Declares the endpoint set for one access mode
#[derive(Debug, Clone)]
pub struct PrivateConnectivityBuilder {
    region: Region,
    access: NetworkAccessType,
    optional: OptionalEndpoints,
}

impl PrivateConnectivityBuilder {
    pub fn new(region: Region, access: NetworkAccessType, optional: OptionalEndpoints) -> Self {
        Self {
            region,
            access,
            optional,
        }
    }

    /// Rows of the table that will be declared
    pub fn enabled_services(&self) -> impl Iterator<Item = &'static EndpointService> + '_ {
        endpoint_table(self.access)
            .iter()
            .filter(|service| self.optional.allows(service.requirement))
    }

    /// Declare every enabled endpoint in `graph`
    pub fn build(
        &self,
        network: &NetworkHandle,
        perimeter: &SecurityPerimeter,
        graph: &mut ResourceGraph,
    ) -> StackResult<Vec<EndpointSpec>> {
        let mut specs = Vec::new();
        for service in self.enabled_services() {
            let spec = match service.kind {
                EndpointKind::Interface => EndpointSpec {
                    logical_id: LogicalId::new(service.name)?,
                    service_name: service.naming.service_name(&self.region),
                    kind: EndpointKind::Interface,
                    subnet_scope: SubnetScope::PrivateSubnets(network.private_subnet_ids.clone()),
                    security_groups: vec![perimeter.group_ref()],
                    private_dns_enabled: true,
                },
                EndpointKind::Gateway if network.private_route_table_ids.is_empty() => {
                    return Err(StackError::Composition(format!(
                        "{} needs at least one private route table",
                        service.name
                    )));
                }
                EndpointKind::Gateway => EndpointSpec {
                    logical_id: LogicalId::new(service.name)?,
                    service_name: service.naming.service_name(&self.region),
                    kind: EndpointKind::Gateway,
                    subnet_scope: SubnetScope::RouteTables(network.private_route_table_ids.clone()),
                    security_groups: Vec::new(),
                    private_dns_enabled: false,
                },
            };
            graph.add(spec.to_resource(&network.id))?;
            debug!(endpoint = %spec.logical_id, service = %spec.service_name, "declared endpoint");
            specs.push(spec);
        }
        info!(access = %self.access, endpoints = specs.len(), "declared private connectivity");
        Ok(specs)
    }
}

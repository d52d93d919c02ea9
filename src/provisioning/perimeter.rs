// Copyright (c) 2025 - Cowboy AI, Inc.
//! Security Perimeter
//!
//! One security group shared by the domain and every interface endpoint.
//! Ingress is self-referencing only: members of the group may reach each
//! other on the listed ports and nothing outside the group may reach them.
//!
//! Calling [`SecurityPerimeter::build`] twice in one graph fails on the
//! duplicate logical id; build once and pass the handle around.

use serde::Serialize;
use tracing::debug;

use super::network::NetworkHandle;
use crate::domain::{LogicalId, ResourceKind};
use crate::errors::StackResult;
use crate::graph::{PropertyValue, Resource, ResourceGraph};

/// Transport protocol of an ingress rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
        }
    }
}

/// A self-referencing ingress rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IngressRule {
    /// Suffix of the rule's logical id
    pub name: &'static str,
    pub protocol: Protocol,
    pub from_port: u16,
    pub to_port: u16,
    pub description: &'static str,
}

/// Ingress the studio domain needs between its own members
///
/// All three together or the domain is broken: 443 for control-plane and
/// API calls, 2049 for the shared home filesystem, 8192-65535 for kernel
/// gateway connections.
pub const SELF_INGRESS_RULES: [IngressRule; 3] = [
    IngressRule {
        name: "Https",
        protocol: Protocol::Tcp,
        from_port: 443,
        to_port: 443,
        description: "Control plane and API traffic",
    },
    IngressRule {
        name: "Nfs",
        protocol: Protocol::Tcp,
        from_port: 2049,
        to_port: 2049,
        description: "Shared filesystem traffic",
    },
    IngressRule {
        name: "KernelGateway",
        protocol: Protocol::Tcp,
        from_port: 8192,
        to_port: 65535,
        description: "Kernel gateway ephemeral ports",
    },
];

/// The shared security group and its rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPerimeter {
    group: LogicalId,
    rules: Vec<(LogicalId, IngressRule)>,
}

impl SecurityPerimeter {
    /// Logical id of the shared group
    pub const GROUP_ID: &'static str = "SageMakerSecurityGroup";

    /// Declare the group and its self-ingress rules in `network`
    pub fn build(network: &NetworkHandle, graph: &mut ResourceGraph) -> StackResult<Self> {
        let group = graph.add(
            Resource::new(LogicalId::new(Self::GROUP_ID)?, ResourceKind::SecurityGroup)
                .with("GroupDescription", "Shared security group for the studio domain and its endpoints")
                .with("VpcId", network.id.clone())
                .with(
                    "SecurityGroupEgress",
                    vec![PropertyValue::map([
                        ("CidrIp", "0.0.0.0/0"),
                        ("Description", "Allow all outbound traffic by default"),
                        ("IpProtocol", "-1"),
                    ])],
                ),
        )?;

        let group_ref = PropertyValue::attribute(&group, "GroupId");
        let mut rules = Vec::with_capacity(SELF_INGRESS_RULES.len());
        for rule in SELF_INGRESS_RULES {
            let id = graph.add(
                Resource::new(group.child(&format!("Ingress{}", rule.name))?, ResourceKind::SecurityGroupIngress)
                    .with("IpProtocol", rule.protocol.as_str())
                    .with("FromPort", rule.from_port)
                    .with("ToPort", rule.to_port)
                    .with("Description", rule.description)
                    .with("GroupId", group_ref.clone())
                    .with("SourceSecurityGroupId", group_ref.clone()),
            )?;
            rules.push((id, rule));
        }
        debug!(group = %group, rules = rules.len(), "declared security perimeter");

        Ok(Self { group, rules })
    }

    pub fn group(&self) -> &LogicalId {
        &self.group
    }

    /// Reference to the group id, for endpoints and domain settings
    pub fn group_ref(&self) -> PropertyValue {
        PropertyValue::attribute(&self.group, "GroupId")
    }

    /// Declared rules with their logical ids
    pub fn rules(&self) -> impl Iterator<Item = &IngressRule> {
        self.rules.iter().map(|(_, rule)| rule)
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &LogicalId> {
        self.rules.iter().map(|(id, _)| id)
    }
}

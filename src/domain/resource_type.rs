// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declared Resource Type Taxonomy
//!
//! The closed set of resource types a studio stack can declare, with the
//! provider type names they render to in a template.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource type taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // Network
    /// Virtual private network
    Vpc,
    /// Subnet within a network
    Subnet,
    /// Route table
    RouteTable,
    /// Route table to subnet binding
    SubnetRouteTableAssociation,
    /// Single route entry
    Route,
    /// Internet gateway
    InternetGateway,
    /// Gateway to network attachment
    GatewayAttachment,
    /// Elastic IP for a NAT gateway
    ElasticIp,
    /// NAT gateway
    NatGateway,

    // Security
    /// Security group
    SecurityGroup,
    /// Standalone ingress rule on a security group
    SecurityGroupIngress,

    // Identity
    /// Execution role
    Role,
    /// Inline policy attached to a role
    Policy,

    // Connectivity
    /// Private service endpoint (interface or gateway)
    VpcEndpoint,

    // Storage
    /// Object storage bucket
    Bucket,

    // Studio
    /// Notebook domain
    Domain,
    /// User profile within a domain
    UserProfile,
    /// Application bound to a user profile
    App,
}

impl ResourceKind {
    /// Provider type name written to the template
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Vpc => "AWS::EC2::VPC",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::RouteTable => "AWS::EC2::RouteTable",
            Self::SubnetRouteTableAssociation => "AWS::EC2::SubnetRouteTableAssociation",
            Self::Route => "AWS::EC2::Route",
            Self::InternetGateway => "AWS::EC2::InternetGateway",
            Self::GatewayAttachment => "AWS::EC2::VPCGatewayAttachment",
            Self::ElasticIp => "AWS::EC2::EIP",
            Self::NatGateway => "AWS::EC2::NatGateway",
            Self::SecurityGroup => "AWS::EC2::SecurityGroup",
            Self::SecurityGroupIngress => "AWS::EC2::SecurityGroupIngress",
            Self::Role => "AWS::IAM::Role",
            Self::Policy => "AWS::IAM::Policy",
            Self::VpcEndpoint => "AWS::EC2::VPCEndpoint",
            Self::Bucket => "AWS::S3::Bucket",
            Self::Domain => "AWS::SageMaker::Domain",
            Self::UserProfile => "AWS::SageMaker::UserProfile",
            Self::App => "AWS::SageMaker::App",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Studio Stack Domain Models
//!
//! Value objects shared by every builder in the crate.
//!
//! # Value Objects with Invariants
//!
//! - [`LogicalId`] - resource name within a template (alphanumeric)
//! - [`StackId`] - stack name namespaced by `{namespace}{stage}`
//! - [`VpcId`], [`SubnetId`], [`RouteTableId`], [`AvailabilityZone`] - cloud identifiers
//! - [`Region`] - cloud region, source of managed zone names
//! - [`NetworkDescriptor`] - imported vs managed network
//! - [`NetworkAccessType`] - VPC-only vs public internet domain
//! - [`ResourceKind`] - declared resource taxonomy

pub mod access;
pub mod identifiers;
pub mod network;
pub mod resource_type;

pub use access::NetworkAccessType;
pub use identifiers::{AvailabilityZone, LogicalId, Region, RouteTableId, StackId, SubnetId, VpcId};
pub use network::{ImportedNetwork, NetworkDescriptor, NetworkError};
pub use resource_type::ResourceKind;

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Builders
//!
//! Each builder declares one concern into a [`ResourceGraph`](crate::graph::ResourceGraph)
//! and hands back a handle the composer wires into the rest:
//!
//! - [`NetworkProvider`] - imported or managed private network
//! - [`SecurityPerimeter`] - shared group with self-referencing ingress
//! - [`ExecutionIdentity`] - execution role and its permissions
//! - [`PrivateConnectivityBuilder`] - service endpoints for VPC-only mode
//!
//! No builder performs I/O.

pub mod endpoints;
pub mod identity;
pub mod network;
pub mod perimeter;

pub use endpoints::{
    endpoint_table, EndpointKind, EndpointService, EndpointSpec, OptionalEndpoints,
    PrivateConnectivityBuilder, SubnetScope,
};
pub use identity::{ExecutionIdentity, IdentityOptions, ManagedGrant, PolicyStatement, StorageScope};
pub use network::{NetworkHandle, NetworkOrigin, NetworkProvider};
pub use perimeter::{IngressRule, Protocol, SecurityPerimeter, SELF_INGRESS_RULES};

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Studio stack composition
//!
//! Declares a SageMaker Studio domain inside a private network as a typed
//! resource graph and renders it as provisioning templates. Nothing here
//! talks to a cloud API; the output is a cloud assembly directory that a
//! provisioning engine deploys.

pub mod assembly;
pub mod composer;
pub mod config;
pub mod domain;
pub mod errors;
pub mod graph;
pub mod provisioning;
pub mod state_machine;

// Re-export commonly used types
pub use assembly::{Assembly, Manifest, ManifestEntry};
pub use composer::{Composition, DomainComposer, Stack, StudioDomain, StudioSettings};
pub use config::AppConfig;
pub use domain::{LogicalId, NetworkAccessType, NetworkDescriptor, Region, StackId};
pub use errors::{StackError, StackResult};
pub use graph::{PropertyValue, Resource, ResourceGraph};

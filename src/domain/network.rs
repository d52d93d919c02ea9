// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Descriptor with Validation Invariants
//!
//! A studio domain always lives in a private network. The network is either
//! imported by identifier or declared fresh; [`NetworkDescriptor`] makes that
//! choice a two-variant sum type so nothing downstream inspects which
//! optional fields happen to be present.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::identifiers::{AvailabilityZone, RouteTableId, SubnetId, VpcId};

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Empty {0}")]
    EmptyIdentifier(&'static str),

    #[error("Invalid logical id: {0:?} (must be 1-255 ASCII alphanumeric characters)")]
    InvalidLogicalId(String),

    #[error("Invalid stack id: {0:?} (must start with a letter, alphanumeric or '-', max 128)")]
    InvalidStackId(String),

    #[error("Invalid region: {0:?}")]
    InvalidRegion(String),

    #[error("Imported network {0} has no availability zones")]
    NoAvailabilityZones(String),

    #[error("Imported network has {subnets} subnets, not a multiple of its {zones} availability zones")]
    SubnetZoneMismatch { subnets: usize, zones: usize },

    #[error("Managed network needs at least {min} availability zones, got {requested}")]
    TooFewAvailabilityZones { requested: usize, min: usize },

    #[error("Managed network supports at most {max} availability zones, got {requested}")]
    TooManyAvailabilityZones { requested: usize, max: usize },

    #[error("Network request is ambiguous: both an imported id and a managed zone count were given")]
    AmbiguousRequest,

    #[error("Imported network {0} requires a list of availability zones")]
    MissingAvailabilityZones(String),
}

/// An existing network referenced by identifier
///
/// Nothing here proves the network exists. A wrong id surfaces when the
/// provisioning engine realizes resources placed in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedNetwork {
    pub id: VpcId,
    pub availability_zones: Vec<AvailabilityZone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_subnet_ids: Vec<SubnetId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_route_table_ids: Vec<RouteTableId>,
}

impl ImportedNetwork {
    /// Reference an existing network by id and zones
    pub fn new(id: VpcId, availability_zones: Vec<AvailabilityZone>) -> Self {
        Self {
            id,
            availability_zones,
            private_subnet_ids: Vec::new(),
            private_route_table_ids: Vec::new(),
        }
    }

    /// Attach the private subnets the domain should be placed in
    pub fn with_private_subnets(mut self, subnets: Vec<SubnetId>) -> Self {
        self.private_subnet_ids = subnets;
        self
    }

    /// Attach the route tables used by gateway endpoints
    pub fn with_private_route_tables(mut self, route_tables: Vec<RouteTableId>) -> Self {
        self.private_route_table_ids = route_tables;
        self
    }
}

/// How the private network is obtained
///
/// # Invariants
/// - `Imported`: at least one availability zone; the subnet count is a
///   multiple of the zone count (one subnet per zone per tier)
/// - `Managed`: between [`NetworkDescriptor::MIN_MANAGED_AZS`] and
///   [`NetworkDescriptor::MAX_MANAGED_AZS`] zones
///
/// # Examples
///
/// ```rust
/// use cim_studio_stack::domain::NetworkDescriptor;
///
/// let managed = NetworkDescriptor::managed(2).unwrap();
/// assert!(!managed.is_imported());
/// assert!(NetworkDescriptor::managed(1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum NetworkDescriptor {
    /// Import an existing network
    Imported(ImportedNetwork),

    /// Declare a fresh isolated network
    #[serde(rename_all = "camelCase")]
    Managed { az_count: usize },
}

impl NetworkDescriptor {
    /// Multi-AZ default for studio domains
    pub const MIN_MANAGED_AZS: usize = 2;

    /// Zones are lettered after the region; more than this has no meaning
    pub const MAX_MANAGED_AZS: usize = 6;

    /// Managed network spanning `az_count` zones
    pub fn managed(az_count: usize) -> Result<Self, NetworkError> {
        let descriptor = Self::Managed { az_count };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Imported network, validated
    pub fn imported(network: ImportedNetwork) -> Result<Self, NetworkError> {
        let descriptor = Self::Imported(network);
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Build a descriptor from loosely-typed parts
    ///
    /// An id selects `Imported`; no id selects `Managed` with `az_count`
    /// (default [`Self::MIN_MANAGED_AZS`]). Giving both an id and a zone
    /// count is ambiguous and rejected rather than resolved.
    pub fn from_parts(
        id: Option<VpcId>,
        availability_zones: Option<Vec<AvailabilityZone>>,
        subnet_ids: Vec<SubnetId>,
        route_table_ids: Vec<RouteTableId>,
        az_count: Option<usize>,
    ) -> Result<Self, NetworkError> {
        match (id, az_count) {
            (Some(_), Some(_)) => Err(NetworkError::AmbiguousRequest),
            (Some(id), None) => {
                let zones = availability_zones
                    .ok_or_else(|| NetworkError::MissingAvailabilityZones(id.to_string()))?;
                Self::imported(
                    ImportedNetwork::new(id, zones)
                        .with_private_subnets(subnet_ids)
                        .with_private_route_tables(route_table_ids),
                )
            }
            (None, count) => Self::managed(count.unwrap_or(Self::MIN_MANAGED_AZS)),
        }
    }

    /// Check the descriptor invariants
    pub fn validate(&self) -> Result<(), NetworkError> {
        match self {
            Self::Imported(network) => {
                let zones = network.availability_zones.len();
                if zones == 0 {
                    return Err(NetworkError::NoAvailabilityZones(network.id.to_string()));
                }
                let subnets = network.private_subnet_ids.len();
                if subnets % zones != 0 {
                    return Err(NetworkError::SubnetZoneMismatch { subnets, zones });
                }
                Ok(())
            }
            Self::Managed { az_count } => {
                if *az_count < Self::MIN_MANAGED_AZS {
                    return Err(NetworkError::TooFewAvailabilityZones {
                        requested: *az_count,
                        min: Self::MIN_MANAGED_AZS,
                    });
                }
                if *az_count > Self::MAX_MANAGED_AZS {
                    return Err(NetworkError::TooManyAvailabilityZones {
                        requested: *az_count,
                        max: Self::MAX_MANAGED_AZS,
                    });
                }
                Ok(())
            }
        }
    }

    /// Whether the network is imported
    pub fn is_imported(&self) -> bool {
        matches!(self, Self::Imported(_))
    }
}

impl fmt::Display for NetworkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imported(network) => write!(
                f,
                "imported {} ({} zones)",
                network.id,
                network.availability_zones.len()
            ),
            Self::Managed { az_count } => write!(f, "managed ({az_count} zones)"),
        }
    }
}

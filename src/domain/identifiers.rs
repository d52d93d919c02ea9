// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identifier Value Objects
//!
//! Logical ids name resources inside one stack template, stack ids name
//! templates inside one assembly, and the cloud identifiers name things that
//! already exist in an account. Cloud identifiers are only checked for
//! emptiness: whether `vpc-123` actually exists is decided by the
//! provisioning engine when it realizes the graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::network::NetworkError;

/// Logical id of a resource within one stack template
///
/// # Invariants
/// - 1-255 characters
/// - ASCII alphanumeric only
///
/// # Examples
///
/// ```rust
/// use cim_studio_stack::domain::LogicalId;
///
/// let id = LogicalId::new("SageMakerDomain").unwrap();
/// assert_eq!(id.as_str(), "SageMakerDomain");
/// assert!(LogicalId::new("Sage-Maker").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalId(String);

impl LogicalId {
    /// Maximum logical id length accepted by the provisioning engine
    pub const MAX_LEN: usize = 255;

    /// Create a logical id with validation
    pub fn new(id: impl Into<String>) -> Result<Self, NetworkError> {
        let id = id.into();
        if id.is_empty() || id.len() > Self::MAX_LEN {
            return Err(NetworkError::InvalidLogicalId(id));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(NetworkError::InvalidLogicalId(id));
        }
        Ok(Self(id))
    }

    /// Derive a child id by appending a suffix (`Vpc` + `PrivateSubnet1`)
    pub fn child(&self, suffix: &str) -> Result<Self, NetworkError> {
        Self::new(format!("{}{}", self.0, suffix))
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LogicalId {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LogicalId {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogicalId> for String {
    fn from(id: LogicalId) -> Self {
        id.0
    }
}

/// Stack name, namespaced by `{namespace}{stage}`
///
/// # Invariants
/// - 1-128 characters
/// - Starts with an ASCII letter
/// - ASCII alphanumeric or `-`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StackId(String);

impl StackId {
    /// Maximum stack name length
    pub const MAX_LEN: usize = 128;

    /// Create a stack id with validation
    pub fn new(id: impl Into<String>) -> Result<Self, NetworkError> {
        let id = id.into();
        let starts_with_letter = id.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_with_letter || id.len() > Self::MAX_LEN {
            return Err(NetworkError::InvalidStackId(id));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(NetworkError::InvalidStackId(id));
        }
        Ok(Self(id))
    }

    /// Build the namespaced id `{namespace}{name}`
    pub fn namespaced(namespace: &str, name: &str) -> Result<Self, NetworkError> {
        Self::new(format!("{namespace}{name}"))
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for StackId {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StackId> for String {
    fn from(id: StackId) -> Self {
        id.0
    }
}

/// Declares a non-empty cloud identifier newtype.
macro_rules! cloud_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create the identifier; only emptiness is checked
            pub fn new(id: impl Into<String>) -> Result<Self, NetworkError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(NetworkError::EmptyIdentifier($label));
                }
                Ok(Self(id))
            }

            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = NetworkError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = NetworkError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

cloud_identifier!(
    /// Identifier of an existing virtual network (`vpc-...`)
    VpcId,
    "vpc id"
);

cloud_identifier!(
    /// Identifier of an existing subnet (`subnet-...`)
    SubnetId,
    "subnet id"
);

cloud_identifier!(
    /// Identifier of an existing route table (`rtb-...`)
    RouteTableId,
    "route table id"
);

cloud_identifier!(
    /// Availability zone name (`us-east-1a`)
    AvailabilityZone,
    "availability zone"
);

/// Cloud region (`us-east-1`)
///
/// # Invariants
/// - Non-empty
/// - Lowercase ASCII letters, digits and `-`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    /// Create a region with validation
    pub fn new(region: impl Into<String>) -> Result<Self, NetworkError> {
        let region = region.into();
        let valid = !region.is_empty()
            && region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(NetworkError::InvalidRegion(region));
        }
        Ok(Self(region))
    }

    /// Zone names for the first `count` zones of this region
    ///
    /// Zones are lettered `a`, `b`, `c`... after the region name.
    pub fn zones(&self, count: usize) -> Vec<AvailabilityZone> {
        (b'a'..=b'z')
            .take(count)
            .map(|letter| AvailabilityZone(format!("{}{}", self.0, letter as char)))
            .collect()
    }

    /// Get the region as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Region {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

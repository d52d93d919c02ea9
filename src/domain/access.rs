// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Network Access Mode
//!
//! Chosen once when the domain is first created. Switching modes replaces the
//! domain rather than updating it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How studio applications reach the outside world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NetworkAccessType {
    /// All traffic stays inside the private network via service endpoints
    #[default]
    VpcOnly,

    /// Applications reach services over the public internet
    #[serde(alias = "InternetOnly")]
    PublicInternetOnly,
}

impl NetworkAccessType {
    /// Value written to the domain's `AppNetworkAccessType` property
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VpcOnly => "VpcOnly",
            Self::PublicInternetOnly => "PublicInternetOnly",
        }
    }

    /// Whether private service endpoints are required
    pub fn requires_endpoints(&self) -> bool {
        matches!(self, Self::VpcOnly)
    }
}

impl fmt::Display for NetworkAccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NetworkAccessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VpcOnly" => Ok(Self::VpcOnly),
            "InternetOnly" | "PublicInternetOnly" => Ok(Self::PublicInternetOnly),
            other => Err(format!(
                "unknown access type {other:?} (expected VpcOnly or InternetOnly)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_access_type() {
        assert_eq!("VpcOnly".parse(), Ok(NetworkAccessType::VpcOnly));
        assert_eq!("InternetOnly".parse(), Ok(NetworkAccessType::PublicInternetOnly));
        assert!("Public".parse::<NetworkAccessType>().is_err());
    }

    #[test]
    fn test_deserialize_alias() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: NetworkAccessType,
        }
        let parsed: Wrapper = toml::from_str("mode = \"InternetOnly\"").unwrap();
        assert_eq!(parsed.mode, NetworkAccessType::PublicInternetOnly);
        assert!(!parsed.mode.requires_endpoints());
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Configuration
//!
//! Loads the TOML record the composer is built from and rejects anything
//! missing or malformed before a single resource is declared.
//!
//! ```toml
//! [app]
//! ns = "Demo"
//! stage = "Dev"
//!
//! [aws]
//! region = "us-east-1"
//!
//! [vpc]                       # optional; omit to declare a managed network
//! id = "vpc-0abc"
//! subnetIds = ["subnet-a", "subnet-b"]
//! availabilityZones = ["us-east-1a", "us-east-1b"]
//! routeTableIds = ["rtb-a", "rtb-b"]   # required for VpcOnly
//!
//! [sagemaker]
//! domainName = "studio"
//! accessType = "VpcOnly"      # or InternetOnly
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::composer::STUDIO_STACK_NAME;
use crate::domain::{
    AvailabilityZone, NetworkAccessType, NetworkDescriptor, Region, RouteTableId, StackId, SubnetId, VpcId,
};
use crate::errors::{StackError, StackResult};
use crate::provisioning::{IdentityOptions, OptionalEndpoints, StorageScope};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "studio.toml";

/// Longest domain name the notebook service accepts
pub const MAX_DOMAIN_NAME_LEN: usize = 63;

/// Application naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSection {
    pub ns: String,
    pub stage: String,
}

/// Provider account settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSection {
    pub region: String,
}

/// Existing network to import, or the size of a managed one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcSection {
    pub id: Option<String>,
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    pub availability_zones: Option<Vec<String>>,
    #[serde(default)]
    pub route_table_ids: Vec<String>,
    /// Zone count for a managed network
    pub max_azs: Option<usize>,
}

/// Execution identity switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentitySection {
    pub registry_access: bool,
    pub source_control_access: bool,
    pub bucket_name: Option<String>,
    pub storage_scope: StorageScope,
}

/// Studio domain settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SageMakerSection {
    pub domain_name: String,
    #[serde(default)]
    pub access_type: NetworkAccessType,
    #[serde(default)]
    pub identity: IdentitySection,
    #[serde(default)]
    pub endpoints: OptionalEndpoints,
}

/// The validated configuration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSection,
    pub aws: AwsSection,
    pub vpc: Option<VpcSection>,
    pub sagemaker: SageMakerSection,
}

impl AppConfig {
    /// Read, parse and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> StackResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StackError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&raw)?;
        info!(path = %path.display(), namespace = %config.namespace(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(raw: &str) -> StackResult<Self> {
        let config: Self = toml::from_str(raw)?;
        debug!(?config, "parsed configuration");
        config.validate()?;
        Ok(config)
    }

    /// Fail-fast checks that do not need the provisioning engine
    pub fn validate(&self) -> StackResult<()> {
        require_non_empty("app.ns", &self.app.ns)?;
        require_non_empty("app.stage", &self.app.stage)?;
        StackId::namespaced(&self.namespace(), STUDIO_STACK_NAME).map_err(|_| {
            StackError::Configuration(format!(
                "app.ns and app.stage must form a stack name (letter first, then letters, digits or '-'), got {:?}",
                self.namespace()
            ))
        })?;
        require_non_empty("aws.region", &self.aws.region)?;
        Region::new(self.aws.region.clone()).map_err(config_error)?;
        validate_domain_name(&self.sagemaker.domain_name)?;

        if let Some(vpc) = &self.vpc {
            if let Some(id) = &vpc.id {
                require_non_empty("vpc.id", id)?;
                let zones = vpc.availability_zones.as_deref().unwrap_or_default();
                if zones.is_empty() {
                    return Err(StackError::Configuration(
                        "vpc.availabilityZones is required when vpc.id is set".into(),
                    ));
                }
                if self.sagemaker.access_type.requires_endpoints() && vpc.route_table_ids.is_empty() {
                    return Err(StackError::Configuration(
                        "vpc.routeTableIds is required for a VpcOnly domain in an imported network".into(),
                    ));
                }
                if vpc.subnet_ids.len() % zones.len() != 0 {
                    return Err(StackError::Configuration(format!(
                        "vpc.subnetIds has {} entries, not a multiple of {} availability zones",
                        vpc.subnet_ids.len(),
                        zones.len()
                    )));
                }
            }
        }

        let identity = &self.sagemaker.identity;
        if identity.storage_scope == StorageScope::Bucket && identity.bucket_name.is_none() {
            return Err(StackError::Configuration(
                "sagemaker.identity.bucketName is required when storageScope = \"bucket\"".into(),
            ));
        }
        if let Some(bucket) = &identity.bucket_name {
            require_non_empty("sagemaker.identity.bucketName", bucket)?;
        }
        Ok(())
    }

    /// Stack namespace: `{ns}{stage}`
    pub fn namespace(&self) -> String {
        format!("{}{}", self.app.ns, self.app.stage)
    }

    pub fn region(&self) -> StackResult<Region> {
        Region::new(self.aws.region.clone()).map_err(config_error)
    }

    pub fn access_type(&self) -> NetworkAccessType {
        self.sagemaker.access_type
    }

    /// Network descriptor: `[vpc].id` imports, anything else is managed
    pub fn network_descriptor(&self) -> StackResult<NetworkDescriptor> {
        let Some(vpc) = &self.vpc else {
            return Ok(NetworkDescriptor::managed(NetworkDescriptor::MIN_MANAGED_AZS)?);
        };

        let id = vpc.id.clone().map(VpcId::new).transpose()?;
        let zones = vpc
            .availability_zones
            .as_ref()
            .map(|zones| zones.iter().cloned().map(AvailabilityZone::new).collect::<Result<Vec<_>, _>>())
            .transpose()?;
        let subnets = vpc
            .subnet_ids
            .iter()
            .cloned()
            .map(SubnetId::new)
            .collect::<Result<Vec<_>, _>>()?;
        let route_tables = vpc
            .route_table_ids
            .iter()
            .cloned()
            .map(RouteTableId::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NetworkDescriptor::from_parts(id, zones, subnets, route_tables, vpc.max_azs)?)
    }

    pub fn identity_options(&self) -> IdentityOptions {
        let identity = &self.sagemaker.identity;
        IdentityOptions {
            registry_access: identity.registry_access,
            source_control_access: identity.source_control_access,
            bucket_name: identity.bucket_name.clone(),
            storage_scope: identity.storage_scope,
        }
    }
}

fn config_error(err: impl std::fmt::Display) -> StackError {
    StackError::Configuration(err.to_string())
}

fn require_non_empty(field: &str, value: &str) -> StackResult<()> {
    if value.trim().is_empty() {
        return Err(StackError::Configuration(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Domain names: 1-63 characters, alphanumeric and `-`, starting and ending
/// with an alphanumeric character
pub fn validate_domain_name(name: &str) -> StackResult<()> {
    let bytes = name.as_bytes();
    let valid = !bytes.is_empty()
        && bytes.len() <= MAX_DOMAIN_NAME_LEN
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        && bytes.first().is_some_and(u8::is_ascii_alphanumeric)
        && bytes.last().is_some_and(u8::is_ascii_alphanumeric);
    if !valid {
        return Err(StackError::Configuration(format!(
            "sagemaker.domainName {name:?} must be 1-{MAX_DOMAIN_NAME_LEN} alphanumeric or '-' characters, \
             starting and ending with an alphanumeric"
        )));
    }
    Ok(())
}

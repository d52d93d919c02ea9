// Copyright (c) 2025 - Cowboy AI, Inc.
//! Studio Resources
//!
//! Domain, user profile and application. Each one carries an explicit
//! `DependsOn` on its parent even where a `GetAtt` already implies the edge,
//! so no engine-side reordering can realize a child first.

use serde::Serialize;

use crate::domain::{LogicalId, NetworkAccessType, ResourceKind};
use crate::errors::StackResult;
use crate::graph::{PropertyValue, Resource, ResourceGraph};
use crate::provisioning::{ExecutionIdentity, IdentityOptions, NetworkHandle, OptionalEndpoints, SecurityPerimeter};

pub const DOMAIN_ID: &str = "SageMakerDomain";
pub const USER_PROFILE_ID: &str = "SageMakerUserProfile";
pub const APPLICATION_ID: &str = "DefaultJupyterServerApp";

/// Settings for the domain and its default profile and application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioSettings {
    pub domain_name: String,
    pub access_type: NetworkAccessType,
    pub identity: IdentityOptions,
    pub endpoints: OptionalEndpoints,
    pub user_profile_name: String,
    pub app_name: String,
    pub app_type: String,
    pub instance_type: String,
}

impl StudioSettings {
    pub fn new(domain_name: impl Into<String>, access_type: NetworkAccessType) -> Self {
        Self {
            domain_name: domain_name.into(),
            access_type,
            identity: IdentityOptions::default(),
            endpoints: OptionalEndpoints::default(),
            user_profile_name: "default".into(),
            app_name: "default".into(),
            app_type: "JupyterServer".into(),
            instance_type: "system".into(),
        }
    }
}

/// Logical ids of the declared studio resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudioDomain {
    pub domain: LogicalId,
    pub user_profile: LogicalId,
    pub application: LogicalId,
}

fn resource_spec(instance_type: &str) -> PropertyValue {
    PropertyValue::map([("InstanceType", instance_type)])
}

pub(super) fn declare_domain(
    settings: &StudioSettings,
    network: &NetworkHandle,
    identity: &ExecutionIdentity,
    perimeter: &SecurityPerimeter,
    graph: &mut ResourceGraph,
) -> StackResult<LogicalId> {
    let user_settings = PropertyValue::map([
        ("ExecutionRole", identity.arn()),
        ("SecurityGroups", PropertyValue::list(vec![perimeter.group_ref()])),
        (
            "JupyterServerAppSettings",
            PropertyValue::map([("DefaultResourceSpec", resource_spec(&settings.instance_type))]),
        ),
    ]);

    let domain = graph.add(
        Resource::new(LogicalId::new(DOMAIN_ID)?, ResourceKind::Domain)
            .with("AppNetworkAccessType", settings.access_type.as_str())
            .with("AuthMode", "IAM")
            .with("DefaultUserSettings", user_settings)
            .with("DomainName", settings.domain_name.clone())
            .with("SubnetIds", network.private_subnet_ids.clone())
            .with("VpcId", network.id.clone())
            // The role's inline policy must be attached before the domain uses it
            .depends_on(identity.policy()),
    )?;
    Ok(domain)
}

pub(super) fn declare_user_profile(
    settings: &StudioSettings,
    domain: &LogicalId,
    identity: &ExecutionIdentity,
    graph: &mut ResourceGraph,
) -> StackResult<LogicalId> {
    let profile = graph.add(
        Resource::new(LogicalId::new(USER_PROFILE_ID)?, ResourceKind::UserProfile)
            .with("DomainId", PropertyValue::attribute(domain, "DomainId"))
            .with("UserProfileName", settings.user_profile_name.clone())
            .with("UserSettings", PropertyValue::map([("ExecutionRole", identity.arn())]))
            .depends_on(domain),
    )?;
    Ok(profile)
}

pub(super) fn declare_application(
    settings: &StudioSettings,
    domain: &LogicalId,
    profile: &LogicalId,
    graph: &mut ResourceGraph,
) -> StackResult<LogicalId> {
    let app = graph.add(
        Resource::new(LogicalId::new(APPLICATION_ID)?, ResourceKind::App)
            .with("AppName", settings.app_name.clone())
            .with("AppType", settings.app_type.clone())
            .with("DomainId", PropertyValue::attribute(domain, "DomainId"))
            .with("UserProfileName", settings.user_profile_name.clone())
            .with("ResourceSpec", resource_spec(&settings.instance_type))
            .depends_on(profile),
    )?;
    Ok(app)
}

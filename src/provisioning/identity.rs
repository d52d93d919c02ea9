// Copyright (c) 2025 - Cowboy AI, Inc.
//! Execution Identity
//!
//! The role assumed by studio applications. Its permissions are built from
//! coarse managed grants plus a few fine-grained statements. Permissions are
//! additive: there is no way to take a grant or statement back once added.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{LogicalId, ResourceKind};
use crate::errors::{StackError, StackResult};
use crate::graph::{PropertyValue, RemovalPolicy, Resource, ResourceGraph};

/// Service principal allowed to assume the execution role
pub const SAGEMAKER_PRINCIPAL: &str = "sagemaker.amazonaws.com";

/// Policy document language version
pub const POLICY_VERSION: &str = "2012-10-17";

/// Coarse capability grant backed by a provider-managed policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagedGrant {
    SageMakerFullAccess,
    SageMakerCanvasFullAccess,
    SageMakerCanvasAiServicesAccess,
    RekognitionReadOnlyAccess,
    ContainerRegistryFullAccess,
    CodeCommitPowerUser,
}

impl ManagedGrant {
    /// Managed policy name
    pub fn policy_name(&self) -> &'static str {
        match self {
            Self::SageMakerFullAccess => "AmazonSageMakerFullAccess",
            Self::SageMakerCanvasFullAccess => "AmazonSageMakerCanvasFullAccess",
            Self::SageMakerCanvasAiServicesAccess => "AmazonSageMakerCanvasAIServicesAccess",
            Self::RekognitionReadOnlyAccess => "AmazonRekognitionReadOnlyAccess",
            Self::ContainerRegistryFullAccess => "AmazonEC2ContainerRegistryFullAccess",
            Self::CodeCommitPowerUser => "AWSCodeCommitPowerUser",
        }
    }

    /// Managed policy ARN
    pub fn arn(&self) -> String {
        format!("arn:aws:iam::aws:policy/{}", self.policy_name())
    }
}

/// Grants every studio identity carries
pub const BASELINE_GRANTS: [ManagedGrant; 4] = [
    ManagedGrant::SageMakerFullAccess,
    ManagedGrant::SageMakerCanvasFullAccess,
    ManagedGrant::SageMakerCanvasAiServicesAccess,
    ManagedGrant::RekognitionReadOnlyAccess,
];

/// Object-level storage operations granted to the identity
pub const STORAGE_ACTIONS: [&str; 4] = [
    "s3:GetObject",
    "s3:PutObject",
    "s3:DeleteObject",
    "s3:ListBucket",
];

/// Inference recommendation operations
pub const RECOMMENDATION_ACTIONS: [&str; 1] = ["codewhisperer:GenerateRecommendations"];

/// Resource pattern covering every bucket and object
pub const UNSCOPED_STORAGE_PATTERN: &str = "arn:aws:s3:::*";

/// Which storage resources the storage statement covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    /// Every bucket, including ones owned outside this stack
    #[default]
    Unscoped,
    /// Only the bucket declared by this stack
    Bucket,
}

/// Options for assembling the identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityOptions {
    /// Add container registry access
    pub registry_access: bool,
    /// Add source control access
    pub source_control_access: bool,
    /// Declare a studio bucket with this name
    pub bucket_name: Option<String>,
    pub storage_scope: StorageScope,
}

/// A fine-grained allow statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub resources: Vec<PropertyValue>,
}

impl PolicyStatement {
    pub fn allow<A: Into<String>>(actions: impl IntoIterator<Item = A>, resources: Vec<PropertyValue>) -> Self {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            resources,
        }
    }

    fn to_property(&self) -> PropertyValue {
        let resource = match self.resources.as_slice() {
            [single] => single.clone(),
            many => PropertyValue::List(many.to_vec()),
        };
        PropertyValue::map([
            ("Action", PropertyValue::list(self.actions.clone())),
            ("Effect", "Allow".into()),
            ("Resource", resource),
        ])
    }
}

/// The execution role with its grants and statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionIdentity {
    role: LogicalId,
    policy: LogicalId,
    bucket: Option<LogicalId>,
    grants: Vec<ManagedGrant>,
    statements: Vec<PolicyStatement>,
}

impl ExecutionIdentity {
    pub const ROLE_ID: &'static str = "SageMakerExecutionRole";

    /// Assemble the identity and declare it in `graph`
    pub fn build(options: &IdentityOptions, graph: &mut ResourceGraph) -> StackResult<Self> {
        let role = LogicalId::new(Self::ROLE_ID)?;
        let mut identity = Self {
            policy: role.child("DefaultPolicy")?,
            role,
            bucket: None,
            grants: Vec::new(),
            statements: Vec::new(),
        };

        for grant in BASELINE_GRANTS {
            identity.add_grant(grant);
        }
        if options.registry_access {
            identity.add_grant(ManagedGrant::ContainerRegistryFullAccess);
        }
        if options.source_control_access {
            identity.add_grant(ManagedGrant::CodeCommitPowerUser);
        }

        if let Some(name) = &options.bucket_name {
            let bucket = graph.add(
                Resource::new(LogicalId::new("StudioBucket")?, ResourceKind::Bucket)
                    .with("BucketName", name.clone())
                    .removal_policy(RemovalPolicy::Destroy),
            )?;
            identity.bucket = Some(bucket);
        }

        let storage_resources = match (options.storage_scope, &identity.bucket) {
            (StorageScope::Bucket, Some(bucket)) => vec![
                PropertyValue::attribute(bucket, "Arn"),
                PropertyValue::Join(
                    "".into(),
                    vec![PropertyValue::attribute(bucket, "Arn"), "/*".into()],
                ),
            ],
            (StorageScope::Bucket, None) => {
                return Err(StackError::Composition(
                    "bucket-scoped storage access requires a declared bucket".into(),
                ))
            }
            (StorageScope::Unscoped, _) => vec![PropertyValue::from(UNSCOPED_STORAGE_PATTERN)],
        };
        identity.add_statement(PolicyStatement::allow(STORAGE_ACTIONS, storage_resources));
        identity.add_statement(PolicyStatement::allow(RECOMMENDATION_ACTIONS, vec!["*".into()]));

        identity.declare(graph)?;
        debug!(
            role = %identity.role,
            grants = identity.grants.len(),
            statements = identity.statements.len(),
            "declared execution identity"
        );
        Ok(identity)
    }

    /// Add a managed grant; duplicates are ignored
    fn add_grant(&mut self, grant: ManagedGrant) {
        if !self.grants.contains(&grant) {
            self.grants.push(grant);
        }
    }

    fn add_statement(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    pub fn role(&self) -> &LogicalId {
        &self.role
    }

    /// Logical id of the inline policy holding the statements
    pub fn policy(&self) -> &LogicalId {
        &self.policy
    }

    pub fn bucket(&self) -> Option<&LogicalId> {
        self.bucket.as_ref()
    }

    /// Reference to the role ARN
    pub fn arn(&self) -> PropertyValue {
        PropertyValue::attribute(&self.role, "Arn")
    }

    pub fn grants(&self) -> &[ManagedGrant] {
        &self.grants
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    fn declare(&self, graph: &mut ResourceGraph) -> StackResult<()> {
        let trust = PropertyValue::map([
            (
                "Statement",
                PropertyValue::list(vec![PropertyValue::map([
                    ("Action", PropertyValue::from("sts:AssumeRole")),
                    ("Effect", "Allow".into()),
                    ("Principal", PropertyValue::map([("Service", SAGEMAKER_PRINCIPAL)])),
                ])]),
            ),
            ("Version", POLICY_VERSION.into()),
        ]);

        graph.add(
            Resource::new(self.role.clone(), ResourceKind::Role)
                .with("AssumeRolePolicyDocument", trust)
                .with(
                    "ManagedPolicyArns",
                    PropertyValue::list(self.grants.iter().map(ManagedGrant::arn)),
                ),
        )?;

        graph.add(
            Resource::new(self.policy.clone(), ResourceKind::Policy)
                .with(
                    "PolicyDocument",
                    PropertyValue::map([
                        (
                            "Statement",
                            PropertyValue::list(self.statements.iter().map(PolicyStatement::to_property)),
                        ),
                        ("Version", POLICY_VERSION.into()),
                    ]),
                )
                .with("PolicyName", self.policy.to_string())
                .with("Roles", vec![PropertyValue::reference(&self.role)]),
        )?;
        Ok(())
    }
}

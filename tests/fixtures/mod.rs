// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-studio-stack
//!
//! Configuration documents shared by the integration tests. Every fixture
//! parses and validates; tests that need a broken document edit one of these.

#![allow(dead_code)]

use cim_studio_stack::{AppConfig, Composition, DomainComposer};

/// Imported network with two zones and one subnet per zone
pub const IMPORTED_CONFIG: &str = r#"
[app]
ns = "Demo"
stage = "Dev"

[aws]
region = "us-east-1"

[vpc]
id = "vpc-0abc"
subnetIds = ["subnet-a", "subnet-b"]
availabilityZones = ["us-east-1a", "us-east-1b"]
routeTableIds = ["rtb-a", "rtb-b"]

[sagemaker]
domainName = "studio"
accessType = "VpcOnly"
"#;

/// No `[vpc]` section: the composer declares a managed network
pub const MANAGED_CONFIG: &str = r#"
[app]
ns = "Demo"
stage = "Prod"

[aws]
region = "eu-west-1"

[sagemaker]
domainName = "research-studio"
"#;

/// Public internet domain with extra grants and a bucket
pub const INTERNET_CONFIG: &str = r#"
[app]
ns = "Lab"
stage = "Test"

[aws]
region = "us-west-2"

[vpc]
id = "vpc-0def"
subnetIds = ["subnet-1", "subnet-2", "subnet-3", "subnet-4"]
availabilityZones = ["us-west-2a", "us-west-2b"]

[sagemaker]
domainName = "lab"
accessType = "InternetOnly"

[sagemaker.identity]
registryAccess = true
sourceControlAccess = true
bucketName = "lab-studio-data"
storageScope = "bucket"
"#;

pub fn config(raw: &str) -> AppConfig {
    AppConfig::from_toml_str(raw).expect("fixture config must be valid")
}

pub fn compose(raw: &str) -> Composition {
    DomainComposer::from_config(&config(raw))
        .expect("fixture composer")
        .compose()
        .expect("fixture composition")
}

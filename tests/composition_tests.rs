// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composition Tests
//!
//! End-to-end checks from configuration text to rendered templates.

mod fixtures;

use cim_studio_stack::domain::ResourceKind;
use cim_studio_stack::provisioning::{endpoint_table, SELF_INGRESS_RULES};
use cim_studio_stack::state_machine::composition::Milestone;
use cim_studio_stack::{LogicalId, NetworkAccessType, PropertyValue};
use fixtures::{compose, IMPORTED_CONFIG, INTERNET_CONFIG, MANAGED_CONFIG};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn id(s: &str) -> LogicalId {
    LogicalId::new(s).unwrap()
}

#[test_case(IMPORTED_CONFIG, &["DemoDevSagemakerStudioStack"]; "imported network")]
#[test_case(MANAGED_CONFIG, &["DemoProdVpcStack", "DemoProdSagemakerStudioStack"]; "managed network")]
#[test_case(INTERNET_CONFIG, &["LabTestSagemakerStudioStack"]; "internet access")]
fn test_stack_layout(config: &str, expected: &[&str]) {
    let composition = compose(config);
    let ids: Vec<&str> = composition.stacks.iter().map(|s| s.id().as_str()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_studio_resources_are_chained() {
    let composition = compose(IMPORTED_CONFIG);
    let graph = composition.studio_stack().unwrap().graph();
    let studio = &composition.studio;

    assert!(graph.depends_transitively(&studio.user_profile, &studio.domain));
    assert!(graph.depends_transitively(&studio.application, &studio.user_profile));
    assert!(graph.depends_transitively(&studio.application, &studio.domain));
    assert!(graph.depends_transitively(&studio.domain, composition.identity.role()));
    assert!(!graph.depends_transitively(&studio.domain, &studio.application));

    let order = graph.realization_order().unwrap();
    let position = |target: &LogicalId| order.iter().position(|id| id == target).unwrap();
    assert!(position(&studio.domain) < position(&studio.user_profile));
    assert!(position(&studio.user_profile) < position(&studio.application));
}

#[test]
fn test_endpoints_do_not_wait_for_studio() {
    let composition = compose(IMPORTED_CONFIG);
    let graph = composition.studio_stack().unwrap().graph();
    for endpoint in &composition.endpoints {
        assert!(!graph.depends_transitively(&endpoint.logical_id, &composition.studio.domain));
        assert!(!graph.depends_transitively(&composition.studio.domain, &endpoint.logical_id));
    }
}

#[test]
fn test_domain_properties() {
    let composition = compose(IMPORTED_CONFIG);
    let template = composition.studio_stack().unwrap().template();
    let domain = &template["Resources"]["SageMakerDomain"];

    assert_eq!(domain["Type"], json!("AWS::SageMaker::Domain"));
    assert_eq!(domain["Properties"]["AppNetworkAccessType"], json!("VpcOnly"));
    assert_eq!(domain["Properties"]["AuthMode"], json!("IAM"));
    assert_eq!(domain["Properties"]["DomainName"], json!("studio"));
    assert_eq!(domain["Properties"]["VpcId"], json!("vpc-0abc"));
    assert_eq!(domain["Properties"]["SubnetIds"], json!(["subnet-a", "subnet-b"]));
    assert_eq!(
        domain["Properties"]["DefaultUserSettings"]["SecurityGroups"],
        json!([{ "Fn::GetAtt": ["SageMakerSecurityGroup", "GroupId"] }])
    );
    assert_eq!(
        domain["Properties"]["DefaultUserSettings"]["ExecutionRole"],
        json!({ "Fn::GetAtt": ["SageMakerExecutionRole", "Arn"] })
    );
}

#[test]
fn test_user_profile_and_app_properties() {
    let composition = compose(IMPORTED_CONFIG);
    let template = composition.studio_stack().unwrap().template();

    let profile = &template["Resources"]["SageMakerUserProfile"];
    assert_eq!(profile["Properties"]["UserProfileName"], json!("default"));
    assert_eq!(
        profile["Properties"]["DomainId"],
        json!({ "Fn::GetAtt": ["SageMakerDomain", "DomainId"] })
    );
    assert_eq!(profile["DependsOn"], json!(["SageMakerDomain"]));

    let app = &template["Resources"]["DefaultJupyterServerApp"];
    assert_eq!(app["Properties"]["AppType"], json!("JupyterServer"));
    assert_eq!(app["Properties"]["AppName"], json!("default"));
    assert_eq!(app["Properties"]["ResourceSpec"], json!({ "InstanceType": "system" }));
    assert_eq!(app["DependsOn"], json!(["SageMakerUserProfile"]));
}

#[test]
fn test_perimeter_rules_reference_own_group() {
    let composition = compose(IMPORTED_CONFIG);
    let graph = composition.studio_stack().unwrap().graph();
    let group = composition.perimeter.group();

    let ingress: Vec<_> = graph.of_kind(ResourceKind::SecurityGroupIngress).collect();
    assert_eq!(ingress.len(), SELF_INGRESS_RULES.len());
    for rule in ingress {
        let source = rule.property("SourceSecurityGroupId").unwrap();
        assert_eq!(source, &PropertyValue::attribute(group, "GroupId"));
        assert_eq!(rule.property("GroupId"), Some(source));
    }
}

#[test_case(IMPORTED_CONFIG, NetworkAccessType::VpcOnly; "vpc only")]
#[test_case(INTERNET_CONFIG, NetworkAccessType::PublicInternetOnly; "internet only")]
fn test_endpoint_set_follows_access_type(config: &str, access: NetworkAccessType) {
    let composition = compose(config);
    let graph = composition.studio_stack().unwrap().graph();
    let declared: Vec<&str> = graph
        .of_kind(ResourceKind::VpcEndpoint)
        .map(|r| r.logical_id().as_str())
        .collect();
    let expected: Vec<&str> = endpoint_table(access).iter().map(|s| s.name).collect();
    assert_eq!(declared, expected);
}

#[test]
fn test_optional_endpoints_can_be_disabled() {
    let raw = format!("{IMPORTED_CONFIG}\n[sagemaker.endpoints]\nimageRecognition = false\n");
    let composition = compose(&raw);
    let graph = composition.studio_stack().unwrap().graph();
    assert!(!graph.contains(&id("RekognitionEndpoint")));
    assert!(graph.contains(&id("ServiceCatalogEndpoint")));
}

#[test]
fn test_gateway_endpoint_uses_route_tables() {
    let composition = compose(IMPORTED_CONFIG);
    let graph = composition.studio_stack().unwrap().graph();
    let s3 = graph.get(&id("S3GatewayEndpoint")).unwrap();
    assert_eq!(s3.property("VpcEndpointType"), Some(&PropertyValue::from("Gateway")));
    assert_eq!(
        s3.property("RouteTableIds"),
        Some(&PropertyValue::from(vec!["rtb-a", "rtb-b"]))
    );
    assert!(s3.property("SubnetIds").is_none());
}

#[test]
fn test_managed_network_is_imported_by_studio_stack() {
    let composition = compose(MANAGED_CONFIG);
    let network_stack = composition.network_stack().unwrap();
    let studio_stack = composition.studio_stack().unwrap();

    assert_eq!(studio_stack.dependencies(), &[network_stack.id().clone()]);
    assert_eq!(network_stack.graph().of_kind(ResourceKind::NatGateway).count(), 2);
    assert!(studio_stack.graph().of_kind(ResourceKind::Vpc).next().is_none());

    let template = studio_stack.template();
    assert_eq!(
        template["Resources"]["SageMakerDomain"]["Properties"]["VpcId"],
        json!({ "Fn::ImportValue": "DemoProdVpcStack:VpcId" })
    );

    let outputs = network_stack.template()["Outputs"].clone();
    assert_eq!(outputs["VpcId"]["Export"]["Name"], json!("DemoProdVpcStack:VpcId"));
    assert_eq!(
        outputs["PrivateSubnet2"]["Export"]["Name"],
        json!("DemoProdVpcStack:PrivateSubnet2")
    );
}

#[test]
fn test_identity_options_flow_from_config() {
    let composition = compose(INTERNET_CONFIG);
    let graph = composition.studio_stack().unwrap().graph();

    assert!(composition.identity.bucket().is_some());
    let role = graph.get(composition.identity.role()).unwrap();
    let arns = role.property("ManagedPolicyArns").and_then(PropertyValue::as_list).unwrap();
    assert!(arns
        .iter()
        .any(|arn| arn.as_str() == Some("arn:aws:iam::aws:policy/AmazonEC2ContainerRegistryFullAccess")));
    assert!(arns
        .iter()
        .any(|arn| arn.as_str() == Some("arn:aws:iam::aws:policy/AWSCodeCommitPowerUser")));
}

#[test]
fn test_every_milestone_recorded() {
    let composition = compose(MANAGED_CONFIG);
    assert_eq!(composition.milestones(), Milestone::ALL.to_vec());
    let last = composition.history.last().unwrap();
    assert!(last.to.is_complete());
}

#[test]
fn test_outputs_present() {
    let composition = compose(IMPORTED_CONFIG);
    let outputs = composition.studio_stack().unwrap().graph().outputs();
    let names: Vec<&str> = outputs.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["DomainId", "DomainArn", "ExecutionRoleArn"]);
}

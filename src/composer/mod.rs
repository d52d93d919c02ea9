// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Composer
//!
//! Declares a complete studio deployment: network, execution identity,
//! security perimeter, private endpoints, and the domain with its default
//! user profile and application.
//!
//! # Stack Layout
//!
//! - Imported network: one `{namespace}SagemakerStudioStack`
//! - Managed network: `{namespace}VpcStack` exporting the network handle,
//!   plus the studio stack importing it and depending on it
//!
//! # Ordering
//!
//! Milestones are driven through [`CompositionProgress`] as resources are
//! declared, and the finished graph is checked for the edges that carry the
//! same ordering to the provisioning engine:
//!
//! - user profile waits for the domain
//! - application waits for the user profile
//! - domain waits for the execution identity
//!
//! Endpoints have no edge to the studio resources and realize in parallel.

pub mod stack;
pub mod studio;

pub use stack::Stack;
pub use studio::{StudioDomain, StudioSettings};

use chrono::Utc;
use tracing::{debug, info};

use crate::assembly::Assembly;
use crate::config::AppConfig;
use crate::domain::{LogicalId, NetworkDescriptor, Region, StackId};
use crate::errors::{StackError, StackResult};
use crate::graph::{Output, PropertyValue, ResourceGraph};
use crate::provisioning::{
    EndpointSpec, ExecutionIdentity, NetworkHandle, NetworkProvider, PrivateConnectivityBuilder,
    SecurityPerimeter,
};
use crate::state_machine::composition::{CompositionProgress, Milestone};
use crate::state_machine::{StateInvariant, StateMachineWithHistory, Transition, TransitionError};

/// Stack name suffix for the studio stack
pub const STUDIO_STACK_NAME: &str = "SagemakerStudioStack";

/// Stack name suffix for a managed network stack
pub const NETWORK_STACK_NAME: &str = "VpcStack";

/// Result of one composition pass
#[derive(Debug, Clone)]
pub struct Composition {
    /// Stacks in declaration order; the studio stack is always last
    pub stacks: Vec<Stack>,
    /// Network handle as used by the studio stack
    pub network: NetworkHandle,
    /// Handle of a network declared by this composition, for reuse by other stacks
    pub exported_network: Option<NetworkHandle>,
    pub identity: ExecutionIdentity,
    pub perimeter: SecurityPerimeter,
    pub endpoints: Vec<EndpointSpec>,
    pub studio: StudioDomain,
    pub history: Vec<Transition<CompositionProgress, Milestone>>,
}

impl Composition {
    pub fn studio_stack(&self) -> Option<&Stack> {
        self.stacks.last()
    }

    pub fn network_stack(&self) -> Option<&Stack> {
        if self.exported_network.is_some() {
            self.stacks.first()
        } else {
            None
        }
    }

    /// Milestones in the order they were reached
    pub fn milestones(&self) -> Vec<Milestone> {
        self.history.iter().map(|t| t.input).collect()
    }

    pub fn into_assembly(self) -> StackResult<Assembly> {
        Assembly::new(self.stacks)
    }
}

/// Composes the studio deployment for one namespace
#[derive(Debug, Clone)]
pub struct DomainComposer {
    namespace: String,
    region: Region,
    network: NetworkDescriptor,
    settings: StudioSettings,
}

impl DomainComposer {
    pub fn new(
        namespace: impl Into<String>,
        region: Region,
        network: NetworkDescriptor,
        settings: StudioSettings,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            region,
            network,
            settings,
        }
    }

    /// Build a composer from validated configuration
    pub fn from_config(config: &AppConfig) -> StackResult<Self> {
        let mut settings = StudioSettings::new(config.sagemaker.domain_name.clone(), config.access_type());
        settings.identity = config.identity_options();
        settings.endpoints = config.sagemaker.endpoints;
        Ok(Self::new(
            config.namespace(),
            config.region()?,
            config.network_descriptor()?,
            settings,
        ))
    }

    pub fn settings(&self) -> &StudioSettings {
        &self.settings
    }

    /// Declare every stack
    pub fn compose(&self) -> StackResult<Composition> {
        let mut stages = StateMachineWithHistory::new(CompositionProgress::new());
        let studio_stack_id = StackId::namespaced(&self.namespace, STUDIO_STACK_NAME)?;
        let provider = NetworkProvider::new(self.region.clone())?;

        let mut stacks = Vec::new();
        let mut graph = ResourceGraph::new();

        let (network, exported_network) = match &self.network {
            NetworkDescriptor::Managed { .. } => {
                let network_stack_id = StackId::namespaced(&self.namespace, NETWORK_STACK_NAME)?;
                let mut network_graph = ResourceGraph::new();
                let handle = provider.resolve(&self.network, &mut network_graph)?;
                handle.export(&mut network_graph, network_stack_id.as_str())?;
                let consumed = handle.consumed_via_exports(network_stack_id.as_str());
                stacks.push(Stack::new(
                    network_stack_id,
                    "Private network for the studio domain",
                    network_graph,
                ));
                (consumed, Some(handle))
            }
            NetworkDescriptor::Imported(_) => (provider.resolve(&self.network, &mut graph)?, None),
        };
        if network.private_subnet_ids.is_empty() {
            return Err(StackError::Composition(
                "studio domain needs at least one private subnet".into(),
            ));
        }
        advance(&mut stages, Milestone::NetworkReady)?;

        let identity = ExecutionIdentity::build(&self.settings.identity, &mut graph)?;
        advance(&mut stages, Milestone::IdentityReady)?;

        let perimeter = SecurityPerimeter::build(&network, &mut graph)?;
        advance(&mut stages, Milestone::PerimeterReady)?;

        let endpoints = PrivateConnectivityBuilder::new(
            self.region.clone(),
            self.settings.access_type,
            self.settings.endpoints,
        )
        .build(&network, &perimeter, &mut graph)?;
        advance(&mut stages, Milestone::EndpointsReady)?;

        let domain = studio::declare_domain(&self.settings, &network, &identity, &perimeter, &mut graph)?;
        advance(&mut stages, Milestone::DomainCreated)?;

        let user_profile = studio::declare_user_profile(&self.settings, &domain, &identity, &mut graph)?;
        advance(&mut stages, Milestone::UserProfileCreated)?;

        let application = studio::declare_application(&self.settings, &domain, &user_profile, &mut graph)?;
        advance(&mut stages, Milestone::ApplicationCreated)?;

        let studio = StudioDomain {
            domain,
            user_profile,
            application,
        };

        graph.add_output("DomainId", Output::new(PropertyValue::attribute(&studio.domain, "DomainId")))?;
        graph.add_output("DomainArn", Output::new(PropertyValue::attribute(&studio.domain, "DomainArn")))?;
        graph.add_output(
            "ExecutionRoleArn",
            Output::new(identity.arn()).with_description("Role assumed by studio applications"),
        )?;

        verify_ordering(&graph, &studio, &identity)?;
        let progress = stages.current_state();
        progress
            .check_invariants()
            .map_err(TransitionError::PostconditionViolated)?;
        if !progress.is_complete() {
            return Err(TransitionError::PostconditionViolated("composition incomplete".into()).into());
        }

        let mut studio_stack = Stack::new(studio_stack_id, "SageMaker Studio domain in a private network", graph);
        if let Some(network_stack) = stacks.first() {
            studio_stack.add_dependency(network_stack.id().clone());
        }

        info!(
            namespace = %self.namespace,
            access = %self.settings.access_type,
            network = %self.network,
            stacks = stacks.len() + 1,
            resources = studio_stack.graph().len(),
            endpoints = endpoints.len(),
            "composed studio deployment"
        );
        stacks.push(studio_stack);

        Ok(Composition {
            stacks,
            network,
            exported_network,
            identity,
            perimeter,
            endpoints,
            studio,
            history: stages.get_history().to_vec(),
        })
    }
}

fn advance(
    stages: &mut StateMachineWithHistory<CompositionProgress>,
    milestone: Milestone,
) -> StackResult<()> {
    let unblocked = stages.transition_with_history(milestone, Utc::now())?;
    debug!(%milestone, ?unblocked, "composition milestone reached");
    Ok(())
}

/// Check that the graph carries every ordering edge the studio needs
fn verify_ordering(graph: &ResourceGraph, studio: &StudioDomain, identity: &ExecutionIdentity) -> StackResult<()> {
    graph.validate()?;
    let required: [(&LogicalId, &LogicalId); 3] = [
        (&studio.user_profile, &studio.domain),
        (&studio.application, &studio.user_profile),
        (&studio.domain, identity.role()),
    ];
    for (dependent, dependency) in required {
        let explicit = graph
            .get(dependent)
            .is_some_and(|r| r.all_dependencies().contains(dependency));
        if !explicit {
            return Err(StackError::Composition(format!(
                "{dependent} is missing its dependency on {dependency}"
            )));
        }
    }
    Ok(())
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composition Stage Machine
//!
//! Tracks which parts of a studio stack have been declared. Uses the generic
//! StateMachine trait from the parent module.
//!
//! # State Machine Type
//!
//! This is a **Mealy Machine**: the output (milestones newly unblocked)
//! depends on both the reached set and the milestone being entered.
//!
//! # Milestones
//!
//! ```text
//! NetworkReady ──┬──> PerimeterReady ──> EndpointsReady
//!                │          │
//! IdentityReady ─┴──────────┴──> DomainCreated ──> UserProfileCreated ──> ApplicationCreated
//! ```
//!
//! Terminal when `ApplicationCreated` and `EndpointsReady` are both reached.
//! Endpoints never wait for the domain, profile or application.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{StateInvariant, StateMachine, TransitionError, TransitionResult};

/// A composition milestone (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Milestone {
    NetworkReady,
    IdentityReady,
    PerimeterReady,
    EndpointsReady,
    DomainCreated,
    UserProfileCreated,
    ApplicationCreated,
}

impl Milestone {
    pub const ALL: [Milestone; 7] = [
        Milestone::NetworkReady,
        Milestone::IdentityReady,
        Milestone::PerimeterReady,
        Milestone::EndpointsReady,
        Milestone::DomainCreated,
        Milestone::UserProfileCreated,
        Milestone::ApplicationCreated,
    ];

    /// Milestones that must be reached first
    pub fn prerequisites(&self) -> &'static [Milestone] {
        use Milestone::*;

        match self {
            NetworkReady | IdentityReady => &[],
            PerimeterReady => &[NetworkReady],
            EndpointsReady => &[NetworkReady, PerimeterReady],
            // The domain's user settings embed the role ARN and the shared group
            DomainCreated => &[NetworkReady, IdentityReady, PerimeterReady],
            UserProfileCreated => &[DomainCreated],
            ApplicationCreated => &[UserProfileCreated],
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The set of reached milestones (FSM state)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionProgress {
    reached: BTreeSet<Milestone>,
}

impl CompositionProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_reached(&self, milestone: Milestone) -> bool {
        self.reached.contains(&milestone)
    }

    pub fn reached(&self) -> impl Iterator<Item = Milestone> + '_ {
        self.reached.iter().copied()
    }

    /// Both terminal milestones reached
    pub fn is_complete(&self) -> bool {
        self.has_reached(Milestone::ApplicationCreated) && self.has_reached(Milestone::EndpointsReady)
    }

    fn is_available(&self, milestone: Milestone) -> bool {
        !self.has_reached(milestone)
            && milestone
                .prerequisites()
                .iter()
                .all(|p| self.has_reached(*p))
    }
}

impl StateMachine for CompositionProgress {
    type Input = Milestone;
    type Output = Vec<Milestone>;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        if self.has_reached(*input) {
            return Err(TransitionError::BusinessRuleViolation(format!(
                "{input} already reached"
            )));
        }

        let missing: Vec<String> = input
            .prerequisites()
            .iter()
            .filter(|p| !self.has_reached(**p))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(TransitionError::PreconditionFailed(format!(
                "{input} requires {}",
                missing.join(", ")
            )));
        }

        let mut next = self.clone();
        next.reached.insert(*input);

        let unblocked = Milestone::ALL
            .into_iter()
            .filter(|m| next.is_available(*m) && !self.is_available(*m))
            .collect();

        Ok((next, unblocked))
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        Milestone::ALL
            .into_iter()
            .filter(|m| self.is_available(*m))
            .collect()
    }
}

impl StateInvariant for CompositionProgress {
    fn check_invariants(&self) -> Result<(), String> {
        for milestone in &self.reached {
            for prerequisite in milestone.prerequisites() {
                if !self.has_reached(*prerequisite) {
                    return Err(format!("{milestone} reached before {prerequisite}"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Milestone::*;

    fn run(steps: &[Milestone]) -> TransitionResult<CompositionProgress> {
        steps.iter().try_fold(CompositionProgress::new(), |state, step| {
            state.transition(step).map(|(next, _)| next)
        })
    }

    #[test]
    fn test_full_composition() {
        let state = run(&[
            NetworkReady,
            IdentityReady,
            PerimeterReady,
            EndpointsReady,
            DomainCreated,
            UserProfileCreated,
            ApplicationCreated,
        ])
        .expect("ordered composition should succeed");

        assert!(state.is_complete());
        assert!(state.check_invariants().is_ok());
        assert!(state.valid_inputs().is_empty());
    }

    #[test]
    fn test_endpoints_may_come_last() {
        let state = run(&[
            IdentityReady,
            NetworkReady,
            PerimeterReady,
            DomainCreated,
            UserProfileCreated,
            ApplicationCreated,
        ])
        .unwrap();
        assert!(!state.is_complete());
        assert_eq!(state.valid_inputs(), vec![EndpointsReady]);
    }

    #[test]
    fn test_profile_before_domain_rejected() {
        let state = run(&[NetworkReady, IdentityReady, PerimeterReady]).unwrap();
        let result = state.transition(&UserProfileCreated);
        assert!(matches!(result, Err(TransitionError::PreconditionFailed(_))));
    }

    #[test]
    fn test_domain_needs_identity() {
        let state = run(&[NetworkReady, PerimeterReady]).unwrap();
        let err = state.transition(&DomainCreated).unwrap_err();
        assert_eq!(
            err,
            TransitionError::PreconditionFailed("DomainCreated requires IdentityReady".into())
        );
    }

    #[test]
    fn test_milestone_reached_twice_rejected() {
        let state = run(&[NetworkReady]).unwrap();
        assert!(matches!(
            state.transition(&NetworkReady),
            Err(TransitionError::BusinessRuleViolation(_))
        ));
    }

    #[test]
    fn test_unblocked_output() {
        let state = run(&[NetworkReady, IdentityReady]).unwrap();
        let (_, unblocked) = state.transition(&PerimeterReady).unwrap();
        assert_eq!(unblocked, vec![EndpointsReady, DomainCreated]);
    }

    #[test]
    fn test_prerequisites_are_acyclic() {
        // Every milestone is reachable by repeatedly taking valid inputs
        let mut state = CompositionProgress::new();
        while let Some(next) = state.valid_inputs().first().copied() {
            state = state.transition(&next).unwrap().0;
        }
        assert_eq!(state.reached().count(), Milestone::ALL.len());
    }
}

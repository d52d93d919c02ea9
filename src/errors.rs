// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for stack composition
//!
//! Three classes of failure exist around a composed stack:
//!
//! 1. **Configuration** - missing or invalid fields, raised while loading and
//!    before any graph is built.
//! 2. **Composition** - an internal invariant of the composer was violated
//!    (ambiguous network request, duplicate logical id, dependency cycle).
//! 3. **Provisioning** - quota, name collisions, bad imported identifiers.
//!    These belong to the provisioning engine and never surface here.

use thiserror::Error;

use crate::domain::NetworkError;
use crate::graph::GraphError;
use crate::state_machine::TransitionError;

/// Errors that can occur while loading configuration or composing stacks
#[derive(Debug, Error)]
pub enum StackError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network descriptor or handle is inconsistent
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Resource graph invariant violated
    #[error("Resource graph error: {0}")]
    Graph(#[from] GraphError),

    /// Composition stages were driven out of order
    #[error("Composition stage error: {0}")]
    Stage(#[from] TransitionError),

    /// Composition-consistency error not covered by the graph or stages
    #[error("Composition error: {0}")]
    Composition(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error while reading configuration or writing an assembly
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for stack composition
pub type StackResult<T> = Result<T, StackError>;

impl From<serde_json::Error> for StackError {
    fn from(err: serde_json::Error) -> Self {
        StackError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for StackError {
    fn from(err: toml::de::Error) -> Self {
        StackError::Configuration(err.to_string())
    }
}

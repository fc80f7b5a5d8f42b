//! Crate-wide error taxonomy.
//!
//! Each subsystem has its own error enum; [`SimError`] wraps them for the
//! orchestrator and the binary. [`ErrorKind`] classifies any of them, looking
//! through step context, so callers can branch on the kind of failure while
//! the message still names the failing RPC method and simulation step.

use std::fmt;

use thiserror::Error;

use crate::chain::ChainError;
use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::keys::KeyDerivationError;
use crate::rpc::RpcError;

/// Classification of a failure, independent of where it surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad master key or derivation path.
    KeyDerivation,
    /// The node could not be reached or returned an unusable response.
    RpcTransport,
    /// The node answered with a JSON-RPC error.
    RpcProtocol,
    /// Unknown height or hash.
    NotFound,
    /// Node data broke an assumed invariant.
    InvariantViolation,
    /// An argument no node call can satisfy.
    InvalidArgument,
    /// The transaction-graph collaborator failed on its own.
    Graph,
    /// Configuration could not be loaded or validated.
    Config,
}

impl From<&RpcError> for ErrorKind {
    fn from(err: &RpcError) -> Self {
        match err {
            RpcError::Transport { .. } => Self::RpcTransport,
            RpcError::Protocol { .. } => Self::RpcProtocol,
            RpcError::InvalidEndpoint(_) => Self::Config,
        }
    }
}

/// Named steps of a compound simulation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fund,
    Seed,
    Confirm,
    Append,
    Push,
    Seal,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fund => "fund",
            Self::Seed => "seed",
            Self::Confirm => "confirm",
            Self::Append => "append",
            Self::Push => "push",
            Self::Seal => "seal",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the simulation orchestrator.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure inside a named step of a compound operation.
    #[error("{operation} failed at step '{step}': {source}")]
    Step {
        operation: &'static str,
        step: Step,
        source: Box<SimError>,
    },
}

impl SimError {
    /// Attach compound-operation context to an error.
    pub fn at_step(operation: &'static str, step: Step, err: impl Into<SimError>) -> Self {
        Self::Step {
            operation,
            step,
            source: Box::new(err.into()),
        }
    }

    /// Kind of the underlying failure, ignoring step context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyDerivation(_) => ErrorKind::KeyDerivation,
            Self::Rpc(e) => ErrorKind::from(e),
            Self::Chain(e) => e.kind(),
            Self::Graph(e) => e.kind(),
            Self::Config(_) => ErrorKind::Config,
            Self::Step { source, .. } => source.kind(),
        }
    }

    /// Innermost failing step, if any.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Step { step, source, .. } => source.step().or(Some(*step)),
            _ => None,
        }
    }
}

/// Result type for orchestrator operations.
pub type SimResult<T> = Result<T, SimError>;

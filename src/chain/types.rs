//! Chain data types and error definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::rpc::types::{RpcError, RPC_INVALID_ADDRESS_OR_KEY, RPC_INVALID_PARAMETER};

/// Block header as reported by `getblockheader`.
///
/// `hash` and `height` are typed; every other field the node reports is kept
/// verbatim in `fields`, so serializing the header reproduces the node's object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub hash: String,
    pub height: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl BlockHeader {
    /// Parent hash, absent for genesis.
    pub fn previous_hash(&self) -> Option<&str> {
        self.fields.get("previousblockhash").and_then(Value::as_str)
    }

    /// Confirmations reported by the node; `-1` marks a block off the active chain.
    pub fn confirmations(&self) -> Option<i64> {
        self.fields.get("confirmations").and_then(Value::as_i64)
    }
}

/// Summary returned by `getmempoolinfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MempoolInfo {
    /// Number of transactions.
    #[serde(default)]
    pub size: u64,
    /// Sum of virtual transaction sizes.
    #[serde(default)]
    pub bytes: u64,
    /// Memory usage in bytes.
    #[serde(default)]
    pub usage: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A historical block picked by `get_random_block`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomBlock {
    pub height: u64,
    pub hash: String,
}

/// Outcome of polling for a new best header.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderChange {
    /// The best block differs from the one observed before.
    Changed(BlockHeader),
    /// Attempts ran out; this is the last header read.
    Unchanged(BlockHeader),
}

impl HeaderChange {
    pub fn header(&self) -> &BlockHeader {
        match self {
            Self::Changed(header) | Self::Unchanged(header) => header,
        }
    }

    pub fn into_header(self) -> BlockHeader {
        match self {
            Self::Changed(header) | Self::Unchanged(header) => header,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// A block addressed either by height or by hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainTarget {
    Height(u64),
    Hash(String),
}

impl From<u64> for ChainTarget {
    fn from(height: u64) -> Self {
        Self::Height(height)
    }
}

impl From<&str> for ChainTarget {
    fn from(hash: &str) -> Self {
        Self::Hash(hash.to_string())
    }
}

impl From<String> for ChainTarget {
    fn from(hash: String) -> Self {
        Self::Hash(hash)
    }
}

impl FromStr for ChainTarget {
    type Err = std::convert::Infallible;

    /// Decimal strings are heights; anything else is taken as a block hash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<u64>() {
            Ok(height) if s.len() < 64 => Ok(Self::Height(height)),
            _ => Ok(Self::Hash(s.to_string())),
        }
    }
}

impl fmt::Display for ChainTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Height(height) => write!(f, "height {}", height),
            Self::Hash(hash) => write!(f, "block {}", hash),
        }
    }
}

/// Errors that can occur during chain operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The RPC call itself failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The node does not know the requested height or hash.
    #[error("{method}: not found: {what}")]
    NotFound { method: String, what: String },

    /// The node returned data that breaks an assumption the harness relies on.
    #[error("{method}: invariant violated: {detail}")]
    InvariantViolation { method: String, detail: String },

    /// The caller passed an argument no node call can satisfy.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ChainError {
    pub fn invariant(method: &str, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            method: method.to_string(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rpc(e) => ErrorKind::from(e),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Reinterpret "unknown block" node errors as [`ChainError::NotFound`].
    pub(crate) fn lookup(self, what: impl FnOnce() -> String) -> Self {
        match self {
            Self::Rpc(RpcError::Protocol { method, code, .. })
                if code == RPC_INVALID_ADDRESS_OR_KEY || code == RPC_INVALID_PARAMETER =>
            {
                Self::NotFound {
                    method,
                    what: what(),
                }
            }
            other => other,
        }
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

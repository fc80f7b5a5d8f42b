//! Transaction-graph collaborator.
//!
//! The harness does not build transactions itself. It hands a funding
//! transaction and declarative templates to a [`SimulationGraph`], then asks
//! it to push whatever it produced through the node's RPC.
//!
//! # Data Flow
//! ```text
//! fund() coinbase hex ──seed──▶ graph
//! TxTemplate × n      ──append─▶ graph (queued)
//! NodeRpc             ──flush──▶ graph submits queued entries, reports
//! ```

pub mod memory;
pub mod template;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::rpc::types::{NodeRpc, RpcError};

pub use memory::MemoryGraph;
pub use template::{Edge, OutputScript, ScriptChunk, TxTemplate};

/// Errors raised by a graph collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The seed transaction could not be used as the graph root.
    #[error("invalid root transaction: {0}")]
    InvalidRoot(String),

    /// Entries were pushed before any root was seeded.
    #[error("graph has no root; seed it with a funding transaction first")]
    NotSeeded,

    /// A template is malformed.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// Submitting to the node failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Any other failure inside the collaborator.
    #[error("graph backend error: {0}")]
    Backend(String),
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rpc(e) => ErrorKind::from(e),
            _ => ErrorKind::Graph,
        }
    }
}

/// Summary of one flush.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// Entries handed to the node in this flush.
    pub submitted: usize,
    /// Txids the node accepted, when the collaborator knows them.
    pub txids: Vec<String>,
}

/// Capability interface of the transaction-graph engine.
#[async_trait]
pub trait SimulationGraph: Send {
    /// Bootstrap the graph from a raw funding transaction.
    fn seed(&mut self, root_raw_tx: &str) -> Result<(), GraphError>;

    /// Queue one entry.
    fn append(&mut self, entry: TxTemplate) -> Result<(), GraphError>;

    /// Push every queued entry to the node.
    async fn flush(&mut self, rpc: &dyn NodeRpc) -> Result<FlushReport, GraphError>;

    /// Number of queued entries not yet flushed.
    fn pending(&self) -> usize;
}

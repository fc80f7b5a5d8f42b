//! Regtest simulation harness.
//!
//! Drives a Bitcoin-protocol node in regtest mode over JSON-RPC: funds an
//! address via coinbase, mines blocks, injects synthetic transactions through
//! a transaction-graph collaborator, and rolls the chain back to simulate
//! reorgs.
//!
//! ```text
//!   Simulator ──▶ ChainController ──▶ NodeRpc ──HTTP──▶ node
//!       │                                 ▲
//!       └──────▶ SimulationGraph ─flush───┘
//!   Configuration ◀── KeyDeriver (zero address)
//! ```

// Core subsystems
pub mod chain;
pub mod graph;
pub mod keys;
pub mod rpc;
pub mod sim;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use chain::ChainController;
pub use config::{Configuration, SimConfig};
pub use error::{ErrorKind, SimError, SimResult};
pub use graph::{MemoryGraph, SimulationGraph, TxTemplate};
pub use keys::{Bip32Deriver, KeyDeriver};
pub use rpc::{HttpRpcClient, MockNode, NodeRpc};
pub use sim::Simulator;

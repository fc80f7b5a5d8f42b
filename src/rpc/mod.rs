//! Node JSON-RPC subsystem.
//!
//! # Data Flow
//! ```text
//! ChainController / SimulationGraph
//!     → NodeRpc::call(method, params)
//!     → client.rs (HTTP POST, basic auth, timeout)
//!     → node
//!     → result | RpcError::{Transport, Protocol}
//! ```
//!
//! `mock.rs` provides a scriptable [`MockNode`] implementing the same trait.

pub mod client;
pub mod mock;
pub mod types;

pub use client::HttpRpcClient;
pub use mock::{MockNode, RecordedCall};
pub use types::{NodeRpc, RpcError, RpcResult};

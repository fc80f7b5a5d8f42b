//! Chain control subsystem.
//!
//! # Data Flow
//! ```text
//! Simulator / CLI
//!     → controller.rs (mine, fund, headers, mempool, fork, invalidate)
//!     → NodeRpc (reads retried, writes single-shot)
//!     → types.rs (typed results, NotFound / InvariantViolation mapping)
//! ```
//!
//! # Chain view
//! ```text
//! Synced ──invalidate_block──▶ Diverged ──mine / new blocks──▶ Synced
//! ```
//! The state is implied by call order and is not tracked.

pub mod controller;
pub mod types;

pub use controller::ChainController;
pub use types::{
    BlockHeader, ChainError, ChainResult, ChainTarget, HeaderChange, MempoolInfo, RandomBlock,
};

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Command running (sequence of node calls)
//!     ┐
//!     ├─ select ─▶ first to finish wins
//!     ┘
//! signals.rs: SIGINT / SIGTERM
//! ```
//!
//! # Design Decisions
//! - Interrupting drops the pending future; an RPC already sent still
//!   completes on the node
//! - No cleanup is attempted: the node keeps the state of the last
//!   completed call

pub mod signals;

pub use signals::{run_until_interrupted, wait_for_interrupt, Interrupted};

//! Simulation orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! init():  fund → seed graph → mine 100 → append 25 → flush → mine 1
//! add():   append n → flush
//! mine():  ChainController::mine
//! getMempool(): ChainController::get_raw_mempool
//! ```

pub mod orchestrator;

pub use crate::error::{ErrorKind, SimError, SimResult, Step};
pub use orchestrator::{InitReport, Simulator, COINBASE_MATURITY, DEFAULT_ADD_COUNT, INIT_ENTRIES};

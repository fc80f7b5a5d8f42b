//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Idempotent node read:
//!     → retries.rs (retry transport failures with backoff)
//!     → backoff.rs (exponential delay with jitter)
//!
//! Header polling:
//!     → backoff.rs (spacing between reads)
//! ```
//!
//! # Design Decisions
//! - Retries only for idempotent reads; `generatetoaddress` and
//!   `invalidateblock` are single-shot
//! - Protocol errors are answers, not failures to reach the node: never retried
//! - Request timeouts live in the HTTP client, not here

pub mod backoff;
pub mod retries;

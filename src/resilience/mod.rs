//! Resilience primitives.
//!
//! # Data Flow
//! ```text
//! Domain discovery / startup grace:
//!     → poll.rs (PollPolicy: fixed attempt count, fixed interval)
//!     → Sleeper (tokio timer in production, recorded in tests)
//! ```
//!
//! # Design Decisions
//! - Every wait in the orchestration path has a bound
//! - Delays go through `Sleeper` so tests never wait on the wall clock
//! - Network timeouts live on the HTTP clients themselves

pub mod poll;

pub use poll::{poll_until, PollPolicy, Sleeper, TokioSleeper};

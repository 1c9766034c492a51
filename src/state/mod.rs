//! Orchestration state shared with readers.
//!
//! # Data Flow
//! ```text
//! Orchestrator / LinkPublisher (single writer)
//!     → context.rs RunContext (ArcSwap<Snapshot>, whole-value swap)
//!     → HTTP handlers, status reporter (lock-free snapshot reads)
//! ```
//!
//! # Design Decisions
//! - Readers never wait on orchestration; absence is a normal state
//! - A reader holding a snapshot never sees later writes partially applied

pub mod context;
pub mod stage;

pub use context::{RunContext, Snapshot, SnapshotSummary};
pub use stage::Stage;

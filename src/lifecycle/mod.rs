//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Create work dir → remove stale sub.txt / boot.log → orchestration
//!
//! Shutdown (shutdown.rs):
//!     Signal received → HTTP drain, reporter stop → orchestration aborted
//!     → child processes terminated → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Teardown is reachable from every orchestration stage
//! - Each child process gets a bounded stop window

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::wait_for_signal;
pub use startup::prepare_work_dir;

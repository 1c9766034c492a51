//! Process management subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator
//!     → supervisor.rs (launch_front / launch_backend)
//!         → backend.rs (token vs. quick-tunnel argv)
//!         → external.rs (ProcessLauncher → ExternalProcess)
//!     → live set (front, backend)
//!
//! Shutdown:
//!     supervisor.rs terminate_all
//!         → SIGTERM → wait ≤ 5s → kill → clear set
//! ```

pub mod backend;
pub mod external;
pub mod supervisor;

pub use backend::{is_token_credential, BackendMode};
pub use external::{ExternalProcess, ProcessLauncher, TokioLauncher};
pub use supervisor::{LaunchError, LaunchedProcess, ProcessSupervisor, ProcessTag};

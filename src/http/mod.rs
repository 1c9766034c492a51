//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! GET /              → static greeting
//! GET /<sub_path>    → RunContext snapshot → artifact | sub.txt | "Links not ready"
//! GET /status        → ServiceStatus JSON
//! ```
//!
//! Handlers only read shared snapshots; none of them waits on orchestration.

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};

//! Provisioning and supervision of a front proxy and a tunnel backend,
//! with subscription link publication over HTTP.

// Core subsystems
pub mod artifacts;
pub mod config;
pub mod discovery;
pub mod orchestrator;
pub mod process;
pub mod proxy_config;
pub mod publish;
pub mod state;

// Serving surface
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use orchestrator::Orchestrator;
pub use state::{RunContext, Stage};

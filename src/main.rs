//! edgelink
//!
//! Provisions a front proxy and a tunnel backend, discovers the public
//! hostname and serves the resulting subscription link.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── orchestration task (runs once) ───────────────────────────┐
//!   │ prepare_work_dir → config.json → artifacts → front → backend → discover → publish      │
//!   └───────────────────────────────────────┬───────────────────────────────────────────────┘
//!                                           │ writes
//!                                           ▼
//!                                   RunContext (ArcSwap)
//!                                   ▲                 ▲
//!                             reads │                 │ reads
//!                       ┌───────────┴──────┐   ┌──────┴───────────┐
//!                       │ HTTP (axum)      │   │ status reporter  │
//!                       │ /, /<sub>, /status│  │ (periodic log)   │
//!                       └──────────────────┘   └──────────────────┘
//!
//!   SIGINT/SIGTERM → Shutdown → HTTP drain → orchestration aborted → terminate_all
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use edgelink::artifacts::ArtifactFetcher;
use edgelink::config::load_config;
use edgelink::http::{AppState, HttpServer};
use edgelink::lifecycle::{wait_for_signal, Shutdown};
use edgelink::observability::{logging, metrics, StatusReporter};
use edgelink::process::{ProcessSupervisor, TokioLauncher};
use edgelink::publish::IpApiLookup;
use edgelink::resilience::TokioSleeper;
use edgelink::{Orchestrator, RunContext};

#[derive(Parser)]
#[command(name = "edgelink")]
#[command(about = "Front proxy and tunnel orchestrator with subscription publishing", long_about = None)]
struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `edgelink=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edgelink starting");

    let config = Arc::new(load_config(args.config.as_deref())?);
    tracing::info!(
        work_dir = %config.work_dir().display(),
        http_port = config.http_port,
        front_port = config.front_port,
        sub_path = config.sub_path(),
        static_domain = config.static_tunnel().is_some(),
        "Configuration loaded"
    );

    if let Some(address) = &config.metrics_address {
        match address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => tracing::error!(metrics_address = %address, error = %e, "Failed to parse metrics address"),
        }
    }

    // Bind before orchestration so readers are served from the first moment.
    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config.http_port))).await?;

    let shutdown = Shutdown::new();
    let context = Arc::new(RunContext::new());
    let supervisor = Arc::new(ProcessSupervisor::new(Arc::new(TokioLauncher)));

    let orchestrator = Arc::new(Orchestrator::new(
        config.clone(),
        context.clone(),
        supervisor.clone(),
        ArtifactFetcher::new(config.work_dir())?,
        Arc::new(IpApiLookup::new()?),
        Arc::new(TokioSleeper),
    ));

    let orchestration = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            // Failures are already logged and recorded on the context.
            let _ = orchestrator.run().await;
        })
    };

    let reporter = StatusReporter::new(config.clone(), context.clone(), supervisor.clone());
    let reporting = tokio::spawn(reporter.run(shutdown.subscribe()));

    let server = HttpServer::new(AppState {
        config: config.clone(),
        context: context.clone(),
        supervisor: supervisor.clone(),
    });
    let serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await?;
    shutdown.trigger();

    orchestration.abort();
    let _ = orchestration.await;

    match serving.await {
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server failed"),
        Err(e) => tracing::error!(error = %e, "HTTP server task panicked"),
        Ok(Ok(())) => {}
    }
    let _ = reporting.await;

    orchestrator.teardown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

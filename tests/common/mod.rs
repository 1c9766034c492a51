//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use edgelink::config::ServiceConfig;
use edgelink::process::{ExternalProcess, ProcessLauncher};
use edgelink::publish::isp::IspLookupError;
use edgelink::publish::IspLookup;
use edgelink::resilience::Sleeper;

/// What a programmable backend sends for one request.
pub enum Reply {
    /// Full response with the given status and body.
    Complete(u16, Vec<u8>),
    /// Advertise `declared` bytes, send `body`, then hang up.
    Truncated { declared: usize, body: Vec<u8> },
    /// Advertise `declared` bytes, send `body`, then stop responding.
    Stalled { declared: usize, body: Vec<u8> },
}

/// Start a programmable HTTP/1.1 backend on an ephemeral port.
///
/// `f` receives the request path.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let (read, mut write) = socket.into_split();
                        let mut reader = BufReader::new(read);

                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.is_err() {
                            return;
                        }
                        let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
                        loop {
                            let mut header = String::new();
                            match reader.read_line(&mut header).await {
                                Ok(0) | Err(_) => break,
                                Ok(_) if header == "\r\n" => break,
                                Ok(_) => {}
                            }
                        }

                        let reply = f(path).await;
                        let stall = matches!(reply, Reply::Stalled { .. });
                        let (head, body) = match reply {
                            Reply::Complete(status, body) => {
                                let status_text = match status {
                                    200 => "200 OK",
                                    404 => "404 Not Found",
                                    500 => "500 Internal Server Error",
                                    _ => "200 OK",
                                };
                                (
                                    format!(
                                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                                        status_text,
                                        body.len()
                                    ),
                                    body,
                                )
                            }
                            Reply::Truncated { declared, body } | Reply::Stalled { declared, body } => (
                                format!("HTTP/1.1 200 OK\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n"),
                                body,
                            ),
                        };
                        let _ = write.write_all(head.as_bytes()).await;
                        let _ = write.write_all(&body).await;
                        if stall {
                            tokio::time::sleep(Duration::from_secs(3600)).await;
                        }
                        let _ = write.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Config rooted at `dir` with defaults everywhere else.
pub fn test_config(dir: &Path) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.work_dir = dir.to_path_buf();
    config
}

/// A credential accepted as a persistent tunnel token.
pub fn valid_token() -> String {
    "eyJhIjoiMTIzNDU2Nzg5MCJ9".repeat(6)
}

/// Create empty placeholder executables so no download happens.
pub fn seed_artifacts(dir: &Path) {
    std::fs::write(dir.join("front"), b"").unwrap();
    std::fs::write(dir.join("backend"), b"").unwrap();
}

/// One recorded spawn.
#[derive(Debug, Clone)]
pub struct Spawned {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub exited: Arc<AtomicBool>,
}

/// Launcher that records spawns and hands out [`FakeProcess`]es.
#[derive(Default)]
pub struct FakeLauncher {
    spawned: Mutex<Vec<Spawned>>,
    log_output: Option<String>,
}

impl FakeLauncher {
    /// Write `output` to the file named by `--logfile`, as a quick tunnel would.
    pub fn with_log_output(output: impl Into<String>) -> Self {
        Self {
            spawned: Mutex::default(),
            log_output: Some(output.into()),
        }
    }

    pub fn spawned(&self) -> Vec<Spawned> {
        self.spawned.lock().unwrap().clone()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Box<dyn ExternalProcess>> {
        if let Some(output) = &self.log_output {
            if let Some(pos) = args.iter().position(|a| a == "--logfile") {
                std::fs::write(&args[pos + 1], output)?;
            }
        }

        let exited = Arc::new(AtomicBool::new(false));
        self.spawned.lock().unwrap().push(Spawned {
            program: program.to_path_buf(),
            args: args.to_vec(),
            exited: exited.clone(),
        });
        Ok(Box::new(FakeProcess { exited }))
    }
}

/// Launcher whose spawns always fail.
pub struct FailingLauncher;

impl ProcessLauncher for FailingLauncher {
    fn spawn(&self, _program: &Path, _args: &[String]) -> io::Result<Box<dyn ExternalProcess>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "exec format error"))
    }
}

/// Process that exits as soon as it is signalled.
pub struct FakeProcess {
    exited: Arc<AtomicBool>,
}

#[async_trait]
impl ExternalProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.exited.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn kill(&mut self) -> io::Result<()> {
        self.exited.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn has_exited(&mut self) -> bool {
        self.exited.load(Ordering::SeqCst)
    }

    async fn wait(&mut self) -> io::Result<()> {
        while !self.exited.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(())
    }
}

/// Sleeper that returns immediately and records every requested delay.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// ISP lookup with a canned answer; `None` simulates an outage.
pub struct FixedIsp(pub Option<&'static str>);

#[async_trait]
impl IspLookup for FixedIsp {
    async fn lookup(&self) -> Result<String, IspLookupError> {
        match self.0 {
            Some(label) => Ok(label.to_string()),
            None => Err(IspLookupError::Unavailable("offline".to_string())),
        }
    }
}

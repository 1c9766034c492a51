//! Executable artifact provisioning.
//!
//! # Data Flow
//! ```text
//! std::env::consts::ARCH
//!     → manifest.rs (ARM vs. everything else → two {name, url} entries)
//!     → fetcher.rs (skip present files, download the rest concurrently)
//!     → <work_dir>/front, <work_dir>/backend (mode 0775)
//! ```
//!
//! # Design Decisions
//! - Presence on disk is the only cache check; files are never re-downloaded
//! - A failed download deletes its partial file and never affects its sibling
//! - Permission failures are logged and ignored

pub mod fetcher;
pub mod manifest;

pub use fetcher::{ArtifactFetcher, DownloadError, FetchError};
pub use manifest::{ArchBucket, ArtifactSpec, BACKEND_ARTIFACT, FRONT_ARTIFACT};

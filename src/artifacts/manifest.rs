//! Artifact manifest per architecture bucket.

use std::fmt;
use url::Url;

/// File name of the front executable inside the working directory.
pub const FRONT_ARTIFACT: &str = "front";
/// File name of the backend executable inside the working directory.
pub const BACKEND_ARTIFACT: &str = "backend";

/// Architecture class the download mirrors are split by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchBucket {
    Arm,
    Amd,
}

impl ArchBucket {
    /// Classify a machine string such as `aarch64` or `x86_64`.
    pub fn from_machine(machine: &str) -> Self {
        match machine.to_ascii_lowercase().as_str() {
            "arm" | "arm64" | "aarch64" => ArchBucket::Arm,
            _ => ArchBucket::Amd,
        }
    }

    /// Bucket of the running binary.
    pub fn detect() -> Self {
        Self::from_machine(std::env::consts::ARCH)
    }

    fn mirror(self) -> &'static str {
        match self {
            ArchBucket::Arm => "https://arm.dogchild.eu.org/",
            ArchBucket::Amd => "https://amd.dogchild.eu.org/",
        }
    }
}

impl fmt::Display for ArchBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchBucket::Arm => write!(f, "arm"),
            ArchBucket::Amd => write!(f, "amd"),
        }
    }
}

/// One downloadable executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
    pub url: Url,
}

impl ArtifactSpec {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into(),
            url,
        }
    }
}

/// The fixed two-entry manifest for `bucket`.
pub fn manifest_for(bucket: ArchBucket) -> Result<Vec<ArtifactSpec>, url::ParseError> {
    let base = Url::parse(bucket.mirror())?;
    [FRONT_ARTIFACT, BACKEND_ARTIFACT]
        .into_iter()
        .map(|name| base.join(name).map(|url| ArtifactSpec::new(name, url)))
        .collect()
}

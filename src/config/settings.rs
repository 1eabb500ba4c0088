//! Configuration settings for volcp
//!
//! Defines the copy-engine options and the runtime API client
//! configuration, with validation and platform defaults.

use crate::error::{Result, VolcpError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Behavior when a destination directory already exists.
///
/// The underlying directory-creation primitive fails with "already exists";
/// rather than inheriting that accidentally, callers choose explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Fail fast with `AlreadyExists` if any destination directory exists
    #[default]
    FailIfExists,
    /// Create directories if missing, merge into them if present.
    /// Existing files at file destinations are overwritten.
    MergeExisting,
}

/// Options for a tree-copy operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    /// What to do when a destination directory already exists
    pub overwrite: OverwritePolicy,
    /// Cap on concurrently executing file copies in progressive mode.
    /// `None` means unbounded, which on very wide trees can exhaust file
    /// descriptors; set a limit for untrusted inputs.
    pub max_in_flight: Option<usize>,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            overwrite: OverwritePolicy::FailIfExists,
            max_in_flight: None,
        }
    }
}

/// Host platform, used to locate the volume mount base directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Native Linux: volumes live under /var/lib/docker/volumes
    Linux,
    /// Windows with Docker Desktop: volumes are reachable through the WSL share
    Windows,
}

impl Platform {
    /// Detect the platform this build targets
    pub fn detect() -> Result<Self> {
        match std::env::consts::OS {
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            other => Err(VolcpError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Base directory under which volume mount points are exposed to the host
    pub fn volume_base(&self) -> PathBuf {
        match self {
            Self::Linux => PathBuf::from("/var/lib/docker/volumes"),
            Self::Windows => PathBuf::from(
                r"\\wsl$\docker-desktop-data\version-pack-data\community\docker\volumes",
            ),
        }
    }
}

/// How to reach the runtime API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Endpoint {
    /// HTTP over TCP, e.g. the daemon listening on localhost:2375
    Tcp {
        /// `http` or `https`
        protocol: String,
        /// Hostname or IP
        host: String,
        /// TCP port
        port: u16,
    },
    /// HTTP over a local unix socket, e.g. /var/run/docker.sock
    Socket {
        /// Socket path
        path: PathBuf,
    },
}

impl Endpoint {
    /// Human-readable endpoint for error messages
    pub fn display(&self) -> String {
        match self {
            Self::Tcp {
                protocol,
                host,
                port,
            } => format!("{protocol}://{host}:{port}"),
            Self::Socket { path } => path.display().to_string(),
        }
    }
}

/// Configuration for the runtime API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Where the runtime API listens
    pub endpoint: Endpoint,
    /// Platform override; detected from the build target when `None`
    pub platform: Option<Platform>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Tcp {
                protocol: "http".to_string(),
                host: "localhost".to_string(),
                port: 2375,
            },
            platform: None,
        }
    }
}

impl ClientConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match &self.endpoint {
            Endpoint::Tcp { protocol, host, .. } => {
                if protocol != "http" && protocol != "https" {
                    return Err(VolcpError::config(format!(
                        "invalid protocol '{protocol}'; must be http or https"
                    )));
                }
                if host.is_empty() {
                    return Err(VolcpError::config("host must not be empty"));
                }
            }
            Endpoint::Socket { path } => {
                if path.as_os_str().is_empty() {
                    return Err(VolcpError::config("socket path must not be empty"));
                }
            }
        }
        Ok(())
    }

    /// Resolve the platform, detecting it when not overridden
    pub fn platform(&self) -> Result<Platform> {
        match self.platform {
            Some(p) => Ok(p),
            None => Platform::detect(),
        }
    }
}

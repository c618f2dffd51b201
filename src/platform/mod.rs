// ABOUTME: Interfaces to the orchestration platform the controller runs under.
// ABOUTME: Leadership, peers, config, spec submission, status, and image resolution.

mod hook_tools;
mod image;

pub use hook_tools::{HookTools, ToolOutput};
pub use image::{ConfigImageResolver, ImageResolver, ResolveError};

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;
use crate::podspec::{DeploymentSpec, ResourceSpec};
use crate::status::Status;
use crate::types::UnitName;

/// Errors from platform calls.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("{tool} exited with {code:?}: {stderr}")]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} timed out after {timeout:?}")]
    ToolTimeout { tool: String, timeout: Duration },

    #[error("unexpected output from {tool}: {reason}")]
    InvalidOutput { tool: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether this replica may write fleet-wide resources.
#[async_trait]
pub trait Leadership: Send + Sync {
    async fn is_leader(&self) -> Result<bool, PlatformError>;
}

/// Units the platform expects to exist for this application.
#[async_trait]
pub trait PeerDiscovery: Send + Sync {
    /// Expected peers, sorted by ordinal ascending.
    async fn expected_peers(&self) -> Result<Vec<UnitName>, PlatformError>;
}

/// Current workload configuration.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn config(&self) -> Result<Config, PlatformError>;
}

/// Submission of the deployment descriptor. Only the leader may call it.
#[async_trait]
pub trait SpecSink: Send + Sync {
    async fn submit_spec(
        &self,
        spec: &DeploymentSpec,
        resources: &ResourceSpec,
    ) -> Result<(), PlatformError>;
}

/// Write-only status reporting.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn set_unit_status(&self, status: &Status) -> Result<(), PlatformError>;

    /// Only the leader may call this.
    async fn set_application_status(&self, status: &Status) -> Result<(), PlatformError>;
}

/// Everything the controller needs from the platform.
///
/// Automatically implemented for any type that implements all capabilities.
pub trait Platform: Leadership + PeerDiscovery + SpecSink + StatusSink {}

impl<T> Platform for T where T: Leadership + PeerDiscovery + SpecSink + StatusSink {}

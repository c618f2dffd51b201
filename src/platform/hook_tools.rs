// ABOUTME: Platform backend that shells out to Juju hook-tool executables.
// ABOUTME: Runs is-leader, goal-state, config-get, pod-spec-set, and status-set with a timeout.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::Config;
use crate::podspec::{DeploymentSpec, ResourceSpec};
use crate::status::Status;
use crate::types::{UnitName, sort_by_ordinal};

use super::{
    ConfigSource, Leadership, PeerDiscovery, PlatformError, SpecSink, StatusSink,
};

/// Captured result of one hook-tool run.
#[derive(Debug)]
pub struct ToolOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs hook tools found on `PATH`, or in an explicit directory.
#[derive(Debug, Clone)]
pub struct HookTools {
    tools_dir: Option<PathBuf>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct GoalState {
    #[serde(default)]
    units: BTreeMap<String, serde_json::Value>,
}

impl HookTools {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tools_dir: None,
            timeout,
        }
    }

    /// Resolve tools from `dir` instead of `PATH`.
    pub fn with_tools_dir(mut self, dir: &Path) -> Self {
        self.tools_dir = Some(dir.to_path_buf());
        self
    }

    fn program(&self, tool: &str) -> PathBuf {
        match &self.tools_dir {
            Some(dir) => dir.join(tool),
            None => PathBuf::from(tool),
        }
    }

    /// Run a tool and return its output, whatever the exit status.
    pub async fn run(&self, tool: &str, args: &[&str]) -> Result<ToolOutput, PlatformError> {
        tracing::debug!("Running {} {:?}", tool, args);

        let child = Command::new(self.program(tool))
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| PlatformError::ToolTimeout {
                tool: tool.to_string(),
                timeout: self.timeout,
            })?
            .map_err(|source| PlatformError::Spawn {
                tool: tool.to_string(),
                source,
            })?;

        Ok(ToolOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run a tool and fail unless it exits successfully.
    async fn run_checked(&self, tool: &str, args: &[&str]) -> Result<String, PlatformError> {
        let output = self.run(tool, args).await?;
        if !output.success {
            tracing::warn!("{} failed with exit code {:?}", tool, output.exit_code);
            return Err(PlatformError::ToolFailed {
                tool: tool.to_string(),
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    fn invalid_output(tool: &str, reason: impl ToString) -> PlatformError {
        PlatformError::InvalidOutput {
            tool: tool.to_string(),
            reason: reason.to_string(),
        }
    }

    fn yaml_file(value: &impl serde::Serialize) -> Result<tempfile::NamedTempFile, PlatformError> {
        let yaml = serde_yaml::to_string(value)
            .map_err(|e| Self::invalid_output("pod-spec-set", format!("cannot encode: {e}")))?;
        let mut file = tempfile::Builder::new()
            .prefix("pod-spec-")
            .suffix(".yaml")
            .tempfile()?;
        file.write_all(yaml.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

#[async_trait]
impl Leadership for HookTools {
    async fn is_leader(&self) -> Result<bool, PlatformError> {
        let stdout = self.run_checked("is-leader", &["--format=json"]).await?;
        serde_json::from_str(stdout.trim()).map_err(|e| Self::invalid_output("is-leader", e))
    }
}

#[async_trait]
impl PeerDiscovery for HookTools {
    async fn expected_peers(&self) -> Result<Vec<UnitName>, PlatformError> {
        let stdout = self.run_checked("goal-state", &["--format=json"]).await?;
        let goal: GoalState =
            serde_json::from_str(&stdout).map_err(|e| Self::invalid_output("goal-state", e))?;

        let mut units = goal
            .units
            .keys()
            .map(|name| UnitName::parse(name))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Self::invalid_output("goal-state", e))?;
        sort_by_ordinal(&mut units);
        Ok(units)
    }
}

#[async_trait]
impl ConfigSource for HookTools {
    async fn config(&self) -> Result<Config, PlatformError> {
        let stdout = self.run_checked("config-get", &["--format=json"]).await?;
        // config-get prints `null` when nothing is set
        if stdout.trim() == "null" {
            return Ok(Config::new());
        }
        Config::from_json(&stdout).map_err(|e| Self::invalid_output("config-get", e))
    }
}

#[async_trait]
impl SpecSink for HookTools {
    async fn submit_spec(
        &self,
        spec: &DeploymentSpec,
        resources: &ResourceSpec,
    ) -> Result<(), PlatformError> {
        let spec_file = Self::yaml_file(spec)?;
        let resources_file = Self::yaml_file(resources)?;

        let spec_path = spec_file.path().to_string_lossy().into_owned();
        let resources_path = resources_file.path().to_string_lossy().into_owned();

        self.run_checked(
            "pod-spec-set",
            &["--file", &spec_path, "--k8s-resources", &resources_path],
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl StatusSink for HookTools {
    async fn set_unit_status(&self, status: &Status) -> Result<(), PlatformError> {
        self.run_checked("status-set", &[status.kind().as_str(), status.message()])
            .await?;
        Ok(())
    }

    async fn set_application_status(&self, status: &Status) -> Result<(), PlatformError> {
        self.run_checked(
            "status-set",
            &["--application", status.kind().as_str(), status.message()],
        )
        .await?;
        Ok(())
    }
}

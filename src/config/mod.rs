// ABOUTME: Controller settings and workload configuration.
// ABOUTME: Handles settings discovery, env overrides, and the workload config mapping.

mod init;
mod workload;

pub use init::init_settings;
pub use workload::{Config, ConfigError, REQUIRED_SETTINGS, ValidatedConfig};

use crate::error::{Error, Result};
use crate::types::{AppName, DEFAULT_PORT, UnitName, WorkloadIdentity};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILENAME: &str = "redis-operator.yml";
pub const SETTINGS_FILENAME_ALT: &str = "redis-operator.yaml";
pub const SETTINGS_FILENAME_DIR: &str = ".redis-operator/settings.yml";

pub const ENV_APP: &str = "REDIS_OPERATOR_APP";
pub const ENV_STATE_FILE: &str = "REDIS_OPERATOR_STATE_FILE";
/// Set by the platform for every hook invocation.
pub const ENV_UNIT_NAME: &str = "JUJU_UNIT_NAME";

/// Settings for the controller process itself.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: Option<AppName>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub probe_timeout: Duration,

    #[serde(default = "default_tool_timeout", with = "humantime_serde")]
    pub tool_timeout: Duration,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_state_file() -> PathBuf {
    PathBuf::from(".redis-operator/state.json")
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_tool_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            app: None,
            port: default_port(),
            state_file: default_state_file(),
            probe_timeout: default_probe_timeout(),
            tool_timeout: default_tool_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(SETTINGS_FILENAME),
            dir.join(SETTINGS_FILENAME_ALT),
            dir.join(SETTINGS_FILENAME_DIR),
        ];

        candidates
            .iter()
            .find(|path| path.exists())
            .map(|path| Self::load(path))
            .unwrap_or_else(|| Err(Error::ConfigNotFound(dir.to_path_buf())))
    }

    /// Like `discover`, but falls back to defaults when no file exists.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment overrides. An explicit app name wins over the
    /// one derived from the platform's unit name.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(app) = std::env::var(ENV_APP) {
            self.app = Some(AppName::new(&app).map_err(|e| Error::InvalidConfig(e.to_string()))?);
        }

        if let Ok(path) = std::env::var(ENV_STATE_FILE) {
            self.state_file = PathBuf::from(path);
        }

        if self.app.is_none()
            && let Ok(unit) = std::env::var(ENV_UNIT_NAME)
        {
            let unit = UnitName::parse(&unit).map_err(|e| Error::InvalidConfig(e.to_string()))?;
            self.app = Some(unit.app().clone());
        }

        Ok(self)
    }

    /// Identity of the managed workload.
    pub fn identity(&self) -> Result<WorkloadIdentity> {
        let name = self.app.clone().ok_or(Error::MissingAppName)?;
        Ok(WorkloadIdentity::new(name, self.port))
    }

    pub fn template() -> Self {
        Settings {
            app: AppName::new("redis").ok(),
            ..Settings::default()
        }
    }
}

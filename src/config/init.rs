// ABOUTME: Settings scaffolding for new deployments.
// ABOUTME: Creates redis-operator.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::AppName;

use super::{SETTINGS_FILENAME, Settings};

pub fn init_settings(dir: &Path, app: Option<&str>, force: bool) -> Result<()> {
    let settings_path = dir.join(SETTINGS_FILENAME);

    if settings_path.exists() && !force {
        return Err(Error::AlreadyExists(settings_path));
    }

    let mut settings = Settings::template();

    if let Some(a) = app {
        settings.app = Some(AppName::new(a).map_err(|e| Error::InvalidConfig(e.to_string()))?);
    }

    let yaml = generate_template_yaml(&settings);
    std::fs::write(&settings_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(settings: &Settings) -> String {
    let app = settings
        .app
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "redis".to_string());

    format!(
        r#"app: {}
port: {}
state_file: {}
# How long a readiness check may take before the service counts as unreachable
probe_timeout: {}s
# Upper bound for each platform hook-tool invocation
tool_timeout: {}s
log_level: {}
"#,
        app,
        settings.port,
        settings.state_file.display(),
        settings.probe_timeout.as_secs(),
        settings.tool_timeout.as_secs(),
        settings.log_level
    )
}

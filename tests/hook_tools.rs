// ABOUTME: Integration tests for the hook-tool platform backend.
// ABOUTME: Runs fake is-leader, goal-state, config-get, pod-spec-set, and status-set scripts.

use redis_operator::platform::{
    ConfigSource, HookTools, Leadership, PeerDiscovery, PlatformError, SpecSink, StatusSink,
};
use redis_operator::podspec::{ImageDetails, PodSpecBuilder};
use redis_operator::status::Status;
use redis_operator::types::{AppName, UnitName, WorkloadIdentity};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;
use tempfile::TempDir;

fn create_tool(dir: &TempDir, name: &str, script: &str) {
    let path = dir.path().join(name);
    fs::write(&path, script).unwrap();

    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

fn tools(dir: &TempDir) -> HookTools {
    HookTools::new(Duration::from_secs(5)).with_tools_dir(dir.path())
}

#[tokio::test]
async fn is_leader_parses_json_boolean() {
    let dir = TempDir::new().unwrap();
    create_tool(&dir, "is-leader", "#!/bin/sh\necho true\n");

    assert!(tools(&dir).is_leader().await.unwrap());
}

#[tokio::test]
async fn is_leader_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    create_tool(
        &dir,
        "is-leader",
        "#!/bin/sh\necho 'not in a hook context' >&2\nexit 2\n",
    );

    let err = tools(&dir).is_leader().await.unwrap_err();
    match err {
        PlatformError::ToolFailed { code, stderr, .. } => {
            assert_eq!(code, Some(2));
            assert!(stderr.contains("not in a hook context"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn goal_state_peers_sorted_by_ordinal() {
    let dir = TempDir::new().unwrap();
    create_tool(
        &dir,
        "goal-state",
        r#"#!/bin/sh
echo '{"units": {"redis/10": {"status": "active"}, "redis/2": {"status": "waiting"}, "redis/0": {"status": "active"}}}'
"#,
    );

    let peers = tools(&dir).expected_peers().await.unwrap();
    let names: Vec<String> = peers.iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["redis/0", "redis/2", "redis/10"]);
}

#[tokio::test]
async fn config_get_reads_mapping() {
    let dir = TempDir::new().unwrap();
    create_tool(
        &dir,
        "config-get",
        "#!/bin/sh\necho '{\"image\": \"redis:6.0\"}'\n",
    );

    let config = tools(&dir).config().await.unwrap();
    assert_eq!(config.validate().unwrap().image(), "redis:6.0");
}

#[tokio::test]
async fn config_get_null_is_empty_config() {
    let dir = TempDir::new().unwrap();
    create_tool(&dir, "config-get", "#!/bin/sh\necho null\n");

    let config = tools(&dir).config().await.unwrap();
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn pod_spec_set_receives_both_files() {
    let dir = TempDir::new().unwrap();
    let captured = dir.path().join("captured");
    create_tool(
        &dir,
        "pod-spec-set",
        &format!(
            "#!/bin/sh\n[ \"$1\" = --file ] || exit 3\ncp \"$2\" {out}.spec\n[ \"$3\" = --k8s-resources ] || exit 4\ncp \"$4\" {out}.resources\n",
            out = captured.display()
        ),
    );

    let identity = WorkloadIdentity::from(AppName::new("redis").unwrap());
    let image = ImageDetails {
        image_path: "redis:6.0".to_string(),
    };
    let peers = vec![UnitName::parse("redis/0").unwrap()];
    let (spec, resources) = PodSpecBuilder::new(&identity, &image, &peers).build();

    tools(&dir).submit_spec(&spec, &resources).await.unwrap();

    let spec_yaml = fs::read_to_string(dir.path().join("captured.spec")).unwrap();
    assert!(spec_yaml.contains("imagePath:"));
    assert!(spec_yaml.contains("redis:6.0"));
    assert!(spec_yaml.contains("JUJU_EXPECTED_UNITS"));
    let resources_yaml = fs::read_to_string(dir.path().join("captured.resources")).unwrap();
    assert!(resources_yaml.contains("kubernetesResources"));
    assert!(resources_yaml.contains("type: NodePort"));
}

#[tokio::test]
async fn status_set_passes_kind_and_message() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("status.log");
    create_tool(
        &dir,
        "status-set",
        &format!("#!/bin/sh\necho \"$@\" >> {}\n", log.display()),
    );

    let tools = tools(&dir);
    tools
        .set_unit_status(&Status::waiting("waiting for backing service"))
        .await
        .unwrap();
    tools
        .set_application_status(&Status::active("service ready"))
        .await
        .unwrap();

    let lines = fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = lines.lines().collect();
    assert_eq!(
        lines,
        vec![
            "waiting waiting for backing service",
            "--application active service ready"
        ]
    );
}

#[tokio::test]
async fn missing_tool_fails_to_spawn() {
    let dir = TempDir::new().unwrap();

    let err = tools(&dir).is_leader().await.unwrap_err();
    assert!(matches!(err, PlatformError::Spawn { .. }));
}

#[tokio::test]
async fn slow_tool_times_out() {
    let dir = TempDir::new().unwrap();
    create_tool(&dir, "is-leader", "#!/bin/sh\nsleep 5\necho true\n");

    let tools = HookTools::new(Duration::from_millis(200)).with_tools_dir(dir.path());
    let err = tools.is_leader().await.unwrap_err();
    assert!(matches!(err, PlatformError::ToolTimeout { .. }));
}

#[tokio::test]
async fn run_returns_output_for_failing_tool() {
    let dir = TempDir::new().unwrap();
    create_tool(&dir, "leader-get", "#!/bin/sh\necho partial\nexit 1\n");

    let output = tools(&dir).run("leader-get", &[]).await.unwrap();
    assert!(!output.success);
    assert_eq!(output.exit_code, Some(1));
    assert_eq!(output.stdout.trim(), "partial");
}

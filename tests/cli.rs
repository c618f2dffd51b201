// ABOUTME: Integration tests for the redis-operator CLI commands.
// ABOUTME: Validates --help output, init, render, and an end-to-end handle run with fake hook tools.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

fn operator_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("redis-operator"));
    cmd.env_remove("REDIS_OPERATOR_APP")
        .env_remove("REDIS_OPERATOR_STATE_FILE")
        .env_remove("JUJU_UNIT_NAME")
        .env_remove("RUST_LOG");
    cmd
}

fn create_tool(dir: &Path, name: &str, script: &str) {
    let path = dir.join(name);
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

#[test]
fn help_shows_commands() {
    operator_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("handle"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("state"));
}

#[test]
fn init_creates_settings_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let settings_path = temp_dir.path().join("redis-operator.yml");

    operator_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--app", "cache"])
        .assert()
        .success();

    let content = fs::read_to_string(&settings_path).unwrap();
    assert!(content.contains("app: cache"));
    assert!(content.contains("probe_timeout:"));
}

#[test]
fn init_refuses_to_overwrite_existing_settings() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("redis-operator.yml"), "app: redis\n").unwrap();

    operator_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn render_prints_pod_spec() {
    let temp_dir = tempfile::tempdir().unwrap();

    operator_cmd()
        .current_dir(temp_dir.path())
        .args([
            "render", "--image", "redis:6.0", "--app", "redis", "--peer", "redis/1", "--peer",
            "redis/0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("version: 3"))
        .stdout(predicate::str::contains("redis/0 redis/1"))
        .stdout(predicate::str::contains("NodePort"));
}

#[test]
fn render_rejects_bad_peer() {
    let temp_dir = tempfile::tempdir().unwrap();

    operator_cmd()
        .current_dir(temp_dir.path())
        .args(["render", "--image", "redis", "--app", "redis", "--peer", "redis"])
        .assert()
        .failure();
}

#[test]
fn handle_rejects_unknown_event() {
    operator_cmd()
        .args(["handle", "install"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown event"));
}

#[test]
fn handle_start_with_unreachable_service_defers() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    let tools = root.join("tools");
    fs::create_dir_all(&tools).unwrap();

    let status_log = root.join("status.log");
    create_tool(&tools, "is-leader", "#!/bin/sh\necho true\n");
    create_tool(
        &tools,
        "goal-state",
        "#!/bin/sh\necho '{\"units\": {\"localhost/0\": {}}}'\n",
    );
    create_tool(&tools, "pod-spec-set", "#!/bin/sh\nexit 0\n");
    create_tool(
        &tools,
        "status-set",
        &format!("#!/bin/sh\necho \"$@\" >> {}\n", status_log.display()),
    );

    let state_file = root.join("state.json");
    fs::write(
        root.join("redis-operator.yml"),
        format!(
            "app: localhost\nport: 1\nstate_file: {}\nprobe_timeout: 200ms\n",
            state_file.display()
        ),
    )
    .unwrap();
    fs::write(root.join("config.yaml"), "image: redis:6.0\n").unwrap();

    operator_cmd()
        .current_dir(root)
        .arg("handle")
        .arg("start")
        .arg("--config")
        .arg(root.join("config.yaml"))
        .arg("--tools-dir")
        .arg(&tools)
        .assert()
        .success()
        .stdout(predicate::str::contains("pod spec submitted"))
        .stdout(predicate::str::contains("Deferred: start"));

    let log = fs::read_to_string(&status_log).unwrap();
    assert!(log.contains("waiting configuring pod"));
    assert!(log.contains("waiting waiting for backing service"));

    operator_cmd()
        .current_dir(root)
        .args(["--json", "state"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"deferred\":[{\"kind\":\"start\""));
}

fn failing_config_tools(root: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let tools = root.join("tools");
    fs::create_dir_all(&tools).unwrap();
    let status_log = root.join("status.log");
    create_tool(
        &tools,
        "config-get",
        "#!/bin/sh\necho 'not in a hook context' >&2\nexit 1\n",
    );
    create_tool(
        &tools,
        "status-set",
        &format!("#!/bin/sh\necho \"$@\" >> {}\n", status_log.display()),
    );
    fs::write(
        root.join("redis-operator.yml"),
        format!(
            "app: localhost\nstate_file: {}\n",
            root.join("state.json").display()
        ),
    )
    .unwrap();
    (tools, status_log)
}

#[test]
fn handle_stop_runs_when_config_get_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    let (tools, status_log) = failing_config_tools(root);

    operator_cmd()
        .current_dir(root)
        .arg("handle")
        .arg("stop")
        .arg("--tools-dir")
        .arg(&tools)
        .assert()
        .success();

    let log = fs::read_to_string(&status_log).unwrap();
    assert_eq!(log.trim(), "maintenance pod is terminating");
}

#[test]
fn handle_start_blocks_when_config_get_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    let (tools, status_log) = failing_config_tools(root);

    operator_cmd()
        .current_dir(root)
        .arg("handle")
        .arg("start")
        .arg("--tools-dir")
        .arg(&tools)
        .assert()
        .success();

    let log = fs::read_to_string(&status_log).unwrap();
    assert_eq!(log.trim(), "blocked configuration invalid");
}

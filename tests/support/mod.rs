// ABOUTME: Test support utilities.
// ABOUTME: Provides recording fakes for the platform, readiness probe, and state store.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use redis_operator::config::Config;
use redis_operator::controller::Controller;
use redis_operator::platform::{Leadership, PeerDiscovery, PlatformError, SpecSink, StatusSink};
use redis_operator::podspec::{DeploymentSpec, ResourceSpec};
use redis_operator::probe::ReadinessProbe;
use redis_operator::status::Status;
use redis_operator::store::{MemoryStore, StateStore, StoreError, StoredState};
use redis_operator::types::{AppName, UnitName, WorkloadIdentity};
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("redis_operator=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn tool_failure(tool: &str) -> PlatformError {
    PlatformError::ToolFailed {
        tool: tool.to_string(),
        code: Some(1),
        stderr: "injected failure".to_string(),
    }
}

#[derive(Debug, Default)]
struct PlatformState {
    leader: bool,
    leadership_error: bool,
    peers: Vec<UnitName>,
    peers_error: bool,
    submit_error: bool,
    status_error: bool,
    submissions: Vec<(DeploymentSpec, ResourceSpec)>,
    unit_statuses: Vec<Status>,
    app_statuses: Vec<Status>,
}

/// Platform fake that records every write. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl FakePlatform {
    pub fn leader() -> Self {
        let platform = Self::default();
        platform.set_leader(true);
        platform.set_peers(&["redis/0"]);
        platform
    }

    pub fn follower() -> Self {
        let platform = Self::leader();
        platform.set_leader(false);
        platform
    }

    pub fn set_leader(&self, leader: bool) {
        self.state.lock().leader = leader;
    }

    pub fn set_leadership_error(&self, fail: bool) {
        self.state.lock().leadership_error = fail;
    }

    pub fn set_peers(&self, peers: &[&str]) {
        self.state.lock().peers = peers.iter().map(|p| UnitName::parse(p).unwrap()).collect();
    }

    pub fn set_peers_error(&self, fail: bool) {
        self.state.lock().peers_error = fail;
    }

    pub fn set_submit_error(&self, fail: bool) {
        self.state.lock().submit_error = fail;
    }

    pub fn set_status_error(&self, fail: bool) {
        self.state.lock().status_error = fail;
    }

    pub fn submissions(&self) -> Vec<(DeploymentSpec, ResourceSpec)> {
        self.state.lock().submissions.clone()
    }

    pub fn unit_statuses(&self) -> Vec<Status> {
        self.state.lock().unit_statuses.clone()
    }

    pub fn app_statuses(&self) -> Vec<Status> {
        self.state.lock().app_statuses.clone()
    }

    pub fn last_unit_status(&self) -> Option<Status> {
        self.state.lock().unit_statuses.last().cloned()
    }
}

#[async_trait]
impl Leadership for FakePlatform {
    async fn is_leader(&self) -> Result<bool, PlatformError> {
        let state = self.state.lock();
        if state.leadership_error {
            return Err(tool_failure("is-leader"));
        }
        Ok(state.leader)
    }
}

#[async_trait]
impl PeerDiscovery for FakePlatform {
    async fn expected_peers(&self) -> Result<Vec<UnitName>, PlatformError> {
        let state = self.state.lock();
        if state.peers_error {
            return Err(tool_failure("goal-state"));
        }
        Ok(state.peers.clone())
    }
}

#[async_trait]
impl SpecSink for FakePlatform {
    async fn submit_spec(
        &self,
        spec: &DeploymentSpec,
        resources: &ResourceSpec,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if state.submit_error {
            return Err(tool_failure("pod-spec-set"));
        }
        state.submissions.push((spec.clone(), resources.clone()));
        Ok(())
    }
}

#[async_trait]
impl StatusSink for FakePlatform {
    async fn set_unit_status(&self, status: &Status) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if state.status_error {
            return Err(tool_failure("status-set"));
        }
        state.unit_statuses.push(status.clone());
        Ok(())
    }

    async fn set_application_status(&self, status: &Status) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if state.status_error {
            return Err(tool_failure("status-set"));
        }
        state.app_statuses.push(status.clone());
        Ok(())
    }
}

/// Readiness probe with a switchable answer. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    ready: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl FakeProbe {
    pub fn ready() -> Self {
        let probe = Self::default();
        probe.set_ready(true);
        probe
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadinessProbe for FakeProbe {
    async fn is_ready(&self, _address: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ready.load(Ordering::SeqCst)
    }
}

/// State store whose every access fails.
#[derive(Debug, Clone, Default)]
pub struct BrokenStore;

#[async_trait]
impl StateStore for BrokenStore {
    async fn load(&self) -> Result<StoredState, StoreError> {
        Err(StoreError::Read {
            path: "broken".into(),
            source: std::io::Error::other("storage offline"),
        })
    }

    async fn save(&self, _state: StoredState) -> Result<(), StoreError> {
        Err(StoreError::Write {
            path: "broken".into(),
            source: std::io::Error::other("storage offline"),
        })
    }
}

pub fn identity() -> WorkloadIdentity {
    WorkloadIdentity::from(AppName::new("redis").unwrap())
}

pub fn valid_config() -> Config {
    Config::new().with("image", "redis:6.0")
}

pub fn controller(
    platform: &FakePlatform,
    store: &MemoryStore,
    probe: &FakeProbe,
) -> Controller<FakePlatform, MemoryStore, FakeProbe> {
    init_tracing();
    Controller::new(
        identity(),
        valid_config(),
        platform.clone(),
        store.clone(),
        probe.clone(),
    )
}

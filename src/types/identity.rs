// ABOUTME: Immutable identity of the managed workload.
// ABOUTME: Combines the application name with the port the backing service listens on.

use super::AppName;
use serde::{Deserialize, Serialize};

/// Port the Redis container listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 6379;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadIdentity {
    pub name: AppName,
    pub port: u16,
}

impl WorkloadIdentity {
    pub fn new(name: AppName, port: u16) -> Self {
        Self { name, port }
    }

    /// Network address of the backing service, reachable through the
    /// Kubernetes service named after the application.
    pub fn address(&self) -> String {
        format!("{}:{}", self.name, self.port)
    }
}

impl From<AppName> for WorkloadIdentity {
    fn from(name: AppName) -> Self {
        Self::new(name, DEFAULT_PORT)
    }
}

// ABOUTME: Workload status values reported to the platform.
// ABOUTME: One tagged variant per platform status kind, each carrying a message.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const POD_READY: &str = "pod is ready";
pub const SERVICE_READY: &str = "service ready";
pub const CONFIG_INVALID: &str = "configuration invalid";
pub const CONFIGURING_POD: &str = "configuring pod";
pub const IMAGE_FETCH_FAILED: &str = "error fetching image information";
pub const PEERS_FETCH_FAILED: &str = "error fetching peer information";
pub const STATE_UNAVAILABLE: &str = "error accessing controller state";
pub const SPEC_SUBMISSION_PENDING: &str = "waiting for pod spec submission";
pub const WAITING_FOR_SERVICE: &str = "waiting for backing service";
pub const NOT_INITIALIZED: &str = "not initialized";
pub const POD_TERMINATING: &str = "pod is terminating";

/// Status kinds understood by the platform status API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Active,
    Waiting,
    Blocked,
    Maintenance,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Active => "active",
            StatusKind::Waiting => "waiting",
            StatusKind::Blocked => "blocked",
            StatusKind::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit or application status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Status {
    Active(String),
    Waiting(String),
    Blocked(String),
    Maintenance(String),
}

impl Status {
    pub fn active(message: impl Into<String>) -> Self {
        Status::Active(message.into())
    }

    pub fn waiting(message: impl Into<String>) -> Self {
        Status::Waiting(message.into())
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Status::Blocked(message.into())
    }

    pub fn maintenance(message: impl Into<String>) -> Self {
        Status::Maintenance(message.into())
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            Status::Active(_) => StatusKind::Active,
            Status::Waiting(_) => StatusKind::Waiting,
            Status::Blocked(_) => StatusKind::Blocked,
            Status::Maintenance(_) => StatusKind::Maintenance,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Status::Active(m) | Status::Waiting(m) | Status::Blocked(m) | Status::Maintenance(m) => m,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message().is_empty() {
            write!(f, "{}", self.kind())
        } else {
            write!(f, "{}: {}", self.kind(), self.message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_message() {
        let status = Status::blocked(CONFIG_INVALID);
        assert_eq!(status.kind(), StatusKind::Blocked);
        assert_eq!(status.message(), "configuration invalid");
    }

    #[test]
    fn display_omits_empty_message() {
        assert_eq!(Status::active("").to_string(), "active");
        assert_eq!(
            Status::waiting(NOT_INITIALIZED).to_string(),
            "waiting: not initialized"
        );
    }

    #[test]
    fn serializes_as_tagged_json() {
        let json = serde_json::to_string(&Status::maintenance(POD_TERMINATING)).unwrap();
        assert_eq!(json, r#"{"kind":"maintenance","message":"pod is terminating"}"#);
    }
}

// ABOUTME: DNS-compatible application name validation.
// ABOUTME: The name addresses the backing service and labels the Kubernetes service.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppNameError {
    #[error("application name cannot be empty")]
    Empty,

    #[error("application name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("application name must start with a lowercase letter")]
    InvalidStart,

    #[error("application name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("invalid character in application name: '{0}'")]
    InvalidChar(char),
}

/// Application name following RFC 1123 label rules.
///
/// Kubernetes uses it as the service name, so it must also be a valid
/// hostname for the readiness probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppName(String);

impl AppName {
    pub fn new(value: &str) -> Result<Self, AppNameError> {
        let Some(first) = value.chars().next() else {
            return Err(AppNameError::Empty);
        };

        if value.len() > 63 {
            return Err(AppNameError::TooLong);
        }

        if !first.is_ascii_lowercase() {
            return Err(AppNameError::InvalidStart);
        }

        if value.ends_with('-') {
            return Err(AppNameError::EndsWithHyphen);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(AppNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AppName {
    type Err = AppNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for AppName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AppName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AppName::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        assert_eq!(AppName::new("redis").unwrap().as_str(), "redis");
        assert!(AppName::new("redis-k8s-2").is_ok());
    }

    #[test]
    fn rejects_leading_digit_or_hyphen() {
        assert_eq!(AppName::new("1redis"), Err(AppNameError::InvalidStart));
        assert_eq!(AppName::new("-redis"), Err(AppNameError::InvalidStart));
    }

    #[test]
    fn rejects_uppercase_and_slash() {
        assert_eq!(AppName::new("rEdis"), Err(AppNameError::InvalidChar('E')));
        assert_eq!(AppName::new("redis/0"), Err(AppNameError::InvalidChar('/')));
    }

    #[test]
    fn length_limit() {
        assert!(AppName::new(&"a".repeat(63)).is_ok());
        assert_eq!(AppName::new(&"a".repeat(64)), Err(AppNameError::TooLong));
    }
}

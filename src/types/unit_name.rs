// ABOUTME: Unit identifiers of the form <application>/<ordinal>.
// ABOUTME: Peers are ordered by their numeric ordinal, not lexically.

use super::app_name::{AppName, AppNameError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitNameError {
    #[error("unit name must have the form <application>/<ordinal>: {0}")]
    MissingOrdinal(String),

    #[error("invalid unit ordinal: {0}")]
    InvalidOrdinal(String),

    #[error("invalid application in unit name: {0}")]
    App(#[from] AppNameError),
}

/// A single replica of the application, e.g. `redis/3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitName {
    app: AppName,
    ordinal: u32,
}

impl UnitName {
    pub fn new(app: AppName, ordinal: u32) -> Self {
        Self { app, ordinal }
    }

    pub fn parse(input: &str) -> Result<Self, UnitNameError> {
        let (app, ordinal) = input
            .trim()
            .rsplit_once('/')
            .ok_or_else(|| UnitNameError::MissingOrdinal(input.to_string()))?;

        let ordinal = ordinal
            .parse::<u32>()
            .map_err(|_| UnitNameError::InvalidOrdinal(ordinal.to_string()))?;

        Ok(Self {
            app: AppName::new(app)?,
            ordinal,
        })
    }

    pub fn app(&self) -> &AppName {
        &self.app
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }
}

impl FromStr for UnitName {
    type Err = UnitNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app, self.ordinal)
    }
}

impl Serialize for UnitName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UnitName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        UnitName::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Sort units by ordinal ascending, so `redis/10` follows `redis/9`.
pub fn sort_by_ordinal(units: &mut [UnitName]) {
    units.sort_by_key(|u| u.ordinal);
}

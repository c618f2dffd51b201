// ABOUTME: Library root for redis-operator - exposes the controller and its collaborators.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod platform;
pub mod podspec;
pub mod probe;
pub mod status;
pub mod store;
pub mod types;

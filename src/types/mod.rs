// ABOUTME: Validated domain types shared by the controller and the spec builder.
// ABOUTME: Application names, unit names with ordinals, and container image references.

mod app_name;
mod identity;
mod image_ref;
mod unit_name;

pub use app_name::{AppName, AppNameError};
pub use identity::{DEFAULT_PORT, WorkloadIdentity};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use unit_name::{UnitName, UnitNameError, sort_by_ordinal};

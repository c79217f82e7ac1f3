//! Application layer: Use cases and services.
//!
//! This module chains backend calls through the `WarehouseApi` port to
//! implement the login and scanning workflows.

mod login;
mod scan;

pub use login::{LoginOutcome, LoginRequest, LoginService, LoginStep};
pub use scan::{ScanOutcome, ScanService};

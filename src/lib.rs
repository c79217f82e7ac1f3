//! # IWM Terminal
//!
//! Intelligent Warehouse Management client for handheld and desktop
//! terminals.
//!
//! This crate provides:
//! - The operator login sequence (user, password, warehouse, license, work date)
//! - Warehousing scan entry with check-then-insert against the backend
//! - Batch confirmation and SN/IMEI inspection
//! - A terminal user interface driving all of the above
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (session, warehouse records, boxes, scan batch)
//! - `ports`: The `WarehouseApi` boundary to the backend
//! - `adapters`: Concrete implementations (HTTP, in-memory, log sanitizer)
//! - `application`: Use cases chaining backend calls
//! - `tui`: Terminal user interface
//! - `config`: Layered client configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use config::{ClientConfig, ConfigError};
pub use domain::{BoxRecord, ScanBatch, SessionContext};
pub use ports::{ApiError, WarehouseApi};

/// Result type for IWM operations
pub type Result<T> = std::result::Result<T, IwmError>;

/// Main error type for IWM operations.
///
/// The `Display` text of the workflow variants is exactly what the operator
/// sees in the alert.
#[derive(Debug, thiserror::Error)]
pub enum IwmError {
    #[error("UserCode required")]
    UserCodeRequired,

    #[error("The user does not have permissions to operate!")]
    NoPermission,

    #[error("Password Error, please check!")]
    PasswordMismatch,

    #[error("Select warehouse")]
    WarehouseRequired,

    #[error("Warehouse does not exist!")]
    WarehouseNotFound,

    #[error("{0}")]
    License(String),

    #[error("Unable to get work date!")]
    WorkdateUnavailable,

    #[error("Unable to load classes")]
    ClassesUnavailable(#[source] ApiError),

    #[error("Unable to load warehouses")]
    WarehousesUnavailable(#[source] ApiError),

    #[error("Server not reachable")]
    ServerUnreachable(#[source] ApiError),

    #[error("Cannot reach server or something went wrong!")]
    RequestFailed(#[source] ApiError),

    #[error("Barcode required")]
    BarcodeRequired,

    #[error("Box {0} is already in this batch!")]
    DuplicateBox(String),

    #[error("Barcode does not exist!")]
    BarcodeNotFound,

    #[error("{0}")]
    BarcodeRejected(String),

    #[error("{0}")]
    InsertRejected(String),

    #[error("Please log in first")]
    NotLoggedIn,
}

impl IwmError {
    /// Title of the alert that reports this error.
    #[must_use]
    pub fn alert_title(&self) -> &'static str {
        match self {
            Self::License(_) => "License Error",
            Self::BarcodeRejected(_) | Self::BarcodeNotFound | Self::DuplicateBox(_) => {
                "Scan Error"
            }
            Self::InsertRejected(_) => "Insert Error",
            _ => "Error",
        }
    }
}

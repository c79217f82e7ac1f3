//! Ports layer: Trait definitions for external operations.
//!
//! The warehouse backend is the only external system; `WarehouseApi`
//! is its boundary.

mod warehouse_api;

pub use warehouse_api::{ApiError, BarcodeCheckRequest, PalletInsertRequest, WarehouseApi};

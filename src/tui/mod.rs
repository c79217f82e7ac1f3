//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Login (class, user, password, warehouse)
//! - Operations menu
//! - Warehousing scanning
//! - Batch confirmation and SN/IMEI detail

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen};
pub use styles::WarehouseTheme;
pub use worker::{ApiWorker, ApiWorkerHandle, WorkerMessage, WorkerOutcome, WorkerPoll};

//! Domain layer: Core warehouse types.
//!
//! Plain data with serde derives. Nothing here performs I/O.

pub mod menu;
pub(crate) mod records;
mod scan;
mod session;

pub use menu::{MenuItem, Route, MENU_ITEMS};
pub use records::{ClassItem, LicenseStatus, UserInfo, WarehouseInfo, WarehouseItem};
pub use scan::{BatchSummary, BoxRecord, ScanBatch, SnItem};
pub use session::SessionContext;

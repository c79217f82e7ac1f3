//! Warehouse backend port.
//!
//! One method per JSON endpoint. Implementations return the decoded `dt`
//! rows (an absent `dt` is an empty list) and map transport, status and
//! decoding failures onto `ApiError`.

use serde::Serialize;

use crate::domain::{BoxRecord, ClassItem, LicenseStatus, UserInfo, WarehouseInfo, WarehouseItem};

/// Error type for backend calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Server not reachable: {0}")]
    Unreachable(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-provided message for a rejected request, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// Body of `/api/InBarcodeCheck`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeCheckRequest {
    pub factory_code: String,
    pub ware_house_code: String,
    pub user_code: String,
    pub barcode: String,
}

/// Body of `/api/InPalletInsert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletInsertRequest {
    pub factory_code: String,
    pub ware_house_code: String,
    pub class_code: String,
    pub user_code: String,
    pub workdate: String,
    pub pallet_code: String,
    pub box_code: String,
    pub qty: u32,
}

/// Trait for the remote warehouse API.
///
/// Calls are blocking; callers run them off the UI thread.
pub trait WarehouseApi: Send + Sync {
    /// `/api/getClassList`
    ///
    /// # Errors
    /// Returns error if the request fails.
    fn class_list(&self, factory_code: &str) -> Result<Vec<ClassItem>, ApiError>;

    /// `/api/getUserInfo`
    ///
    /// # Errors
    /// Returns error if the request fails.
    fn user_info(&self, factory_code: &str, user_code: &str) -> Result<Vec<UserInfo>, ApiError>;

    /// `/api/getAllWareHouses`: warehouses the user may operate.
    ///
    /// # Errors
    /// Returns error if the request fails.
    fn all_warehouses(
        &self,
        factory_code: &str,
        user_code: &str,
    ) -> Result<Vec<WarehouseItem>, ApiError>;

    /// `/api/getWareInfo`
    ///
    /// # Errors
    /// Returns error if the request fails.
    fn ware_info(
        &self,
        factory_code: &str,
        ware_house_code: &str,
    ) -> Result<Vec<WarehouseInfo>, ApiError>;

    /// `/api/checkWarehouse`: license verification.
    ///
    /// A refused license is reported as `ApiError::Status`.
    ///
    /// # Errors
    /// Returns error if the request fails or the license is refused.
    fn check_warehouse(
        &self,
        factory_code: &str,
        ware_house_code: &str,
    ) -> Result<LicenseStatus, ApiError>;

    /// `/api/getWorkdate`
    ///
    /// # Returns
    /// `None` if the backend has no work date for the warehouse.
    ///
    /// # Errors
    /// Returns error if the request fails.
    fn workdate(&self, factory_code: &str, ware_house_code: &str)
        -> Result<Option<String>, ApiError>;

    /// `/api/InBarcodeCheck`
    ///
    /// # Errors
    /// Returns error if the request fails.
    fn in_barcode_check(&self, request: &BarcodeCheckRequest) -> Result<Vec<BoxRecord>, ApiError>;

    /// `/api/InPalletInsert`
    ///
    /// # Returns
    /// The server's confirmation message (may be empty).
    ///
    /// # Errors
    /// Returns error if the request fails or the insert is refused.
    fn in_pallet_insert(&self, request: &PalletInsertRequest) -> Result<String, ApiError>;
}

//! In-memory adapter: `WarehouseApi` without a server.
//!
//! Backs the `--demo` mode and the tests. Seeded data mirrors what the real
//! backend returns; inserted pallets are recorded so a box cannot be put
//! away twice.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{
    BoxRecord, ClassItem, LicenseStatus, SnItem, UserInfo, WarehouseInfo, WarehouseItem,
};
use crate::ports::{ApiError, BarcodeCheckRequest, PalletInsertRequest, WarehouseApi};

/// Entries kept in the call and insert logs; older ones are dropped.
pub const LOG_CAPACITY: usize = 256;

#[derive(Default)]
struct MemoryState {
    classes: Vec<ClassItem>,
    users: Vec<UserInfo>,
    warehouses: Vec<WarehouseInfo>,
    refused_licenses: HashMap<String, String>,
    workdates: HashMap<String, String>,
    boxes: Vec<BoxRecord>,
    /// Every box ever stored, for the duplicate check.
    stored: HashSet<String>,
    inserted: VecDeque<PalletInsertRequest>,
    calls: VecDeque<&'static str>,
    unreachable: bool,
}

/// Backend held entirely in memory.
#[derive(Default)]
pub struct MemoryWarehouseApi {
    state: Mutex<MemoryState>,
}

impl MemoryWarehouseApi {
    /// An empty backend: no users, no warehouses, no boxes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with a demo user (`admin` / `1234`), two warehouses
    /// and a handful of boxes.
    #[must_use]
    pub fn demo() -> Self {
        let api = Self::new()
            .with_class(ClassItem::new("A", "Day Shift"))
            .with_class(ClassItem::new("B", "Night Shift"))
            .with_user(UserInfo::new("admin", "Administrator", "ADMIN", "1234"))
            .with_warehouse(
                WarehouseInfo {
                    ware_house_code: "W01".into(),
                    ware_house_name: "Finished Goods".into(),
                    ware_house_type: "FG".into(),
                },
                "2025-08-18",
            )
            .with_warehouse(
                WarehouseInfo {
                    ware_house_code: "W02".into(),
                    ware_house_name: "Spare Parts".into(),
                    ware_house_type: "SP".into(),
                },
                "2025-08-18",
            )
            .with_box(
                BoxRecord::new("C4554402", "SKU-4402", 2, "PLT-77291")
                    .with_color("Red")
                    .with_sn_items(vec![
                    SnItem::new("SN-9901", "358291002231", "358291002232"),
                    SnItem::new("SN-9902", "358291002241", "358291002242"),
                ]),
            )
            .with_box(
                BoxRecord::new("C4554403", "SKU-4402", 1, "PLT-77291")
                    .with_color("Blue")
                    .with_sn_items(vec![
                    SnItem::new("SN-9903", "358291002251", "358291002252"),
                ]),
            )
            .with_box(BoxRecord::new("C4554404", "SKU-5510", 48, "PLT-77292").with_color("Black"));
        api.refuse_license("W02", "License expired for this warehouse");
        api
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[must_use]
    pub fn with_class(self, class: ClassItem) -> Self {
        self.lock().classes.push(class);
        self
    }

    #[must_use]
    pub fn with_user(self, user: UserInfo) -> Self {
        self.lock().users.push(user);
        self
    }

    /// Add a warehouse with its current work date (empty for none).
    #[must_use]
    pub fn with_warehouse(self, info: WarehouseInfo, workdate: &str) -> Self {
        {
            let mut state = self.lock();
            if !workdate.is_empty() {
                state
                    .workdates
                    .insert(info.ware_house_code.clone(), workdate.to_string());
            }
            state.warehouses.push(info);
        }
        self
    }

    #[must_use]
    pub fn with_box(self, record: BoxRecord) -> Self {
        self.lock().boxes.push(record);
        self
    }

    /// Make `/api/checkWarehouse` refuse the given warehouse.
    pub fn refuse_license(&self, ware_house_code: &str, message: &str) {
        self.lock()
            .refused_licenses
            .insert(ware_house_code.to_string(), message.to_string());
    }

    /// Simulate a network outage for every subsequent call.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// The most recent pallet inserts, oldest first.
    #[must_use]
    pub fn inserted(&self) -> Vec<PalletInsertRequest> {
        self.lock().inserted.iter().cloned().collect()
    }

    /// The most recent endpoints called, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.iter().copied().collect()
    }

    fn begin(&self, endpoint: &'static str) -> Result<MutexGuard<'_, MemoryState>, ApiError> {
        let mut state = self.lock();
        push_capped(&mut state.calls, endpoint);
        if state.unreachable {
            return Err(ApiError::Unreachable("connection refused".to_string()));
        }
        Ok(state)
    }
}

impl WarehouseApi for MemoryWarehouseApi {
    fn class_list(&self, _factory_code: &str) -> Result<Vec<ClassItem>, ApiError> {
        let state = self.begin("getClassList")?;
        Ok(state.classes.clone())
    }

    fn user_info(&self, _factory_code: &str, user_code: &str) -> Result<Vec<UserInfo>, ApiError> {
        let state = self.begin("getUserInfo")?;
        Ok(state
            .users
            .iter()
            .filter(|u| u.user_code == user_code)
            .cloned()
            .collect())
    }

    fn all_warehouses(
        &self,
        _factory_code: &str,
        _user_code: &str,
    ) -> Result<Vec<WarehouseItem>, ApiError> {
        let state = self.begin("getAllWareHouses")?;
        Ok(state
            .warehouses
            .iter()
            .map(|w| WarehouseItem::new(&w.ware_house_code, &w.ware_house_name))
            .collect())
    }

    fn ware_info(
        &self,
        _factory_code: &str,
        ware_house_code: &str,
    ) -> Result<Vec<WarehouseInfo>, ApiError> {
        let state = self.begin("getWareInfo")?;
        Ok(state
            .warehouses
            .iter()
            .filter(|w| w.ware_house_code == ware_house_code)
            .cloned()
            .collect())
    }

    fn check_warehouse(
        &self,
        _factory_code: &str,
        ware_house_code: &str,
    ) -> Result<LicenseStatus, ApiError> {
        let state = self.begin("checkWarehouse")?;
        match state.refused_licenses.get(ware_house_code) {
            Some(message) => Err(ApiError::Status {
                status: 403,
                message: message.clone(),
            }),
            None => Ok(LicenseStatus {
                message: "License valid".to_string(),
            }),
        }
    }

    fn workdate(
        &self,
        _factory_code: &str,
        ware_house_code: &str,
    ) -> Result<Option<String>, ApiError> {
        let state = self.begin("getWorkdate")?;
        Ok(state.workdates.get(ware_house_code).cloned())
    }

    fn in_barcode_check(&self, request: &BarcodeCheckRequest) -> Result<Vec<BoxRecord>, ApiError> {
        let state = self.begin("InBarcodeCheck")?;
        if state.stored.contains(&request.barcode) {
            return Err(ApiError::Status {
                status: 409,
                message: "Box already in warehouse!".to_string(),
            });
        }
        Ok(state
            .boxes
            .iter()
            .filter(|b| b.box_code == request.barcode)
            .cloned()
            .collect())
    }

    fn in_pallet_insert(&self, request: &PalletInsertRequest) -> Result<String, ApiError> {
        let mut state = self.begin("InPalletInsert")?;
        if !state.stored.insert(request.box_code.clone()) {
            return Err(ApiError::Status {
                status: 409,
                message: "Box already in warehouse!".to_string(),
            });
        }
        push_capped(&mut state.inserted, request.clone());
        Ok(format!(
            "Box {} stored on pallet {}",
            request.box_code, request.pallet_code
        ))
    }
}

fn push_capped<T>(log: &mut VecDeque<T>, entry: T) {
    if log.len() == LOG_CAPACITY {
        log.pop_front();
    }
    log.push_back(entry);
}

//! Scan service: warehousing entry of one box.
//!
//! A scanned barcode is first checked (`InBarcodeCheck`), and only if the
//! backend knows the box is it inserted onto its pallet (`InPalletInsert`).

use std::sync::Arc;

use chrono::Local;

use crate::domain::{BoxRecord, SessionContext};
use crate::ports::{BarcodeCheckRequest, PalletInsertRequest, WarehouseApi};
use crate::IwmError;

/// A box accepted by the backend.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub record: BoxRecord,
    /// Server confirmation, possibly empty.
    pub message: String,
}

/// Service for warehousing scans.
pub struct ScanService<A>
where
    A: WarehouseApi + ?Sized,
{
    api: Arc<A>,
}

impl<A> ScanService<A>
where
    A: WarehouseApi + ?Sized,
{
    /// Create a new scan service.
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Check a barcode and put the box away.
    ///
    /// `batch_codes` are the boxes already scanned in this batch; scanning
    /// one of them again is refused before any request is made.
    ///
    /// # Errors
    /// Returns the alert for the first failing step.
    pub fn scan(
        &self,
        session: &SessionContext,
        barcode: &str,
        batch_codes: &[String],
    ) -> Result<ScanOutcome, IwmError> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(IwmError::BarcodeRequired);
        }
        if !session.is_logged_in() {
            return Err(IwmError::NotLoggedIn);
        }
        if batch_codes.iter().any(|c| c == barcode) {
            return Err(IwmError::DuplicateBox(barcode.to_string()));
        }

        let check = BarcodeCheckRequest {
            factory_code: session.factory_code.clone(),
            ware_house_code: session.ware_code.clone(),
            user_code: session.user_code.clone(),
            barcode: barcode.to_string(),
        };

        let mut record = match self.api.in_barcode_check(&check) {
            Ok(rows) => rows.into_iter().next().ok_or_else(|| {
                tracing::info!(barcode, "Barcode not found");
                IwmError::BarcodeNotFound
            })?,
            Err(e) if e.is_status() => {
                let message = e.server_message().unwrap_or("Barcode check failed!").to_string();
                return Err(IwmError::BarcodeRejected(message));
            }
            Err(e) => {
                tracing::warn!("Barcode check failed: {}", e);
                return Err(IwmError::RequestFailed(e));
            }
        };
        if record.box_code.is_empty() {
            record.box_code = barcode.to_string();
        }
        if record.box_code != barcode && batch_codes.contains(&record.box_code) {
            return Err(IwmError::DuplicateBox(record.box_code));
        }

        let insert = PalletInsertRequest {
            factory_code: session.factory_code.clone(),
            ware_house_code: session.ware_code.clone(),
            class_code: session.class_code.clone(),
            user_code: session.user_code.clone(),
            workdate: session.workdate.clone(),
            pallet_code: record.pallet_code.clone(),
            box_code: record.box_code.clone(),
            qty: record.qty,
        };

        let message = match self.api.in_pallet_insert(&insert) {
            Ok(message) => message,
            Err(e) if e.is_status() => {
                let message = e.server_message().unwrap_or("Pallet insert failed!").to_string();
                tracing::warn!(box_code = %record.box_code, "Insert refused: {}", message);
                return Err(IwmError::InsertRejected(message));
            }
            Err(e) => {
                tracing::warn!("Pallet insert failed: {}", e);
                return Err(IwmError::RequestFailed(e));
            }
        };

        record.scanned_at = Some(Local::now());
        tracing::info!(
            box_code = %record.box_code,
            pallet_code = %record.pallet_code,
            qty = record.qty,
            "Box stored"
        );

        Ok(ScanOutcome { record, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::{HttpWarehouseApi, BARCODE_CHECK_PATH, PALLET_INSERT_PATH};
    use crate::adapters::memory::MemoryWarehouseApi;
    use crate::config::ClientConfig;
    use mockito::Server;
    use std::time::Duration;

    fn logged_in() -> SessionContext {
        let mut session = SessionContext::new(&ClientConfig::default());
        session.user_code = "admin".into();
        session.ware_code = "W01".into();
        session.class_code = "A".into();
        session.workdate = "2025-08-18".into();
        session
    }

    fn service() -> (Arc<MemoryWarehouseApi>, ScanService<MemoryWarehouseApi>) {
        let api = Arc::new(MemoryWarehouseApi::demo());
        (api.clone(), ScanService::new(api))
    }

    fn http_service(server: &Server) -> ScanService<HttpWarehouseApi> {
        let api = HttpWarehouseApi::new(server.url(), Duration::from_secs(5), Duration::from_secs(2))
            .expect("Should build client");
        ScanService::new(Arc::new(api))
    }

    #[test]
    fn test_scan_checks_then_inserts() {
        let (api, svc) = service();
        let outcome = svc
            .scan(&logged_in(), " C4554402 ", &[])
            .expect("Should scan");

        assert_eq!(outcome.record.box_code, "C4554402");
        assert_eq!(outcome.record.pallet_code, "PLT-77291");
        assert_eq!(outcome.record.sn_items.len(), 2);
        assert!(outcome.record.scanned_at.is_some());
        assert_eq!(api.calls(), vec!["InBarcodeCheck", "InPalletInsert"]);

        let inserted = api.inserted();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].class_code, "A");
        assert_eq!(inserted[0].workdate, "2025-08-18");
        assert_eq!(inserted[0].qty, 2);
    }

    #[test]
    fn test_empty_barcode_makes_no_request() {
        let (api, svc) = service();
        assert!(matches!(
            svc.scan(&logged_in(), "   ", &[]),
            Err(IwmError::BarcodeRequired)
        ));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_requires_login() {
        let (_, svc) = service();
        let session = SessionContext::new(&ClientConfig::default());
        assert!(matches!(
            svc.scan(&session, "C4554402", &[]),
            Err(IwmError::NotLoggedIn)
        ));
    }

    #[test]
    fn test_duplicate_in_batch() {
        let (api, svc) = service();
        let err = svc
            .scan(&logged_in(), "C4554402", &["C4554402".to_string()])
            .expect_err("Should fail");
        assert!(matches!(err, IwmError::DuplicateBox(_)));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_unknown_barcode_skips_insert() {
        let (api, svc) = service();
        let err = svc.scan(&logged_in(), "NOPE", &[]).expect_err("Should fail");
        assert_eq!(err.to_string(), "Barcode does not exist!");
        assert_eq!(api.calls(), vec!["InBarcodeCheck"]);
    }

    #[test]
    fn test_rejected_barcode_uses_server_message() {
        let (_, svc) = service();
        svc.scan(&logged_in(), "C4554404", &[]).expect("first scan");

        // A new batch no longer knows the box, the backend does.
        let err = svc.scan(&logged_in(), "C4554404", &[]).expect_err("Should fail");
        assert_eq!(err.alert_title(), "Scan Error");
        assert_eq!(err.to_string(), "Box already in warehouse!");
    }

    #[test]
    fn test_refused_insert_uses_server_message() {
        let mut server = Server::new();
        let _check = server
            .mock("POST", BARCODE_CHECK_PATH)
            .with_status(200)
            .with_body(r#"{"dt":[{"boxCode":"C1","model":"SKU-1","qty":3,"palletCode":"PLT-1"}]}"#)
            .create();
        let _insert = server
            .mock("POST", PALLET_INSERT_PATH)
            .with_status(409)
            .with_body(r#"{"message":"Pallet closed"}"#)
            .create();

        let err = http_service(&server)
            .scan(&logged_in(), "C1", &[])
            .expect_err("Should fail");

        assert!(matches!(err, IwmError::InsertRejected(_)));
        assert_eq!(err.alert_title(), "Insert Error");
        assert_eq!(err.to_string(), "Pallet closed");
    }

    #[test]
    fn test_resolved_box_already_in_batch() {
        let mut server = Server::new();
        let _check = server
            .mock("POST", BARCODE_CHECK_PATH)
            .with_status(200)
            .with_body(r#"{"dt":[{"boxCode":"C1","model":"SKU-1","qty":3,"palletCode":"PLT-X"}]}"#)
            .create();
        let insert = server.mock("POST", PALLET_INSERT_PATH).expect(0).create();

        let err = http_service(&server)
            .scan(&logged_in(), "PLT-X", &["C1".to_string()])
            .expect_err("Should fail");

        assert!(matches!(err, IwmError::DuplicateBox(ref code) if code == "C1"));
        insert.assert();
    }

    #[test]
    fn test_transport_failure() {
        let (api, svc) = service();
        api.set_unreachable(true);
        let err = svc.scan(&logged_in(), "C4554402", &[]).expect_err("Should fail");
        assert!(matches!(err, IwmError::RequestFailed(_)));
    }
}

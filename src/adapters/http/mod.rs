//! HTTP adapter: Implementation of `WarehouseApi` over the JSON backend.
//!
//! Every endpoint is a `POST` with a small JSON body. Rows come back in a
//! `dt` array. A non-2xx status is surfaced as `ApiError::Status` carrying
//! the body's `message` field when there is one.
//!
//! Request and response bodies are never logged: user info responses carry
//! passwords.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ClientConfig;
use crate::domain::records::lenient;
use crate::domain::{BoxRecord, ClassItem, LicenseStatus, UserInfo, WarehouseInfo, WarehouseItem};
use crate::ports::{ApiError, BarcodeCheckRequest, PalletInsertRequest, WarehouseApi};

pub const CLASS_LIST_PATH: &str = "/api/getClassList";
pub const USER_INFO_PATH: &str = "/api/getUserInfo";
pub const ALL_WAREHOUSES_PATH: &str = "/api/getAllWareHouses";
pub const WARE_INFO_PATH: &str = "/api/getWareInfo";
pub const CHECK_WAREHOUSE_PATH: &str = "/api/checkWarehouse";
pub const WORKDATE_PATH: &str = "/api/getWorkdate";
pub const BARCODE_CHECK_PATH: &str = "/api/InBarcodeCheck";
pub const PALLET_INSERT_PATH: &str = "/api/InPalletInsert";

/// Longest error body echoed back when the server sent no JSON message.
const MAX_ERROR_BODY: usize = 200;

/// `{ "dt": [...] }` envelope.
#[derive(Debug, Deserialize)]
struct Rows<T> {
    dt: Option<Vec<T>>,
}

impl<T> Rows<T> {
    fn into_vec(self) -> Vec<T> {
        self.dt.unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
struct MessageBody {
    #[serde(default, deserialize_with = "lenient::string")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct WorkdateRow {
    #[serde(default, alias = "workDate", deserialize_with = "lenient::string")]
    workdate: String,
}

/// The work date comes either as a scalar or as the first `dt` row.
#[derive(Debug, Deserialize)]
struct WorkdateBody {
    #[serde(default, alias = "workDate", deserialize_with = "lenient::string")]
    workdate: String,
    #[serde(default)]
    dt: Option<Vec<WorkdateRow>>,
}

impl WorkdateBody {
    fn into_workdate(self) -> Option<String> {
        if !self.workdate.is_empty() {
            return Some(self.workdate);
        }
        self.dt
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.workdate)
            .find(|w| !w.is_empty())
    }
}

/// Blocking HTTP client for the warehouse backend.
pub struct HttpWarehouseApi {
    client: Client,
    base_url: String,
}

impl HttpWarehouseApi {
    /// Create a client for the given base URL.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ApiError::Unreachable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(
            config.api_base_url.clone(),
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .map_err(|e| {
                tracing::warn!(path, "Request failed: {}", e);
                ApiError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(path, status = status.as_u16(), "API call");

        let text = response
            .text()
            .map_err(|e| ApiError::Unreachable(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(path, "Malformed response: {}", e);
            ApiError::Decode(e.to_string())
        })
    }

    fn rows<B, T>(&self, path: &str, body: &B) -> Result<Vec<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post::<B, Rows<T>>(path, body).map(Rows::into_vec)
    }
}

/// Message to show for a failed request: the JSON `message` field if the
/// body has one, otherwise the (shortened) raw body.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<MessageBody>(body) {
        if !parsed.message.is_empty() {
            return parsed.message;
        }
    }
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}...", &trimmed[..end]),
        None => trimmed.to_string(),
    }
}

impl WarehouseApi for HttpWarehouseApi {
    fn class_list(&self, factory_code: &str) -> Result<Vec<ClassItem>, ApiError> {
        self.rows(CLASS_LIST_PATH, &json!({ "factoryCode": factory_code }))
    }

    fn user_info(&self, factory_code: &str, user_code: &str) -> Result<Vec<UserInfo>, ApiError> {
        self.rows(
            USER_INFO_PATH,
            &json!({ "factoryCode": factory_code, "userCode": user_code }),
        )
    }

    fn all_warehouses(
        &self,
        factory_code: &str,
        user_code: &str,
    ) -> Result<Vec<WarehouseItem>, ApiError> {
        self.rows(
            ALL_WAREHOUSES_PATH,
            &json!({ "factoryCode": factory_code, "userCode": user_code }),
        )
    }

    fn ware_info(
        &self,
        factory_code: &str,
        ware_house_code: &str,
    ) -> Result<Vec<WarehouseInfo>, ApiError> {
        self.rows(
            WARE_INFO_PATH,
            &json!({ "factoryCode": factory_code, "wareHouseCode": ware_house_code }),
        )
    }

    fn check_warehouse(
        &self,
        factory_code: &str,
        ware_house_code: &str,
    ) -> Result<LicenseStatus, ApiError> {
        self.post(
            CHECK_WAREHOUSE_PATH,
            &json!({ "factoryCode": factory_code, "wareHouseCode": ware_house_code }),
        )
    }

    fn workdate(
        &self,
        factory_code: &str,
        ware_house_code: &str,
    ) -> Result<Option<String>, ApiError> {
        self.post::<_, WorkdateBody>(
            WORKDATE_PATH,
            &json!({ "factoryCode": factory_code, "wareHouseCode": ware_house_code }),
        )
        .map(WorkdateBody::into_workdate)
    }

    fn in_barcode_check(&self, request: &BarcodeCheckRequest) -> Result<Vec<BoxRecord>, ApiError> {
        self.rows(BARCODE_CHECK_PATH, request)
    }

    fn in_pallet_insert(&self, request: &PalletInsertRequest) -> Result<String, ApiError> {
        self.post::<_, MessageBody>(PALLET_INSERT_PATH, request)
            .map(|body| body.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> HttpWarehouseApi {
        HttpWarehouseApi::new(server.url(), Duration::from_secs(5), Duration::from_secs(2))
            .expect("Should build client")
    }

    #[test]
    fn test_class_list_posts_factory_code() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", CLASS_LIST_PATH)
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "factoryCode": "001" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"dt":[{"classesCode":"A","classesName":"Day"},{"classesName":"Night"}]}"#)
            .create();

        let classes = client_for(&server).class_list("001").expect("Should succeed");

        mock.assert();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0], ClassItem::new("A", "Day"));
        assert_eq!(classes[1].classes_name, "Night");
        assert_eq!(classes[1].classes_code, "");
    }

    #[test]
    fn test_missing_dt_is_empty() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", USER_INFO_PATH)
            .with_status(200)
            .with_body(r#"{"dt":null}"#)
            .create();

        let users = client_for(&server).user_info("001", "ghost").expect("Should succeed");
        assert!(users.is_empty());
    }

    #[test]
    fn test_absent_dt_is_empty() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", CLASS_LIST_PATH)
            .with_status(200)
            .with_body(r#"{"message":"no shifts"}"#)
            .create();

        let classes = client_for(&server).class_list("001").expect("Should succeed");
        assert!(classes.is_empty());
    }

    #[test]
    fn test_user_info_carries_password() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", USER_INFO_PATH)
            .match_body(Matcher::Json(json!({ "factoryCode": "001", "userCode": "admin" })))
            .with_status(200)
            .with_body(r#"{"dt":[{"userName":"Admin","roleCode":"R1","passwordInput":"1234"}]}"#)
            .create();

        let users = client_for(&server).user_info("001", "admin").expect("Should succeed");
        assert_eq!(users.len(), 1);
        assert!(users[0].password_matches("1234"));
        assert_eq!(users[0].role_code, "R1");
    }

    #[test]
    fn test_license_refusal_carries_server_message() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", CHECK_WAREHOUSE_PATH)
            .with_status(403)
            .with_body(r#"{"message":"License expired"}"#)
            .create();

        let err = client_for(&server)
            .check_warehouse("001", "W01")
            .expect_err("Should fail");
        assert_eq!(
            err,
            ApiError::Status {
                status: 403,
                message: "License expired".to_string()
            }
        );
        assert_eq!(err.server_message(), Some("License expired"));
    }

    #[test]
    fn test_plain_text_error_body() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", WARE_INFO_PATH)
            .with_status(500)
            .with_body("Internal Server Error")
            .create();

        let err = client_for(&server).ware_info("001", "W01").expect_err("Should fail");
        assert_eq!(err.server_message(), Some("Internal Server Error"));
    }

    #[test]
    fn test_workdate_scalar_and_rows() {
        let mut server = Server::new();
        let _scalar = server
            .mock("POST", WORKDATE_PATH)
            .match_body(Matcher::PartialJson(json!({ "wareHouseCode": "W01" })))
            .with_status(200)
            .with_body(r#"{"workdate":"2025-08-18"}"#)
            .create();
        let _rows = server
            .mock("POST", WORKDATE_PATH)
            .match_body(Matcher::PartialJson(json!({ "wareHouseCode": "W02" })))
            .with_status(200)
            .with_body(r#"{"dt":[{"workDate":"2025-08-19"}]}"#)
            .create();
        let _none = server
            .mock("POST", WORKDATE_PATH)
            .match_body(Matcher::PartialJson(json!({ "wareHouseCode": "W03" })))
            .with_status(200)
            .with_body(r#"{"dt":[]}"#)
            .create();

        let api = client_for(&server);
        assert_eq!(api.workdate("001", "W01").expect("ok").as_deref(), Some("2025-08-18"));
        assert_eq!(api.workdate("001", "W02").expect("ok").as_deref(), Some("2025-08-19"));
        assert_eq!(api.workdate("001", "W03").expect("ok"), None);
    }

    #[test]
    fn test_barcode_check_and_insert_bodies() {
        let mut server = Server::new();
        let check = server
            .mock("POST", BARCODE_CHECK_PATH)
            .match_body(Matcher::Json(json!({
                "factoryCode": "001",
                "wareHouseCode": "W01",
                "userCode": "admin",
                "barcode": "C4554402"
            })))
            .with_status(200)
            .with_body(
                r#"{"dt":[{"boxCode":"C4554402","model":"SKU-4402","qty":48,"palletCode":"PLT-77291",
                    "snItems":[{"sn":"SN-9901","imei1":"358291002231","imei2":"358291002232"}]}]}"#,
            )
            .create();
        let insert = server
            .mock("POST", PALLET_INSERT_PATH)
            .match_body(Matcher::Json(json!({
                "factoryCode": "001",
                "wareHouseCode": "W01",
                "classCode": "A",
                "userCode": "admin",
                "workdate": "2025-08-18",
                "palletCode": "PLT-77291",
                "boxCode": "C4554402",
                "qty": 48
            })))
            .with_status(200)
            .with_body(r#"{"message":"Inserted"}"#)
            .create();

        let api = client_for(&server);
        let boxes = api
            .in_barcode_check(&BarcodeCheckRequest {
                factory_code: "001".into(),
                ware_house_code: "W01".into(),
                user_code: "admin".into(),
                barcode: "C4554402".into(),
            })
            .expect("Should succeed");
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].sn_items.len(), 1);

        let message = api
            .in_pallet_insert(&PalletInsertRequest {
                factory_code: "001".into(),
                ware_house_code: "W01".into(),
                class_code: "A".into(),
                user_code: "admin".into(),
                workdate: "2025-08-18".into(),
                pallet_code: boxes[0].pallet_code.clone(),
                box_code: boxes[0].box_code.clone(),
                qty: boxes[0].qty,
            })
            .expect("Should succeed");

        check.assert();
        insert.assert();
        assert_eq!(message, "Inserted");
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", ALL_WAREHOUSES_PATH)
            .with_status(200)
            .with_body("<html>oops</html>")
            .create();

        let err = client_for(&server)
            .all_warehouses("001", "admin")
            .expect_err("Should fail");
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_unreachable_server() {
        let api = HttpWarehouseApi::new(
            "http://127.0.0.1:1/",
            Duration::from_secs(2),
            Duration::from_secs(1),
        )
        .expect("Should build client");
        assert_eq!(api.base_url, "http://127.0.0.1:1");

        let err = api.class_list("001").expect_err("Should fail");
        assert!(matches!(err, ApiError::Unreachable(_)));
    }

    #[test]
    fn test_error_message_truncates_long_bodies() {
        let body = "x".repeat(500);
        let message = error_message(&body);
        assert!(message.ends_with("..."));
        assert_eq!(message.len(), MAX_ERROR_BODY + 3);
    }
}

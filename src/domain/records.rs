//! Reference records returned by the backend lookups.
//!
//! The backend is loose about types: codes may arrive as numbers and
//! optional columns as `null`. The `lenient` helpers normalize both.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use zeroize::Zeroizing;

/// A shift class (`/api/getClassList`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClassItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub classes_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub classes_name: String,
}

impl ClassItem {
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            classes_code: code.into(),
            classes_name: name.into(),
        }
    }
}

/// Operator record (`/api/getUserInfo`).
///
/// The backend returns the expected password and the client compares it
/// locally. It is kept in a zeroizing buffer and never shown by `Debug`.
#[derive(Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub role_code: String,
    #[serde(default, deserialize_with = "lenient::secret")]
    password_input: Zeroizing<String>,
}

impl UserInfo {
    #[must_use]
    pub fn new(
        user_code: impl Into<String>,
        user_name: impl Into<String>,
        role_code: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            user_code: user_code.into(),
            user_name: user_name.into(),
            role_code: role_code.into(),
            password_input: Zeroizing::new(password.into()),
        }
    }

    /// Compare a typed password against the one the server returned.
    #[must_use]
    pub fn password_matches(&self, typed: &str) -> bool {
        self.password_input.as_str() == typed
    }
}

impl fmt::Debug for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInfo")
            .field("user_code", &self.user_code)
            .field("user_name", &self.user_name)
            .field("role_code", &self.role_code)
            .field("password_input", &"<redacted>")
            .finish()
    }
}

/// Entry of the warehouse picker (`/api/getAllWareHouses`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub ware_house_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ware_house_name: String,
}

impl WarehouseItem {
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ware_house_code: code.into(),
            ware_house_name: name.into(),
        }
    }
}

/// Warehouse detail (`/api/getWareInfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub ware_house_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ware_house_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ware_house_type: String,
}

/// Result of the license check (`/api/checkWarehouse`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LicenseStatus {
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: String,
}

pub(crate) mod lenient {
    use super::*;
    use serde::de::Error as _;
    use serde_json::Value;

    /// String column that may be `null`, missing or numeric.
    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => other.to_string(),
        })
    }

    /// Like `string`, but kept byte for byte: passwords are compared exactly.
    pub fn secret<'de, D>(deserializer: D) -> Result<Zeroizing<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Zeroizing::new(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        }))
    }

    /// Quantity column: a non-negative integer or a numeric string.
    pub fn quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| {
                    // 12.0 is fine, 12.5 is not
                    n.as_f64()
                        .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= f64::from(u32::MAX))
                        .map(|f| f as u64)
                })
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| D::Error::custom(format!("invalid quantity {n}"))),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(0),
            Some(Value::String(s)) => s
                .trim()
                .parse::<u32>()
                .map_err(|_| D::Error::custom(format!("invalid quantity {s:?}"))),
            Some(other) => Err(D::Error::custom(format!("invalid quantity {other}"))),
        }
    }
}

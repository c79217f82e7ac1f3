//! Login service: the chained operator sign-in.
//!
//! The login screen drives three interactions:
//! 1. user code entered: look the user up
//! 2. password entered: compare, then list the user's warehouses
//! 3. warehouse chosen: warehouse info, license, user re-check, work date
//!
//! Each request runs only after the previous one succeeded. The first
//! failure stops the sequence and is returned as the alert to show.

use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::domain::{ClassItem, SessionContext, UserInfo, WarehouseItem};
use crate::ports::WarehouseApi;
use crate::IwmError;

/// Request issued during the final login sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    WarehouseInfo,
    License,
    User,
    Workdate,
}

impl LoginStep {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::WarehouseInfo => "Checking warehouse",
            Self::License => "Verifying license",
            Self::User => "Checking user",
            Self::Workdate => "Fetching work date",
        }
    }
}

/// What the operator entered on the login form.
#[derive(Clone)]
pub struct LoginRequest {
    pub user_code: String,
    pub password: Zeroizing<String>,
    pub class: Option<ClassItem>,
    pub warehouse: Option<WarehouseItem>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_code", &self.user_code)
            .field("password", &"<redacted>")
            .field("class", &self.class)
            .field("warehouse", &self.warehouse)
            .finish()
    }
}

/// Everything a successful login learned about the session.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserInfo,
    pub warehouse: WarehouseItem,
    pub ware_type: String,
    pub class: Option<ClassItem>,
    pub workdate: String,
    pub license_message: String,
}

impl LoginOutcome {
    /// Write the login results into the session.
    pub fn apply_to(&self, session: &mut SessionContext) {
        session.user_code = self.user.user_code.clone();
        session.user_name = self.user.user_name.clone();
        session.role_code = self.user.role_code.clone();
        session.ware_code = self.warehouse.ware_house_code.clone();
        session.ware_name = self.warehouse.ware_house_name.clone();
        session.ware_type = self.ware_type.clone();
        if let Some(class) = &self.class {
            session.class_code = class.classes_code.clone();
            session.class_name = class.classes_name.clone();
        }
        session.workdate = self.workdate.clone();
    }
}

/// Service for the login sequence.
pub struct LoginService<A>
where
    A: WarehouseApi + ?Sized,
{
    api: Arc<A>,
    factory_code: String,
}

impl<A> LoginService<A>
where
    A: WarehouseApi + ?Sized,
{
    /// Create a new login service.
    pub fn new(api: Arc<A>, factory_code: impl Into<String>) -> Self {
        Self {
            api,
            factory_code: factory_code.into(),
        }
    }

    /// Load the class picker options.
    ///
    /// # Errors
    /// Returns `ClassesUnavailable` if the request fails.
    pub fn load_classes(&self) -> Result<Vec<ClassItem>, IwmError> {
        let classes = self.api.class_list(&self.factory_code).map_err(|e| {
            tracing::warn!("Failed to load classes: {}", e);
            IwmError::ClassesUnavailable(e)
        })?;
        tracing::debug!(count = classes.len(), "Loaded classes");
        Ok(classes)
    }

    /// Look up the user typed in the user code field.
    ///
    /// # Errors
    /// `UserCodeRequired` for an empty code, `NoPermission` for an unknown
    /// or rejected user, `ServerUnreachable` if the server cannot be reached.
    pub fn check_user(&self, user_code: &str) -> Result<UserInfo, IwmError> {
        let user_code = user_code.trim();
        if user_code.is_empty() {
            return Err(IwmError::UserCodeRequired);
        }

        let rows = match self.api.user_info(&self.factory_code, user_code) {
            Ok(rows) => rows,
            Err(e) if e.is_status() => {
                tracing::info!(user_code, "User lookup rejected: {}", e);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("User lookup failed: {}", e);
                return Err(IwmError::ServerUnreachable(e));
            }
        };

        let mut user = rows.into_iter().next().ok_or_else(|| {
            tracing::info!(user_code, "User has no permission to operate");
            IwmError::NoPermission
        })?;
        if user.user_code.is_empty() {
            user.user_code = user_code.to_string();
        }
        Ok(user)
    }

    /// Compare the typed password, then list the user's warehouses.
    ///
    /// # Errors
    /// `PasswordMismatch` on a wrong password, `WarehousesUnavailable` if
    /// the warehouse request fails.
    pub fn check_password(
        &self,
        user: &UserInfo,
        password: &str,
    ) -> Result<Vec<WarehouseItem>, IwmError> {
        if !user.password_matches(password) {
            tracing::info!(user_code = %user.user_code, "Password rejected");
            return Err(IwmError::PasswordMismatch);
        }

        self.api
            .all_warehouses(&self.factory_code, &user.user_code)
            .map_err(|e| {
                tracing::warn!("Failed to load warehouses: {}", e);
                IwmError::WarehousesUnavailable(e)
            })
    }

    /// Run the final login sequence.
    ///
    /// `on_step` is called before each request is issued.
    ///
    /// # Errors
    /// Returns the first failing step's error; later steps are not run.
    pub fn login<F>(&self, request: &LoginRequest, mut on_step: F) -> Result<LoginOutcome, IwmError>
    where
        F: FnMut(LoginStep),
    {
        let warehouse = request
            .warehouse
            .clone()
            .ok_or(IwmError::WarehouseRequired)?;
        let code = warehouse.ware_house_code.as_str();
        tracing::info!(
            ware_house_code = code,
            ware_house_name = %warehouse.ware_house_name,
            "Logging in"
        );

        on_step(LoginStep::WarehouseInfo);
        let info = match self.api.ware_info(&self.factory_code, code) {
            Ok(rows) => rows.into_iter().next().ok_or(IwmError::WarehouseNotFound)?,
            Err(e) if e.is_status() => return Err(IwmError::WarehouseNotFound),
            Err(e) => return Err(IwmError::RequestFailed(e)),
        };
        tracing::debug!(ware_house_type = %info.ware_house_type, "Warehouse type");

        on_step(LoginStep::License);
        let license = match self.api.check_warehouse(&self.factory_code, code) {
            Ok(status) => status,
            Err(e) if e.is_status() => {
                let message = e.server_message().unwrap_or("License check failed").to_string();
                tracing::warn!(ware_house_code = code, "License refused: {}", message);
                return Err(IwmError::License(message));
            }
            Err(e) => return Err(IwmError::RequestFailed(e)),
        };

        on_step(LoginStep::User);
        let user = match self.api.user_info(&self.factory_code, request.user_code.trim()) {
            Ok(rows) => rows.into_iter().next().ok_or(IwmError::NoPermission)?,
            Err(e) if e.is_status() => return Err(IwmError::NoPermission),
            Err(e) => return Err(IwmError::RequestFailed(e)),
        };
        if !user.password_matches(&request.password) {
            return Err(IwmError::PasswordMismatch);
        }

        on_step(LoginStep::Workdate);
        let workdate = self
            .api
            .workdate(&self.factory_code, code)
            .map_err(IwmError::RequestFailed)?
            .filter(|w| !w.trim().is_empty())
            .ok_or(IwmError::WorkdateUnavailable)?;

        let mut user = user;
        if user.user_code.is_empty() {
            user.user_code = request.user_code.trim().to_string();
        }

        tracing::info!(ware_house_code = code, workdate = %workdate, "Login succeeded");

        Ok(LoginOutcome {
            user,
            warehouse,
            ware_type: info.ware_house_type,
            class: request.class.clone(),
            workdate,
            license_message: license.message,
        })
    }
}

//! Session context shared by every screen after login.

use crate::config::ClientConfig;

/// Flat key-value session state.
///
/// Created at startup from configuration, filled in by the login flow and
/// reset on logout. Screens past the login read it; only the login flow and
/// logout write it.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub factory_code: String,

    pub ware_code: String,
    pub ware_name: String,
    pub ware_type: String,

    pub class_code: String,
    pub class_name: String,

    pub group_code: String,
    pub group_name: String,

    pub user_code: String,
    pub user_name: String,
    pub role_code: String,

    pub workdate: String,

    pub ip_address: String,

    pub web_url: String,
    pub is_real_url: bool,
}

impl SessionContext {
    /// Build a fresh, logged-out session from configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            factory_code: config.factory_code.clone(),
            ip_address: config.device_ip.clone().unwrap_or_default(),
            web_url: config.web_service_url.clone(),
            is_real_url: config.is_real_url,
            ..Self::default()
        }
    }

    /// A session is usable once user, warehouse and workdate are known.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        !self.user_code.is_empty() && !self.ware_code.is_empty() && !self.workdate.is_empty()
    }

    /// Forget everything the login flow wrote.
    pub fn clear_login(&mut self) {
        self.ware_code.clear();
        self.ware_name.clear();
        self.ware_type.clear();
        self.class_code.clear();
        self.class_name.clear();
        self.group_code.clear();
        self.group_name.clear();
        self.user_code.clear();
        self.user_name.clear();
        self.role_code.clear();
        self.workdate.clear();
    }

    /// Name to greet the operator with; falls back to the user code.
    #[must_use]
    pub fn display_user(&self) -> &str {
        if self.user_name.is_empty() {
            &self.user_code
        } else {
            &self.user_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_logged_out() {
        let config = ClientConfig::default();
        let session = SessionContext::new(&config);

        assert_eq!(session.factory_code, "001");
        assert!(session.is_real_url);
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_clear_login_keeps_configured_fields() {
        let config = ClientConfig {
            device_ip: Some("10.0.0.7".to_string()),
            ..ClientConfig::default()
        };
        let mut session = SessionContext::new(&config);
        session.user_code = "admin".into();
        session.ware_code = "W01".into();
        session.workdate = "2025-08-18".into();
        assert!(session.is_logged_in());

        session.clear_login();

        assert!(!session.is_logged_in());
        assert_eq!(session.factory_code, "001");
        assert_eq!(session.ip_address, "10.0.0.7");
        assert!(session.user_code.is_empty());
    }

    #[test]
    fn test_display_user_falls_back_to_code() {
        let mut session = SessionContext::default();
        session.user_code = "u42".into();
        assert_eq!(session.display_user(), "u42");
        session.user_name = "Amina".into();
        assert_eq!(session.display_user(), "Amina");
    }
}

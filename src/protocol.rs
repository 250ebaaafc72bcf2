use crate::types::ServiceKind;

pub const DEFAULT_BASE_URL: &str = "https://accloud.intesis.com/";

pub const LOGIN_PATH: &str = "login";
pub const HEADERS_PATH: &str = "panel/headers";
pub const SET_VALUE_PATH: &str = "device/setVal";

pub const FORM_USERNAME: &str = "signin[username]";
pub const FORM_PASSWORD: &str = "signin[password]";
pub const FORM_CSRF_TOKEN: &str = "signin[_csrf_token]";

/// Marker that identifies the login page when an authenticated page was expected.
/// Panel fragments carry no `<title>`; the full login document does.
pub const LOGIN_PAGE_SIGNATURE: &str = "<title>";

/// Swing enabled on either vane.
pub const VANE_SWING: i32 = 10;

pub fn vista_path(device_id: &str) -> String {
    format!("panel/vista?id={device_id}")
}

/// Ensure the base URL ends in exactly one `/` so paths can be appended.
pub fn normalize_base_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

pub fn is_login_page(body: &str) -> bool {
    body.contains(LOGIN_PAGE_SIGNATURE)
}

/// Vendor service ids (`uid` on the set-value endpoint).
pub fn service_id(kind: ServiceKind) -> Option<u32> {
    match kind {
        ServiceKind::Power => Some(1),
        ServiceKind::UserMode => Some(2),
        ServiceKind::FanSpeed => Some(4),
        ServiceKind::VerticalVanes => Some(5),
        ServiceKind::HorizontalVanes => Some(6),
        ServiceKind::SetpointTemp => Some(9),
        ServiceKind::CurrentTemp | ServiceKind::SwingMode => None,
    }
}

/// One write against the set-value endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValue {
    pub device_id: String,
    pub service_id: u32,
    pub value: i32,
    pub user_id: String,
}

impl SetValue {
    pub fn query(&self) -> [(&'static str, String); 4] {
        [
            ("id", self.device_id.clone()),
            ("uid", self.service_id.to_string()),
            ("value", self.value.to_string()),
            ("userId", self.user_id.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(normalize_base_url("https://x.test"), "https://x.test/");
        assert_eq!(normalize_base_url("https://x.test/"), "https://x.test/");
    }

    #[test]
    fn vista_path_carries_device_id() {
        assert_eq!(vista_path("1234"), "panel/vista?id=1234");
    }

    #[test]
    fn login_signature() {
        assert!(is_login_page("<html><head><title>Login</title>"));
        assert!(!is_login_page(r#"<div id="deviceHeader_1">"#));
    }

    #[test]
    fn service_ids() {
        assert_eq!(service_id(ServiceKind::Power), Some(1));
        assert_eq!(service_id(ServiceKind::HorizontalVanes), Some(6));
        assert_eq!(service_id(ServiceKind::VerticalVanes), Some(5));
        assert_eq!(service_id(ServiceKind::CurrentTemp), None);
    }

    #[test]
    fn set_value_query_order() {
        let req = SetValue {
            device_id: "77".into(),
            service_id: 9,
            value: 215,
            user_id: "42".into(),
        };
        let q = req.query();
        assert_eq!(q[0], ("id", "77".to_string()));
        assert_eq!(q[1], ("uid", "9".to_string()));
        assert_eq!(q[2], ("value", "215".to_string()));
        assert_eq!(q[3], ("userId", "42".to_string()));
    }
}

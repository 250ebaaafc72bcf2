use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;
use tracing::{debug, info, trace, warn};

use crate::extract;
use crate::logger::MessageLogger;
use crate::protocol::{
    self, FORM_CSRF_TOKEN, FORM_PASSWORD, FORM_USERNAME, LOGIN_PATH, SET_VALUE_PATH, SetValue,
};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
struct SessionState {
    logged_in: bool,
    last_login: Option<DateTime<Utc>>,
}

/// Cookie-authenticated session against the web panel.
///
/// The HTTP client must keep a cookie store and must not follow redirects:
/// a successful login answers with a 3xx, and an expired session redirects
/// panel pages back to the login form.
pub struct Session {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    state: Mutex<SessionState>,
    logger: Mutex<Option<MessageLogger>>,
}

impl Session {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: String,
        username: String,
        password: String,
        logger: Option<MessageLogger>,
    ) -> Self {
        Self {
            http,
            base_url,
            username,
            password,
            state: Mutex::new(SessionState::default()),
            logger: Mutex::new(logger),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.lock().logged_in
    }

    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_login
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Drop back to logged-out; the next cycle logs in again.
    pub fn invalidate(&self) {
        self.state.lock().logged_in = false;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn log_request(&self, method: &str, path: &str) {
        if let Some(ref mut logger) = *self.logger.lock() {
            logger.log_request(method, path);
        }
    }

    fn log_response(&self, method: &str, path: &str, status: StatusCode, body: &str) {
        if let Some(ref mut logger) = *self.logger.lock() {
            logger.log_response(method, path, status.as_u16(), body);
        }
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, String)> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        self.log_request("GET", path);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        trace!(path, status = status.as_u16(), len = body.len(), "page received");
        self.log_response("GET", path, status, &body);
        Ok((status, body))
    }

    /// GET a page without session checks. Non-2xx is an error.
    pub async fn fetch(&self, path: &str) -> Result<String> {
        let (status, body) = self.get(path).await?;
        if !status.is_success() {
            return Err(Error::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(body)
    }

    /// GET a page that requires a session.
    ///
    /// A redirect or a body carrying the login-page signature means the
    /// session is gone: state flips to logged-out and `SessionExpired` is
    /// returned so the caller can log in and retry. Any other failure also
    /// leaves the session logged-out.
    pub async fn fetch_authenticated(&self, path: &str) -> Result<String> {
        let result = match self.get(path).await {
            Ok((status, _)) if status.is_redirection() => Err(Error::SessionExpired),
            Ok((status, body)) if status.is_success() => {
                if protocol::is_login_page(&body) {
                    Err(Error::SessionExpired)
                } else {
                    Ok(body)
                }
            }
            Ok((status, _)) => Err(Error::Status {
                path: path.to_string(),
                status: status.as_u16(),
            }),
            Err(e) => Err(e),
        };
        if let Err(ref e) = result {
            debug!(path, error = %e, "authenticated fetch failed, session invalidated");
            self.invalidate();
        }
        result
    }

    /// Log in: fetch the form, pull the CSRF token, post credentials.
    ///
    /// Not retried here. On failure the session stays logged-out.
    pub async fn login(&self) -> Result<()> {
        debug!(base_url = %self.base_url, "logging in");
        let result = self.submit_login().await;
        let mut state = self.state.lock();
        match result {
            Ok(()) => {
                state.logged_in = true;
                state.last_login = Some(Utc::now());
                info!("login OK");
            }
            Err(ref e) => {
                state.logged_in = false;
                warn!(error = %e, "login failed");
            }
        }
        result
    }

    async fn submit_login(&self) -> Result<()> {
        let page = self.fetch(LOGIN_PATH).await?;
        let token = extract::csrf_token(&page)
            .ok_or_else(|| Error::Auth("no CSRF token on login page".to_string()))?;

        let form = [
            (FORM_USERNAME, self.username.as_str()),
            (FORM_PASSWORD, self.password.as_str()),
            (FORM_CSRF_TOKEN, token),
        ];
        self.log_request("POST", LOGIN_PATH);
        let resp = self.http.post(self.url(LOGIN_PATH)).form(&form).send().await?;
        let status = resp.status();
        self.log_response("POST", LOGIN_PATH, status, "");

        if status.is_redirection() {
            Ok(())
        } else {
            Err(Error::Auth(format!("credentials rejected (HTTP {status})")))
        }
    }

    /// POST one value to the device. Returns the endpoint's acknowledgement body.
    pub async fn set_value(&self, req: &SetValue) -> Result<String> {
        if req.user_id.is_empty() {
            return Err(Error::Write("no user id supplied".to_string()));
        }
        if req.device_id.is_empty() {
            return Err(Error::Write("no device id supplied".to_string()));
        }
        if req.service_id == 0 {
            return Err(Error::Write("no service id supplied".to_string()));
        }

        debug!(
            device_id = %req.device_id,
            uid = req.service_id,
            value = req.value,
            "setting value"
        );
        self.log_request("POST", SET_VALUE_PATH);
        let resp = self
            .http
            .post(self.url(SET_VALUE_PATH))
            .header("X-Requested-With", "XMLHttpRequest")
            .query(&req.query()[..])
            .send()
            .await
            .map_err(|e| Error::Write(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Write(e.to_string()))?;
        self.log_response("POST", SET_VALUE_PATH, status, &body);

        if status.is_redirection() {
            self.invalidate();
            return Err(Error::Write("session expired".to_string()));
        }
        if !status.is_success() {
            return Err(Error::Write(format!("HTTP {status}")));
        }
        if body.trim().is_empty() {
            return Err(Error::Write("empty acknowledgement".to_string()));
        }
        trace!(body = %body, "set value acknowledged");
        Ok(body)
    }
}

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::types::ServiceKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP {status} from {path}")]
    Status { path: String, status: u16 },

    /// Login failed: no CSRF token on the login page, or credentials rejected.
    #[error("login failed: {0}")]
    Auth(String),

    /// An authenticated page came back as the login page.
    #[error("session expired")]
    SessionExpired,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("invalid value for {kind}: {reason}")]
    InvalidValue { kind: ServiceKind, reason: String },

    #[error("{0} not available on this device")]
    Unavailable(ServiceKind),

    #[error("refresh timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("refresh task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Failure of a refresh pass that several callers waited on.
    #[error(transparent)]
    Shared(Arc<Error>),
}

impl Error {
    /// True for errors after which a fresh login may help.
    pub fn is_auth(&self) -> bool {
        matches!(self.root(), Error::Auth(_) | Error::SessionExpired)
    }

    /// The underlying error, looking through `Shared`.
    pub fn root(&self) -> &Error {
        match self {
            Error::Shared(inner) => inner.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

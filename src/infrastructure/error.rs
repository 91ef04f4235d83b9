use crate::domain::interval::InvalidInterval;
use thiserror::Error;

/// Failure of a single API call. Returned as a value, callers branch on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    #[error("network error: {0}")]
    Network(String),
    #[error("http error: status {status}")]
    Http { status: u16 },
    #[error("unauthorized: session could not be refreshed")]
    Unauthorized,
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl ApiFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            Self::Unauthorized => Some(401),
            Self::Network(_) | Self::InvalidPayload(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Session storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Api(#[from] ApiFailure),
    #[error("Login failed with status: {status}")]
    LoginFailed { status: u16 },
    #[error("Failed to create user: {status}")]
    RegistrationFailed { status: u16 },
    #[error(transparent)]
    InvalidInterval(#[from] InvalidInterval),
}

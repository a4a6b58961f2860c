use std::{fmt, path::PathBuf};

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised while talking to Google or touching local state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{0}")]
    Auth(String),

    /// A response with a non-success status.
    #[error("Google API returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("could not access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The closed set of failure classes reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    NotFound,
    Unknown,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_) => ErrorKind::Network,
            Error::Auth(_) => ErrorKind::Auth,
            Error::Status { status, .. } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Auth,
                StatusCode::NOT_FOUND => ErrorKind::NotFound,
                _ => ErrorKind::Unknown,
            },
            Error::Io { .. } | Error::Json { .. } => ErrorKind::Unknown,
        }
    }

    /// True when the server answered, but not with success.
    pub fn is_status(&self) -> bool {
        matches!(self, Error::Status { .. })
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::NotFound => "not found",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

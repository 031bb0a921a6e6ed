use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error! status: {status}")]
    HttpStatus { status: u16, url: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl PlatformError {
    /// HTTP status carried by the error, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => PlatformError::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => PlatformError::NetworkError(err.to_string()),
        }
    }
}

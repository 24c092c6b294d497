use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("Usage: {0}")]
    Usage(String),

    #[error("Missing credentials: environment variable {0} is not set")]
    MissingCredentials(&'static str),

    #[error("{method} {url} failed with status: {status}. Response: {body}")]
    Http {
        method: &'static str,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("BrowserStack reported an error: {0}")]
    Remote(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CleanupError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CleanupError::Usage(_) => 2,
            _ => 1,
        }
    }
}

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Session setup error: {0}")]
    SessionSetup(String),

    #[error("Navigation timed out after {0:?}")]
    NavigationTimeout(Duration),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("No listings extracted from {0}")]
    EmptyExtraction(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether the acquisition retry loop may consume this error and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::SessionSetup(_)
                | AppError::NavigationTimeout(_)
                | AppError::Navigation(_)
                | AppError::Browser(_)
                | AppError::EmptyExtraction(_)
        )
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquisition_errors_are_retryable() {
        assert!(AppError::SessionSetup("no chrome".into()).is_retryable());
        assert!(AppError::NavigationTimeout(Duration::from_secs(30)).is_retryable());
        assert!(AppError::EmptyExtraction("https://x".into()).is_retryable());
    }

    #[test]
    fn export_and_config_errors_are_not_retryable() {
        assert!(!AppError::Export("disk full".into()).is_retryable());
        assert!(!AppError::Config("bad".into()).is_retryable());
    }
}

//! Error types for guideshot
//!
//! This module provides the error type hierarchy using `thiserror`,
//! covering browser control, navigation, capture, session, and
//! catalogue lookup failures.

use thiserror::Error;

/// The main error type for guideshot operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser lifecycle errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Capture errors
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Session (authentication / tenant) errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Batch catalogue errors
    #[error("Catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Capture errors (screenshot serialization and artifact writes)
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    /// Artifact write failed
    #[error("Failed to write artifact {path}: {source}")]
    WriteFailed {
        /// Destination path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Session errors: authentication and tenant context
#[derive(Error, Debug)]
pub enum SessionError {
    /// Login form interaction failed
    #[error("Login form interaction failed: {0}")]
    FormFailed(String),

    /// Post-login redirect did not happen in time
    #[error("Post-login redirect to {expected} not observed within {timeout_ms}ms")]
    RedirectTimeout {
        /// Path fragment the redirect was expected to contain
        expected: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },
}

/// Batch catalogue errors
#[derive(Error, Debug)]
pub enum CatalogueError {
    /// Requested batch does not exist
    #[error("Unknown batch: {0}")]
    UnknownBatch(String),
}

/// Result type alias for guideshot operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_catalogue_error() {
        let err = CatalogueError::UnknownBatch("batch99".to_string());
        assert_eq!(err.to_string(), "Unknown batch: batch99");
    }

    #[test]
    fn test_session_redirect_timeout() {
        let err = SessionError::RedirectTimeout {
            expected: "/dashboard/".to_string(),
            timeout_ms: 15000,
        };
        assert!(err.to_string().contains("/dashboard/"));
        assert!(err.to_string().contains("15000"));
    }

    #[test]
    fn test_navigation_timeout() {
        let err = NavigationError::Timeout(30000);
        assert!(err.to_string().contains("30000ms"));
    }
}

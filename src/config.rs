//! Run configuration
//!
//! All previously hard-wired settings (target URL, credentials, output
//! directory, masking pools) live in one [`Config`] passed into the runner,
//! so the target environment and masking data can be swapped without code
//! edits. Loadable from a JSON file, overridable via the builder.

use crate::error::{Error, Result};
use crate::masking::MaskingProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Credentials submitted through the target application's login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: "nelsonbwogora23136@gmail.com".to_string(),
            password: "123456".to_string(),
        }
    }
}

/// Configuration for a capture run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the running target application
    pub base_url: String,
    /// Directory receiving the PNG artifacts, created on demand
    pub output_dir: PathBuf,
    /// Viewport width (default: 1440)
    pub width: u32,
    /// Viewport height (default: 900)
    pub height: u32,
    /// Run the browser headless (default: true)
    pub headless: bool,
    /// Path to a Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Login credentials
    pub credentials: Credentials,
    /// Route of the login form
    pub login_route: String,
    /// Path fragment the post-login redirect must contain
    pub post_login_path: String,
    /// Hard timeout for the post-login redirect in milliseconds
    pub login_timeout_ms: u64,
    /// Navigation timeout in milliseconds (default: 30000)
    pub nav_timeout_ms: u64,
    /// Best-effort element wait timeout in milliseconds (default: 10000)
    pub wait_timeout_ms: u64,
    /// Best-effort network quiescence timeout in milliseconds
    pub idle_timeout_ms: u64,
    /// Default settle time after navigation in milliseconds (default: 1500)
    pub default_delay_ms: u64,
    /// Masking pools and sentinels
    pub masking: MaskingProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4200".to_string(),
            output_dir: PathBuf::from("src/assets/guides"),
            width: 1440,
            height: 900,
            headless: true,
            chrome_path: None,
            credentials: Credentials::default(),
            login_route: "/sessions/signin4".to_string(),
            post_login_path: "/dashboard/".to_string(),
            login_timeout_ms: 15_000,
            nav_timeout_ms: 30_000,
            wait_timeout_ms: 10_000,
            idle_timeout_ms: 10_000,
            default_delay_ms: 1_500,
            masking: MaskingProfile::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from a JSON file.
    ///
    /// Missing fields fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

/// Builder for [`Config`]
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the target application base URL
    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the artifact output directory
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set login credentials
    pub fn credentials<S: Into<String>>(mut self, email: S, password: S) -> Self {
        self.config.credentials = Credentials {
            email: email.into(),
            password: password.into(),
        };
        self
    }

    /// Set the masking profile
    pub fn masking(mut self, profile: MaskingProfile) -> Self {
        self.config.masking = profile;
        self
    }

    /// Build the config
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:4200");
        assert_eq!(config.width, 1440);
        assert_eq!(config.height, 900);
        assert!(config.headless);
        assert_eq!(config.default_delay_ms, 1500);
        assert_eq!(config.login_timeout_ms, 15000);
        assert_eq!(config.login_route, "/sessions/signin4");
        assert_eq!(config.post_login_path, "/dashboard/");
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .base_url("http://staging.internal:8080")
            .output_dir("/tmp/shots")
            .viewport(1920, 1080)
            .headless(false)
            .credentials("ops@example.com", "hunter2")
            .build();

        assert_eq!(config.base_url, "http://staging.internal:8080");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/shots"));
        assert_eq!(config.width, 1920);
        assert!(!config.headless);
        assert_eq!(config.credentials.email, "ops@example.com");
    }

    #[test]
    fn test_config_partial_json() {
        let config: Config =
            serde_json::from_str(r#"{"base_url": "http://demo.local", "width": 1280}"#).unwrap();
        assert_eq!(config.base_url, "http://demo.local");
        assert_eq!(config.width, 1280);
        // Untouched fields keep their defaults
        assert_eq!(config.height, 900);
        assert_eq!(config.masking.identities.len(), 15);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.base_url, config.base_url);
        assert_eq!(back.output_dir, config.output_dir);
    }
}

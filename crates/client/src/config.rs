//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CARTWHEEL_PLATFORM` - Runtime target: `web`, `desktop`, or `android` (default: web)
//! - `CARTWHEEL_API_URL` - Backend base URL (default depends on the platform)
//! - `CARTWHEEL_REQUEST_TIMEOUT_SECS` - Per-request timeout, 1-120 (default: 10)
//! - `CARTWHEEL_STATE_DIR` - Device storage mirror directory (default: .cartwheel/device)
//! - `CARTWHEEL_BROWSER_STATE_DIR` - Optional browser storage mirror directory
//! - `CARTWHEEL_REFRESH_POLICY` - `any-failure` or `auth-rejection` (default: any-failure)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 120;
const DEFAULT_STATE_DIR: &str = ".cartwheel/device";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Runtime target the client is running on.
///
/// The Android emulator reaches the host machine through a loopback alias,
/// so the default backend address differs per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Web,
    Desktop,
    Android,
}

impl Platform {
    /// Default backend address for this target.
    #[must_use]
    pub const fn default_api_url(self) -> &'static str {
        match self {
            Self::Android => "http://10.0.2.2:8080",
            Self::Web | Self::Desktop => "http://localhost:8080",
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "desktop" => Ok(Self::Desktop),
            "android" => Ok(Self::Android),
            other => Err(format!("expected web, desktop, or android (got '{other}')")),
        }
    }
}

/// What a failed profile refresh does to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Any failure to fetch the profile ends the session, including timeouts
    /// and connection errors.
    #[default]
    AnyFailure,
    /// Only an explicit 401/403 from the backend ends the session; transient
    /// failures keep it.
    AuthRejection,
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any-failure" => Ok(Self::AnyFailure),
            "auth-rejection" => Ok(Self::AuthRejection),
            other => Err(format!(
                "expected any-failure or auth-rejection (got '{other}')"
            )),
        }
    }
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Runtime target
    pub platform: Platform,
    /// Backend base URL
    pub api_base_url: Url,
    /// Per-request timeout for backend calls
    pub request_timeout: Duration,
    /// Directory for the device storage mirror
    pub device_state_dir: PathBuf,
    /// Directory for the browser storage mirror, when one exists
    pub browser_state_dir: Option<PathBuf>,
    /// Session behavior on profile refresh failure
    pub refresh_policy: RefreshPolicy,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let platform = match lookup("CARTWHEEL_PLATFORM") {
            Some(raw) => parse_var("CARTWHEEL_PLATFORM", &raw)?,
            None => Platform::default(),
        };

        let raw_url = lookup("CARTWHEEL_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| platform.default_api_url().to_string());
        let api_base_url = parse_base_url(&raw_url)?;

        let timeout_secs = match lookup("CARTWHEEL_REQUEST_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let device_state_dir = lookup("CARTWHEEL_STATE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let browser_state_dir = lookup("CARTWHEEL_BROWSER_STATE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let refresh_policy = match lookup("CARTWHEEL_REFRESH_POLICY") {
            Some(raw) => parse_var("CARTWHEEL_REFRESH_POLICY", &raw)?,
            None => RefreshPolicy::default(),
        };

        Ok(Self {
            platform,
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            device_state_dir,
            browser_state_dir,
            refresh_policy,
        })
    }

    /// Configuration pointing at an explicit backend, with defaults elsewhere.
    #[must_use]
    pub fn for_base_url(api_base_url: Url) -> Self {
        Self {
            platform: Platform::default(),
            api_base_url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            device_state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            browser_state_dir: None,
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_var<T: FromStr<Err = String>>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("CARTWHEEL_API_URL".to_string(), msg);

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("URL must have a host".to_string()));
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    let invalid =
        |msg: String| ConfigError::InvalidEnvVar("CARTWHEEL_REQUEST_TIMEOUT_SECS".to_string(), msg);

    let secs = raw.trim().parse::<u64>().map_err(|e| invalid(e.to_string()))?;
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(invalid(format!(
            "must be between 1 and {MAX_TIMEOUT_SECS} seconds (got {secs})"
        )));
    }
    Ok(secs)
}

//! Configuration module for caredesk.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::validate_password;
use crate::{CaredeskError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Storage configuration.
///
/// File names are resolved relative to `data_dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// User records (JSON array).
    #[serde(default = "default_users_file")]
    pub users_file: String,
    /// Password-reset tokens (JSON object).
    #[serde(default = "default_resets_file")]
    pub resets_file: String,
    /// One-time codes (JSON object).
    #[serde(default = "default_otps_file")]
    pub otps_file: String,
    /// Room reservations (JSON object).
    #[serde(default = "default_reservations_file")]
    pub reservations_file: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_users_file() -> String {
    "users.json".to_string()
}

fn default_resets_file() -> String {
    "resets.json".to_string()
}

fn default_otps_file() -> String {
    "otps.json".to_string()
}

fn default_reservations_file() -> String {
    "reservations.json".to_string()
}

impl StorageConfig {
    /// Full path of a file inside the data directory.
    pub fn resolve(&self, file: &str) -> PathBuf {
        Path::new(&self.data_dir).join(file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            users_file: default_users_file(),
            resets_file: default_resets_file(),
            otps_file: default_otps_file(),
            reservations_file: default_reservations_file(),
        }
    }
}

/// Authentication policy.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// PBKDF2 iteration count.
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,
    /// Consecutive failures that trigger a lockout.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
    /// Lockout duration in seconds.
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
    /// One-time code lifetime in seconds.
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_secs: u64,
    /// Reset token lifetime in seconds.
    #[serde(default = "default_reset_ttl")]
    pub reset_ttl_secs: u64,
    /// Return one-time codes and reset tokens in API responses.
    #[serde(default = "default_demo_mode")]
    pub demo_mode: bool,
    /// Reject new passwords outside the length policy.
    #[serde(default)]
    pub enforce_password_policy: bool,
    /// Password assigned to records that have no credentials yet.
    #[serde(default = "default_password")]
    pub default_password: String,
    /// Name of the administrator created on an empty user store.
    #[serde(default = "default_seed_admin_name")]
    pub seed_admin_name: String,
    /// Email of the administrator created on an empty user store.
    #[serde(default = "default_seed_admin_email")]
    pub seed_admin_email: String,
}

/// Upper bound for the lockout and expiry settings (one year).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

fn default_pbkdf2_iterations() -> u32 {
    310_000
}

fn default_max_failed_attempts() -> u32 {
    5
}

fn default_lockout_secs() -> u64 {
    900 // 15 minutes
}

fn default_otp_ttl() -> u64 {
    300 // 5 minutes
}

fn default_reset_ttl() -> u64 {
    3600 // 1 hour
}

fn default_demo_mode() -> bool {
    true
}

fn default_password() -> String {
    "changeme123".to_string()
}

fn default_seed_admin_name() -> String {
    "admin".to_string()
}

fn default_seed_admin_email() -> String {
    "admin@example.com".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: default_pbkdf2_iterations(),
            max_failed_attempts: default_max_failed_attempts(),
            lockout_secs: default_lockout_secs(),
            otp_ttl_secs: default_otp_ttl(),
            reset_ttl_secs: default_reset_ttl(),
            demo_mode: default_demo_mode(),
            enforce_password_policy: false,
            default_password: default_password(),
            seed_admin_name: default_seed_admin_name(),
            seed_admin_email: default_seed_admin_email(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Shared secret for `/admin` routes (empty = unguarded).
    #[serde(default)]
    pub admin_key: String,
    /// Rate limit for the login endpoint (requests per minute per IP).
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
    /// Key the login limiter on `X-Forwarded-For` / `X-Real-IP`.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_login_rate_limit() -> u32 {
    20
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            admin_key: String::new(),
            login_rate_limit: default_login_rate_limit(),
            trust_proxy_headers: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/caredesk.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Authentication policy.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(CaredeskError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CaredeskError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `CAREDESK_ADMIN_KEY`: admin route secret
    /// - `CAREDESK_DATA_DIR`: directory holding the JSON documents
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("CAREDESK_ADMIN_KEY") {
            if !key.is_empty() {
                self.web.admin_key = key;
            }
        }
        if let Ok(dir) = std::env::var("CAREDESK_DATA_DIR") {
            if !dir.is_empty() {
                self.storage.data_dir = dir;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.pbkdf2_iterations == 0 {
            return Err(CaredeskError::Config(
                "auth.pbkdf2_iterations must be greater than zero".to_string(),
            ));
        }
        if self.auth.max_failed_attempts == 0 {
            return Err(CaredeskError::Config(
                "auth.max_failed_attempts must be greater than zero".to_string(),
            ));
        }
        for (name, secs) in [
            ("lockout_secs", self.auth.lockout_secs),
            ("otp_ttl_secs", self.auth.otp_ttl_secs),
            ("reset_ttl_secs", self.auth.reset_ttl_secs),
        ] {
            if secs > MAX_TTL_SECS {
                return Err(CaredeskError::Config(format!(
                    "auth.{name} must be at most {MAX_TTL_SECS}"
                )));
            }
        }
        if self.auth.default_password.is_empty() {
            return Err(CaredeskError::Config(
                "auth.default_password must not be empty".to_string(),
            ));
        }
        if self.auth.enforce_password_policy {
            validate_password(&self.auth.default_password).map_err(|e| {
                CaredeskError::Config(format!("auth.default_password: {e}"))
            })?;
        }
        Ok(())
    }
}

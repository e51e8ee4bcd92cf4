//! Configuration module for s3curl
//!
//! Handles loading and parsing of the optional YAML configuration file with
//! support for environment variable expansion and validation, plus the
//! per-request [`RequestConfig`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Default S3 endpoint the resource path is appended to
pub const DEFAULT_ENDPOINT: &str = "https://s3.amazonaws.com";

/// Default transport binary, resolved through `PATH`
pub const DEFAULT_BINARY: &str = "curl";

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Supports two syntaxes:
/// - `${VAR_NAME}` - Simple expansion, keeps placeholder if var not found
/// - `${VAR_NAME:-default}` - Expansion with default value
fn expand_env_vars(s: &str) -> String {
    let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]+))?\}") {
        Ok(re) => re,
        Err(_) => return s.to_string(),
    };
    let mut last_match = 0;
    let mut result = String::with_capacity(s.len());

    for cap in re.captures_iter(s) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        result.push_str(&s[last_match..full_match.start()]);

        let value = match std::env::var(var_name.as_str()) {
            Ok(val) => val,
            Err(_) => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                // No env var and no default. Keep the original placeholder.
                None => full_match.as_str().to_string(),
            },
        };
        result.push_str(&value);

        last_match = full_match.end();
    }

    result.push_str(&s[last_match..]);

    result
}

/// Deserialize a string, expanding `${VAR}` references.
fn deserialize_with_env<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(expand_env_vars(&s))
}

/// Validate that a URL starts with http:// or https://
fn is_valid_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Check an endpoint is an http(s) URL without a trailing `/`.
pub fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    if !is_valid_http_url(endpoint) {
        return Err(ConfigError::ValidationError(format!(
            "Invalid endpoint '{}': must start with http:// or https://",
            endpoint
        )));
    }

    if endpoint.ends_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "Invalid endpoint '{}': must not end with '/'",
            endpoint
        )));
    }

    Ok(())
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Configuration file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(
        default = "default_endpoint",
        deserialize_with = "deserialize_with_env"
    )]
    pub endpoint: String,
    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            credentials: None,
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::load(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.endpoint)?;

        if self.transport.binary.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Transport binary cannot be empty".into(),
            ));
        }

        if self.transport.timeout_seconds == Some(0) {
            return Err(ConfigError::ValidationError(
                "Transport timeout must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Credentials from the configuration file
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default, deserialize_with = "deserialize_optional_with_env")]
    pub access_key: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_with_env")]
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn deserialize_optional_with_env<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| expand_env_vars(&s)))
}

/// Transport (external HTTP client) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_binary")]
    pub binary: String,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            timeout_seconds: None,
        }
    }
}

fn default_binary() -> String {
    DEFAULT_BINARY.to_string()
}

// ============================================================================
// Request Configuration
// ============================================================================

/// Settings for a single planned request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    /// Resource path appended to the endpoint, e.g. `/bucket/key`
    pub resource: String,
    /// Download destination or upload source
    pub local_file: Option<PathBuf>,
    /// HTTP date used verbatim instead of the clock
    pub fixed_date: Option<String>,
    /// Transport binary name or path
    pub binary: String,
}

impl RequestConfig {
    /// Request for `resource` with the default transport binary
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            local_file: None,
            fixed_date: None,
            binary: default_binary(),
        }
    }

    pub fn with_local_file(mut self, local_file: impl Into<PathBuf>) -> Self {
        self.local_file = Some(local_file.into());
        self
    }

    pub fn with_fixed_date(mut self, date: impl Into<String>) -> Self {
        self.fixed_date = Some(date.into());
        self
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Check the resource path is present and rooted.
    pub fn validate_resource(&self) -> Result<(), ConfigError> {
        if self.resource.is_empty() {
            return Err(ConfigError::MissingField("resource"));
        }
        if !self.resource.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "Resource '{}' must start with '/'",
                self.resource
            )));
        }
        Ok(())
    }

    /// Check the fixed date override, if any, is a usable HTTP date.
    ///
    /// Both `+0000` and `GMT` zone forms are accepted. The value is sent and
    /// signed verbatim, so blank values and control characters are rejected.
    pub fn validate_fixed_date(&self) -> Result<(), ConfigError> {
        let Some(date) = &self.fixed_date else {
            return Ok(());
        };

        if date.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Fixed date cannot be empty".into(),
            ));
        }

        if date.chars().any(char::is_control) {
            return Err(ConfigError::ValidationError(format!(
                "Fixed date {:?} contains control characters",
                date
            )));
        }

        chrono::DateTime::parse_from_rfc2822(date).map_err(|e| {
            ConfigError::ValidationError(format!("Invalid fixed date '{}': {}", date, e))
        })?;

        Ok(())
    }
}

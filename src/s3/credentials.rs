//! S3 Credentials Module
//!
//! Loads the access key pair from the environment, the configuration file,
//! or a mix of command-line values layered over the file.
//!
//! # Example
//!
//! ```
//! use s3curl::config::CredentialsConfig;
//! use s3curl::s3::CredentialsProvider;
//!
//! let flags = CredentialsConfig {
//!     access_key: Some("access-key".into()),
//!     secret_key: None,
//! };
//! let file = CredentialsConfig {
//!     access_key: None,
//!     secret_key: Some("secret-key".into()),
//! };
//!
//! let creds = CredentialsProvider::from_sources(&flags, Some(&file)).unwrap();
//! assert_eq!(creds.access_key_id(), "access-key");
//! assert_eq!(creds.secret_access_key(), "secret-key");
//! ```

use crate::config::{ConfigError, CredentialsConfig};
use std::fmt;

/// Environment variable holding the access key ID
pub const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";

/// Environment variable holding the secret access key
pub const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";

/// Access key pair used to sign requests
///
/// The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    /// Create new credentials
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Get the access key ID
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Get the secret access key
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Ensure both halves of the key pair are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_key_id.is_empty() {
            return Err(ConfigError::MissingField("access_key"));
        }
        if self.secret_access_key.is_empty() {
            return Err(ConfigError::MissingField("secret_key"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Factory methods for loading credentials
pub struct CredentialsProvider;

impl CredentialsProvider {
    /// Load credentials from `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`
    pub fn from_env() -> Result<Credentials, ConfigError> {
        let access_key =
            non_empty_env(ACCESS_KEY_ENV).ok_or(ConfigError::MissingField("access_key"))?;
        let secret_key =
            non_empty_env(SECRET_KEY_ENV).ok_or(ConfigError::MissingField("secret_key"))?;

        Ok(Credentials::new(access_key, secret_key))
    }

    /// Load credentials from the configuration file section
    pub fn from_config(config: &CredentialsConfig) -> Result<Credentials, ConfigError> {
        let access_key = config
            .access_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingField("access_key"))?;

        let secret_key = config
            .secret_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingField("secret_key"))?;

        Ok(Credentials::new(access_key.clone(), secret_key.clone()))
    }

    /// Take each key from `primary` when set, otherwise from `fallback`.
    ///
    /// Empty values count as unset.
    pub fn from_sources(
        primary: &CredentialsConfig,
        fallback: Option<&CredentialsConfig>,
    ) -> Result<Credentials, ConfigError> {
        let pick = |own: &Option<String>, other: Option<&Option<String>>| {
            own.clone()
                .filter(|k| !k.is_empty())
                .or_else(|| other.cloned().flatten())
        };

        let merged = CredentialsConfig {
            access_key: pick(&primary.access_key, fallback.map(|f| &f.access_key)),
            secret_key: pick(&primary.secret_key, fallback.map(|f| &f.secret_key)),
        };
        Self::from_config(&merged)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_credentials_creation() {
        let creds = Credentials::new("access", "secret");
        assert_eq!(creds.access_key_id(), "access");
        assert_eq!(creds.secret_access_key(), "secret");
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("AKIDEXAMPLE", "do-not-print");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("do-not-print"));
    }

    #[test]
    fn test_credentials_validate_missing_parts() {
        assert!(matches!(
            Credentials::new("", "secret").validate(),
            Err(ConfigError::MissingField("access_key"))
        ));
        assert!(matches!(
            Credentials::new("access", "").validate(),
            Err(ConfigError::MissingField("secret_key"))
        ));
    }

    #[test]
    fn test_from_sources_prefers_primary() {
        let primary = CredentialsConfig {
            access_key: Some("flag-access".into()),
            secret_key: Some(String::new()),
        };
        let fallback = CredentialsConfig {
            access_key: Some("file-access".into()),
            secret_key: Some("file-secret".into()),
        };

        let creds = CredentialsProvider::from_sources(&primary, Some(&fallback)).unwrap();
        assert_eq!(creds.access_key_id(), "flag-access");
        assert_eq!(creds.secret_access_key(), "file-secret");
    }

    #[test]
    fn test_from_sources_without_fallback() {
        let primary = CredentialsConfig {
            access_key: Some("flag-access".into()),
            secret_key: None,
        };
        assert!(matches!(
            CredentialsProvider::from_sources(&primary, None),
            Err(ConfigError::MissingField("secret_key"))
        ));
    }

    #[test]
    fn test_from_config_missing_secret_key() {
        let config = CredentialsConfig {
            access_key: Some("access".into()),
            secret_key: None,
        };
        assert!(matches!(
            CredentialsProvider::from_config(&config),
            Err(ConfigError::MissingField("secret_key"))
        ));
    }

    #[test]
    fn test_from_config_success() {
        let config = CredentialsConfig {
            access_key: Some("config-access".into()),
            secret_key: Some("config-secret".into()),
        };
        let creds = CredentialsProvider::from_config(&config).unwrap();
        assert_eq!(creds.access_key_id(), "config-access");
        assert_eq!(creds.secret_access_key(), "config-secret");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(ACCESS_KEY_ENV, "env-access");
        std::env::set_var(SECRET_KEY_ENV, "env-secret");

        let creds = CredentialsProvider::from_env().unwrap();
        assert_eq!(creds.access_key_id(), "env-access");
        assert_eq!(creds.secret_access_key(), "env-secret");

        std::env::remove_var(SECRET_KEY_ENV);
        assert!(matches!(
            CredentialsProvider::from_env(),
            Err(ConfigError::MissingField("secret_key"))
        ));

        std::env::remove_var(ACCESS_KEY_ENV);
    }
}

//! Request planning
//!
//! Turns a logical operation (download, upload, delete) into a signed curl
//! invocation. Planning is pure: it reads the clock and nothing else, and
//! never runs the transport.
//!
//! # Example
//!
//! ```
//! use s3curl::config::RequestConfig;
//! use s3curl::plan::{Operation, RequestPlanner};
//! use s3curl::s3::Credentials;
//!
//! let planner = RequestPlanner::new(
//!     Credentials::new("AKIDEXAMPLE", "secret"),
//!     "https://s3.amazonaws.com",
//! );
//! let config = RequestConfig::new("/mybucket/photos/puppy.jpg")
//!     .with_fixed_date("Thu, 17 Nov 2005 18:49:58 GMT");
//!
//! let plan = planner.plan(Operation::Delete, &config).unwrap();
//! assert_eq!(plan.url, "https://s3.amazonaws.com/mybucket/photos/puppy.jpg");
//! assert_eq!(plan.args.last().map(String::as_str), Some("DELETE"));
//! ```

use crate::auth::{
    authorization_header, format_http_date, CanonicalRequest, Clock, SigningError, SystemClock,
};
use crate::config::{validate_endpoint, ConfigError, RequestConfig};
use crate::s3::{object_url, Credentials};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Planning errors
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),
}

/// Logical S3 operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Download,
    Upload,
    Delete,
}

impl Operation {
    /// HTTP method sent for this operation
    pub fn method(self) -> &'static str {
        match self {
            Operation::Download => "GET",
            Operation::Upload => "PUT",
            Operation::Delete => "DELETE",
        }
    }

    fn requires_local_file(self) -> bool {
        matches!(self, Operation::Download | Operation::Upload)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Download => "download",
            Operation::Upload => "upload",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A fully signed transport invocation
///
/// Only valid around the moment it was planned: the signature covers the
/// `Date` header, and S3 rejects requests too far from server time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedRequest {
    pub operation: Operation,
    pub method: &'static str,
    /// Resource actually signed and requested
    pub resource: String,
    pub url: String,
    pub date: String,
    pub authorization: String,
    /// Transport binary
    pub program: String,
    /// Arguments following the binary
    pub args: Vec<String>,
}

impl SignedRequest {
    /// The complete argument vector, binary first
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Render the invocation as a copy-pasteable shell command
    pub fn to_shell_string(&self) -> String {
        self.argv()
            .into_iter()
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Plans signed requests against one endpoint with one key pair
#[derive(Debug, Clone)]
pub struct RequestPlanner<C = SystemClock> {
    credentials: Credentials,
    endpoint: String,
    clock: C,
}

impl RequestPlanner<SystemClock> {
    /// Create a planner that dates requests with the system clock
    pub fn new(credentials: Credentials, endpoint: impl Into<String>) -> Self {
        Self {
            credentials,
            endpoint: endpoint.into(),
            clock: SystemClock,
        }
    }
}

impl<C: Clock> RequestPlanner<C> {
    /// Replace the clock
    pub fn with_clock<D: Clock>(self, clock: D) -> RequestPlanner<D> {
        RequestPlanner {
            credentials: self.credentials,
            endpoint: self.endpoint,
            clock,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Plan a GET writing the object to `config.local_file`
    pub fn download(&self, config: &RequestConfig) -> Result<SignedRequest, PlanError> {
        self.plan(Operation::Download, config)
    }

    /// Plan a PUT reading the body from `config.local_file`
    pub fn upload(&self, config: &RequestConfig) -> Result<SignedRequest, PlanError> {
        self.plan(Operation::Upload, config)
    }

    /// Plan a DELETE of `config.resource`
    pub fn delete(&self, config: &RequestConfig) -> Result<SignedRequest, PlanError> {
        self.plan(Operation::Delete, config)
    }

    /// Plan `operation`.
    ///
    /// All preconditions are checked before anything is signed.
    pub fn plan(
        &self,
        operation: Operation,
        config: &RequestConfig,
    ) -> Result<SignedRequest, PlanError> {
        self.credentials.validate()?;
        validate_endpoint(&self.endpoint)?;
        config.validate_resource()?;
        config.validate_fixed_date()?;
        if config.binary.trim().is_empty() {
            return Err(ConfigError::MissingField("binary").into());
        }

        let local_file = match (&config.local_file, operation.requires_local_file()) {
            (Some(path), true) => Some(path_arg(path)?),
            (None, true) => return Err(ConfigError::MissingField("local_file").into()),
            (_, false) => None,
        };

        let resource = match (operation, &local_file) {
            (Operation::Upload, Some(file)) if config.resource.ends_with('/') => {
                format!("{}{}", config.resource, base_name(Path::new(file))?)
            }
            _ => config.resource.clone(),
        };

        let date = match &config.fixed_date {
            Some(date) => date.clone(),
            None => format_http_date(self.clock.now()),
        };

        let method = operation.method();
        let signature = CanonicalRequest::new(method, &date, &resource)
            .sign(self.credentials.secret_access_key())?;
        let authorization = authorization_header(self.credentials.access_key_id(), &signature);
        let url = object_url(&self.endpoint, &resource);

        let mut args = vec![
            "-H".to_string(),
            format!("Date: {}", date),
            "-H".to_string(),
            format!("Authorization: {}", authorization),
            "-H".to_string(),
            "content-type: ".to_string(),
            "-L".to_string(),
            "-f".to_string(),
            url.clone(),
        ];

        match (operation, local_file) {
            (Operation::Download, Some(file)) => args.extend(["-o".to_string(), file]),
            (Operation::Upload, Some(file)) => args.extend(["-T".to_string(), file]),
            (Operation::Delete, _) => args.extend(["-X".to_string(), "DELETE".to_string()]),
            // local_file presence was checked above
            _ => {}
        }

        Ok(SignedRequest {
            operation,
            method,
            resource,
            url,
            date,
            authorization,
            program: config.binary.clone(),
            args,
        })
    }
}

fn path_arg(path: &Path) -> Result<String, ConfigError> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        ConfigError::ValidationError(format!(
            "Local file path {} is not valid UTF-8",
            path.display()
        ))
    })
}

/// Final path component of the local file, appended to `/`-terminated upload targets.
fn base_name(path: &Path) -> Result<&str, ConfigError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "Local file {} has no file name to append to the upload path",
                path.display()
            ))
        })
}

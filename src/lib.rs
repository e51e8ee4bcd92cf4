//! s3curl Library
//!
//! Signs S3 requests with AWS Signature Version 2 and hands them to `curl`,
//! for hosts where an SDK is unavailable but a curl binary is.
//!
//! # Features
//!
//! - **Three Operations**: download (GET), upload (PUT), delete (DELETE)
//! - **SigV2 Signing**: HMAC-SHA1 over the canonical request, Base64 encoded
//! - **Pure Planning**: signing produces an argument list, nothing is executed
//! - **Pluggable Transport**: plans run through any [`transport::Transport`]
//!
//! # Example
//!
//! ```no_run
//! use s3curl::config::RequestConfig;
//! use s3curl::plan::RequestPlanner;
//! use s3curl::s3::CredentialsProvider;
//! use s3curl::transport::{CommandTransport, Transport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = CredentialsProvider::from_env()?;
//!     let planner = RequestPlanner::new(credentials, "https://s3.amazonaws.com");
//!
//!     let request = RequestConfig::new("/my-bucket/releases/").with_local_file("dist/app.tgz");
//!     let plan = planner.upload(&request)?;
//!
//!     CommandTransport::new().execute(&plan).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod plan;
pub mod s3;
pub mod transport;

// Re-export commonly used types
pub use config::{Config, RequestConfig};
pub use plan::{Operation, PlanError, RequestPlanner, SignedRequest};
pub use s3::Credentials;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

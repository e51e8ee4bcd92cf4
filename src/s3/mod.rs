//! S3 addressing and credentials
//!
//! Resource paths are always relative to a single endpoint. The bucket is the
//! first path segment (`/bucket/key`); no virtual-host rewriting is done.

pub mod credentials;

pub use credentials::{Credentials, CredentialsProvider};

/// Join an endpoint and a rooted resource path into the request URL.
///
/// The endpoint carries no trailing `/` (see [`crate::config::validate_endpoint`]).
pub fn object_url(endpoint: &str, resource: &str) -> String {
    format!("{}{}", endpoint, resource)
}

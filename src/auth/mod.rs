//! Request signing module
//!
//! Provides AWS Signature Version 2 signing and the clock used to date
//! signed requests.

use thiserror::Error;

pub mod clock;
pub mod sigv2;

pub use clock::{Clock, FixedClock, SystemClock};
pub use sigv2::{authorization_header, format_http_date, sign, CanonicalRequest};

/// Signing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("Secret key is empty")]
    EmptyKey,

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

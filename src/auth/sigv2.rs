//! AWS Signature Version 2 signing
//!
//! The `Authorization` header has the format:
//!
//! ```text
//! AWS <AWSAccessKeyId>:<Signature>
//! ```
//!
//! Where `Signature = Base64(HMAC-SHA1(SecretKey, StringToSign))` and:
//!
//! ```text
//! StringToSign = HTTP-Verb + "\n" +
//!                Content-MD5 + "\n" +
//!                Content-Type + "\n" +
//!                Date + "\n" +
//!                CanonicalizedAmzHeaders +
//!                CanonicalizedResource
//! ```
//!
//! Requests built here never carry a body digest, a content type or any
//! `x-amz-*` header, so those positions are always empty.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::SigningError;

type HmacSha1 = Hmac<Sha1>;

/// Date format sent in the `Date` header and signed in the string to sign
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S +0000";

/// Format a UTC instant as an HTTP date, e.g. `Tue, 01 Jan 2030 00:00:00 +0000`.
pub fn format_http_date(instant: DateTime<Utc>) -> String {
    instant.format(HTTP_DATE_FORMAT).to_string()
}

/// The fields covered by a SigV2 signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest<'a> {
    pub method: &'a str,
    pub content_md5: &'a str,
    pub content_type: &'a str,
    pub date: &'a str,
    pub resource: &'a str,
}

impl<'a> CanonicalRequest<'a> {
    /// Canonical request with empty Content-MD5 and Content-Type
    pub fn new(method: &'a str, date: &'a str, resource: &'a str) -> Self {
        Self {
            method,
            content_md5: "",
            content_type: "",
            date,
            resource,
        }
    }

    /// Build the newline-joined string to sign.
    ///
    /// No `x-amz-*` headers are sent, so the canonicalized headers are empty
    /// and the resource follows the date line directly.
    pub fn string_to_sign(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}",
            self.method, self.content_md5, self.content_type, self.date, self.resource
        )
    }

    /// Sign this request with `secret_key`
    pub fn sign(&self, secret_key: &str) -> Result<String, SigningError> {
        sign(secret_key, &self.string_to_sign())
    }
}

/// Compute `Base64(HMAC-SHA1(secret_key, string_to_sign))`.
pub fn sign(secret_key: &str, string_to_sign: &str) -> Result<String, SigningError> {
    if secret_key.is_empty() {
        return Err(SigningError::EmptyKey);
    }

    let mut mac = HmacSha1::new_from_slice(secret_key.as_bytes())
        .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Format the `Authorization` header value: `AWS <access_key_id>:<signature>`.
pub fn authorization_header(access_key_id: &str, signature: &str) -> String {
    format!("AWS {}:{}", access_key_id, signature)
}

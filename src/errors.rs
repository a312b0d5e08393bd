//! Error types for the acquisition pipeline.

use crate::types::ErrorBody;

/// Errors surfaced at the acquisition boundary.
///
/// All of these are terminal for the enumeration in progress; callers log
/// them and decide whether to abort or proceed with degraded data.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Every attempt at one logical request failed with a transport error.
    /// Wraps the last underlying failure.
    #[error("acquisition failed after {attempts} attempts")]
    Acquisition {
        attempts: u32,
        #[source]
        last: TransportError,
    },
    /// The service answered with a well-formed error payload. Never retried.
    #[error("service rejected the request: {0}")]
    ServiceRejected(ErrorBody),
    /// No candidate matched the preference lists and the caller did not
    /// allow a degrading fallback.
    #[error("no candidate matched for {subject}")]
    Resolution { subject: String },
    /// The base URL, or a path joined onto it, is not a valid URL.
    #[error("invalid request URL")]
    InvalidUrl(#[from] url::ParseError),
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

/// A single failed transport attempt. These are the only failures the
/// request executor retries.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// Connection, DNS, or per-request timeout failure.
    #[error("network error")]
    Network(#[from] reqwest::Error),
    /// Non-2xx status with a body snippet.
    #[error("HTTP status {status}")]
    HttpStatus { status: u16, body: String },
    /// The body was not the JSON shape the endpoint promises.
    #[error("malformed response body: {0}")]
    Malformed(String),
}

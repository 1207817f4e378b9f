//! Typed error hierarchy for the pgwarn crate.
//!
//! Every failure the tool can hit maps onto one variant of [`Error`]. The
//! binary treats them all the same way (print and stop), but the library
//! keeps them apart so tests and callers can tell a rejected login from a
//! garbled payload.

use reqwest::StatusCode;

/// Unified error type for all pgwarn library operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The cluster answered with a non-success HTTP status.
    ///
    /// The body is kept verbatim; the cluster puts its diagnostic message
    /// (bad credentials, missing privilege, ...) there.
    #[error("API error {status}: {body}")]
    Api {
        /// The HTTP status code returned by the cluster.
        status: StatusCode,
        /// The raw response body text.
        body: String,
    },

    /// A response body was not the JSON shape we expected.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request construction, connection, TLS or body-read failure.
    ///
    /// reqwest reports all of these through a single error type, and no
    /// HTTP status is available for any of them.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Writing the report to its output failed.
    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

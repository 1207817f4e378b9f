//! Async client library for spotting backup runs that finished with warnings.
//!
//! Logs in to a backup cluster's REST API, lists its protection groups with
//! their most recent run, and reports every group whose last local backup
//! ended `SucceededWithWarning`, together with the run's messages.
//!
//! # Modules
//!
//! - [`auth`] — credentials and the access-token exchange.
//! - [`client`] — HTTP client bound to one cluster (TLS policy, base URL).
//! - [`error`] — Typed error hierarchy (`Error`) for all library operations.
//! - [`protection_groups`] — listing endpoint and its response model.
//! - [`report`] — warning filter and text report.
//!
//! # Quick Start
//!
//! ```ignore
//! use pgwarn::auth::Credentials;
//! use pgwarn::client::ClusterClient;
//!
//! let client = ClusterClient::new("10.0.0.5", false)?;
//! let credentials = Credentials::new("admin", "admin", "LOCAL");
//! pgwarn::check_warnings(&client, &credentials, &mut std::io::stdout()).await?;
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod error;
pub mod protection_groups;
pub mod report;

use std::io::Write;

use auth::{Credentials, request_access_token};
use client::ClusterClient;
use error::Result;
use protection_groups::list_protection_groups;

/// Runs the whole check: authenticate, list groups, write the report.
///
/// The token from the first call is passed straight to the second. Any
/// failure stops the run before anything is written. Returns the number of
/// groups reported.
pub async fn check_warnings<W: Write>(
    client: &ClusterClient,
    credentials: &Credentials,
    out: &mut W,
) -> Result<usize> {
    let token = request_access_token(client, credentials).await?;
    let groups = list_protection_groups(client, &token).await?;
    let reported = report::write_report(&groups, out)?;
    out.flush()?;
    tracing::info!(total = groups.len(), reported, "report written");
    Ok(reported)
}

//! HTTP client for the cluster's REST API.
//!
//! `ClusterClient` owns the single `reqwest::Client` the tool uses for both
//! of its calls and the base URL they are resolved against. It carries no
//! credentials: the bearer token is handed to each authenticated call
//! explicitly by the caller.
//!
//! Response handling is the same for every call: the body is read to the
//! end as text first, the status is checked second, and only then is the
//! text decoded. Reading before checking keeps the cluster's error message
//! available for [`Error::Api`], and consuming the body releases the
//! connection on every exit path.

use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{Error, Result};

/// Builds the underlying `reqwest::Client`.
///
/// Clusters ship with self-signed certificates, so certificate validation
/// is off unless `verify_tls` is set. No timeouts are configured beyond the
/// transport defaults.
fn build_http_client(verify_tls: bool) -> Result<Client> {
    let client = Client::builder()
        .danger_accept_invalid_certs(!verify_tls)
        .build()?;
    Ok(client)
}

/// HTTP client bound to one cluster.
///
/// `base_url` always ends with `/`; request paths are appended without a
/// leading slash.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    client: Client,
    base_url: String,
}

impl ClusterClient {
    /// Creates a client for the cluster at `address` (host or `host:port`),
    /// reached over HTTPS.
    pub fn new(address: &str, verify_tls: bool) -> Result<Self> {
        Self::with_base_url(&format!("https://{address}/"), verify_tls)
    }

    /// Creates a client against an arbitrary base URL. Tests use this to
    /// point at a local mock server speaking plain HTTP.
    pub fn with_base_url(base_url: &str, verify_tls: bool) -> Result<Self> {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(ClusterClient {
            client: build_http_client(verify_tls)?,
            base_url,
        })
    }

    /// The base URL every request path is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends an unauthenticated POST with a JSON body and decodes the JSON
    /// response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "POST");
        Self::read_json(self.client.post(&url).json(body)).await
    }

    /// Sends a GET with the given query pairs and a bearer token, and
    /// decodes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &str,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        Self::read_json(self.client.get(&url).query(query).bearer_auth(token)).await
    }

    /// Sends the request, reads the whole body, then checks the status and
    /// decodes.
    async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(Error::Api { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

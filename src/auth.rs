//! Session authentication against the cluster's access-token endpoint.
//!
//! The cluster issues bearer tokens from
//! `/irisservices/api/v1/public/accessTokens` in exchange for a username,
//! password and domain. The token lives for the rest of the process run;
//! it is never refreshed.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ClusterClient;
use crate::error::Result;

/// Path of the access-token endpoint, relative to the cluster base URL.
pub const ACCESS_TOKEN_PATH: &str = "irisservices/api/v1/public/accessTokens";

/// Login credentials, sent as the JSON body of the token request.
///
/// Field order is the wire order: `password`, `username`, `domain`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    password: String,
    username: String,
    domain: String,
}

impl Credentials {
    /// Bundles the three login fields. None of them is validated.
    pub fn new(username: &str, password: &str, domain: &str) -> Self {
        Credentials {
            password: password.to_string(),
            username: username.to_string(),
            domain: domain.to_string(),
        }
    }

    /// The login name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The authentication domain, e.g. `LOCAL`.
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

// Hand-written so the password never lands in logs or panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Token response from the access-token endpoint.
///
/// Only `accessToken` is required. `tokenType` and `privileges` are kept
/// for completeness but nothing downstream reads them.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// The bearer token itself.
    pub access_token: String,
    /// Token scheme reported by the cluster, normally `Bearer`.
    #[serde(default)]
    pub token_type: String,
    /// Privilege names granted to the session.
    #[serde(default)]
    pub privileges: Vec<String>,
}

impl AccessToken {
    /// The raw token, as it goes into an `Authorization: Bearer` header.
    pub fn bearer(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("privileges", &self.privileges)
            .finish()
    }
}

/// Exchanges credentials for a bearer token.
///
/// Any failure (unreachable cluster, rejected login, malformed body) comes
/// back as an error; there is no retry.
pub async fn request_access_token(
    client: &ClusterClient,
    credentials: &Credentials,
) -> Result<AccessToken> {
    info!(
        username = credentials.username(),
        domain = credentials.domain(),
        "requesting access token"
    );
    let token: AccessToken = client.post_json(ACCESS_TOKEN_PATH, credentials).await?;
    info!(
        token_type = %token.token_type,
        privileges = token.privileges.len(),
        "access token acquired"
    );
    Ok(token)
}

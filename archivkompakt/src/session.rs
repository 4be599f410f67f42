//! Token-authenticated session.
//!
//! A [`Session`] exchanges the user's password for a bearer token exactly once,
//! at construction, and attaches it to every later request. There is no
//! renewal: when the token expires the service answers 401 and the caller
//! must open a new session.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::{ArchivError, ArchivResult};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// An authenticated connection to one archive endpoint.
///
/// The token is fixed for the lifetime of the value, so a `Session` can be
/// shared between threads for reading.
pub struct Session {
    client: Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl Session {
    /// Open a session: build the HTTP client and request a token.
    ///
    /// Fails with [`ArchivError::Auth`] when the token endpoint answers with
    /// anything but 200 (the body is kept as diagnostic text) or when the
    /// answer carries no `access_token`. No partially built session is
    /// returned.
    pub fn create(config: &ClientConfig) -> ArchivResult<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build().map_err(|e| ArchivError::Transport {
            url: config.hostname.clone(),
            reason: format!("failed to create HTTP client: {}", e),
        })?;

        let base_url = config.base_url();
        let token = request_token(&client, &base_url, config)?;

        tracing::info!(base_url = %base_url, user = %config.user, "Opened archive session");

        Ok(Self {
            client,
            base_url,
            token,
            timeout: config.timeout,
        })
    }

    /// Base URL of the REST API, ending in `/AAKRest`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request timeout the session was configured with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    /// Absolute URL for a path below the API root.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET with bearer authentication.
    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).bearer_auth(&self.token)
    }

    /// POST with bearer authentication.
    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url).bearer_auth(&self.token)
    }

    /// Send a request, mapping network failures onto `Transport`/`Timeout`.
    pub(crate) fn send(&self, url: &str, request: RequestBuilder) -> ArchivResult<Response> {
        tracing::debug!(url = %url, "Sending archive request");
        let response = request
            .send()
            .map_err(|e| ArchivError::from_reqwest(url, self.timeout.as_secs(), e))?;
        tracing::debug!(url = %url, status = response.status().as_u16(), "Archive response");
        Ok(response)
    }

    /// Read a response body as text.
    pub(crate) fn read_text(&self, url: &str, response: Response) -> ArchivResult<String> {
        response
            .text()
            .map_err(|e| ArchivError::from_reqwest(url, self.timeout.as_secs(), e))
    }

    /// Turn a non-success response into `ArchivError::Api`.
    pub(crate) fn rejected(&self, url: &str, response: Response) -> ArchivError {
        let status = response.status().as_u16();
        match self.read_text(url, response) {
            Ok(body) => ArchivError::Api { status, body },
            Err(e) => e,
        }
    }

    /// Decode a 200 body as JSON.
    pub(crate) fn read_json<T: DeserializeOwned>(
        &self,
        url: &str,
        response: Response,
    ) -> ArchivResult<T> {
        let body = self.read_text(url, response)?;
        serde_json::from_str(&body).map_err(|e| ArchivError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Exchange user credentials for a bearer token (`grant_type=password`).
fn request_token(client: &Client, base_url: &str, config: &ClientConfig) -> ArchivResult<String> {
    let url = format!("{}/Token", base_url);

    let response = client
        .post(&url)
        .header(
            AUTHORIZATION,
            format!("Basic {}", config.credentials.basic_value()),
        )
        .form(&[
            ("grant_type", "password"),
            ("username", config.user.as_str()),
            ("password", config.password.as_str()),
            ("scope", config.scope.as_str()),
        ])
        .send()
        .map_err(|e| ArchivError::from_reqwest(&url, config.timeout.as_secs(), e))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|e| ArchivError::from_reqwest(&url, config.timeout.as_secs(), e))?;

    if status != StatusCode::OK {
        tracing::warn!(status = status.as_u16(), "Token request rejected");
        return Err(ArchivError::Auth(body));
    }

    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| ArchivError::Auth(format!("unreadable token response: {}", e)))?;

    parsed
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ArchivError::Auth("token response has no access_token".to_string()))
}

//! Configuration for an Archiv Kompakt session.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ArchivError, ArchivResult};

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes, downloads can be large

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// REST application path appended to the hostname.
pub(crate) const API_PATH: &str = "AAKRest";

/// OAuth client credentials used for the `Authorization: Basic` header of the
/// token request.
#[derive(Clone, PartialEq, Eq)]
pub enum ClientCredentials {
    /// Client id and secret, encoded as base64 of `id:secret`.
    ClientSecret {
        client_id: String,
        client_secret: String,
    },
    /// An already encoded basic-auth value, sent as is.
    Preshared(String),
}

impl ClientCredentials {
    /// Create credentials from a client id and secret.
    pub fn client_secret(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::ClientSecret {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Create credentials from a pre-shared basic-auth value.
    pub fn preshared(value: impl Into<String>) -> Self {
        Self::Preshared(value.into())
    }

    /// The value placed after `Basic ` in the token request.
    pub fn basic_value(&self) -> String {
        match self {
            Self::ClientSecret {
                client_id,
                client_secret,
            } => STANDARD.encode(format!("{}:{}", client_id, client_secret)),
            Self::Preshared(value) => value.clone(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientSecret { client_id, .. } => f
                .debug_struct("ClientSecret")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
            Self::Preshared(_) => f.debug_tuple("Preshared").field(&"<redacted>").finish(),
        }
    }
}

/// Everything needed to open a session.
///
/// All parameters are passed in code; nothing is read from the environment
/// or from disk.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server root, with or without trailing slash.
    pub hostname: String,

    /// Archive user name.
    pub user: String,

    /// Archive user password.
    pub password: String,

    /// OAuth scope requested with the token.
    pub scope: String,

    /// Client credentials for the token request.
    pub credentials: ClientCredentials,

    /// Total timeout applied to each request, including body transfer.
    pub timeout: Duration,

    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,

    /// Optional `User-Agent` header.
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create a new configuration with default timeouts.
    pub fn new(
        hostname: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        scope: impl Into<String>,
        credentials: ClientCredentials,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            user: user.into(),
            password: password.into(),
            scope: scope.into(),
            credentials,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: None,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Base URL of the REST API: hostname without trailing slashes plus `/AAKRest`.
    pub fn base_url(&self) -> String {
        format!("{}/{}", self.hostname.trim_end_matches('/'), API_PATH)
    }

    /// Check that the configuration can be used to open a session.
    pub fn validate(&self) -> ArchivResult<()> {
        if self.hostname.trim().trim_end_matches('/').is_empty() {
            return Err(ArchivError::InvalidConfig(
                "hostname must not be empty".to_string(),
            ));
        }
        if self.user.is_empty() {
            return Err(ArchivError::InvalidConfig(
                "user must not be empty".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ArchivError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("hostname", &self.hostname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("scope", &self.scope)
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

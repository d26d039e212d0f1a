//! Transport configuration for the GCP HTTP client.
//!
//! [`ClientConfig`] carries the knobs that sit outside the request contract:
//! how the client identifies itself and how long the transport may wait.
//! Nothing here changes retry or token semantics.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use gcp_http::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .user_agent_prefix("janitor/0.3")
//!     .request_timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//!
//! assert!(config.user_agent().starts_with("janitor/0.3 | "));
//! ```

use std::time::Duration;

use crate::error::ConfigError;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product token used in the default `User-Agent`.
const USER_AGENT_PRODUCT: &str = "gcp-http-client";

/// Configuration for HTTP sessions and default request headers.
///
/// # Defaults
///
/// - `User-Agent`: `gcp-http-client/<version>`
/// - `X-Goog-API-Client`: `gl-rust/<rust-version> gccl/<version>`
/// - no request or connect timeout
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    user_agent_prefix: Option<String>,
    api_client: Option<String>,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the full `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> String {
        let prefix = self
            .user_agent_prefix
            .as_deref()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        format!("{prefix}{USER_AGENT_PRODUCT}/{SDK_VERSION}")
    }

    /// Returns the `X-Goog-API-Client` header value.
    #[must_use]
    pub fn api_client(&self) -> String {
        self.api_client.clone().unwrap_or_else(|| {
            let rust_version = env!("CARGO_PKG_RUST_VERSION");
            format!("gl-rust/{rust_version} gccl/{SDK_VERSION}")
        })
    }

    /// Returns the total request timeout applied to sessions built by the client.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Returns the connect timeout applied to sessions built by the client.
    #[must_use]
    pub const fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Builds a new HTTP session honouring the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SessionBuild`] if the TLS backend cannot be
    /// initialized.
    pub fn build_session(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder().use_rustls_tls().gzip(true);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        builder.build().map_err(|e| ConfigError::SessionBuild {
            reason: e.to_string(),
        })
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// All fields are optional.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    user_agent_prefix: Option<String>,
    api_client: Option<String>,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Sets a prefix for the `User-Agent` header (e.g. your app name and version).
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Overrides the `X-Goog-API-Client` header value.
    #[must_use]
    pub fn api_client(mut self, api_client: impl Into<String>) -> Self {
        self.api_client = Some(api_client.into());
        self
    }

    /// Sets the total per-request timeout for sessions the client creates.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout for sessions the client creates.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// Blank prefixes and API client values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeout`] if a timeout is zero.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidTimeout {
                field: "request_timeout",
            });
        }
        if self.connect_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidTimeout {
                field: "connect_timeout",
            });
        }

        Ok(ClientConfig {
            user_agent_prefix: self.user_agent_prefix.filter(|p| !p.trim().is_empty()),
            api_client: self.api_client.filter(|c| !c.trim().is_empty()),
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
        })
    }
}

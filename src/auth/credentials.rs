//! Service account credential store and access token lifecycle.
//!
//! [`CredentialStore`] loads a keyfile, resolves scopes, owns (or borrows) the
//! HTTP session, and manages the current [`AccessToken`]:
//!
//! ```text
//! no token --refresh--> valid --(time passes)--> expired --refresh--> valid ...
//! ```
//!
//! # Refresh
//!
//! [`CredentialStore::refresh_token`] always performs a network round trip:
//! it signs a fresh JWT-bearer assertion and posts it to the keyfile's
//! `token_uri`. On success the token and expiry are replaced together; on any
//! failure the previous state is left untouched.
//!
//! [`CredentialStore::ensure_valid_token`] is the precondition of every
//! outbound request. It only refreshes when the token is absent or expires
//! within 60 seconds. Refreshes are serialized, and a caller that waited on
//! another caller's refresh reuses its result instead of refreshing again.
//!
//! # Example
//!
//! ```rust,ignore
//! use gcp_http::CredentialStore;
//!
//! let store = CredentialStore::builder("/path/to/keyfile.json")
//!     .scopes(["ndev.clouddns.readwrite"])
//!     .build()?;
//!
//! assert!(store.access_token().await.token().is_none());
//! store.refresh_token().await?;
//! assert!(store.access_token().await.is_valid());
//! ```

use std::path::PathBuf;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::auth::assertion::{ServiceAccountCredentials, JWT_GRANT_TYPE};
use crate::auth::token::{AccessToken, TokenResponse};
use crate::auth::{AuthError, ScopeSet, ServiceAccountKey};
use crate::clients::{url_host, HttpError, HttpResponseError};
use crate::config::ClientConfig;
use crate::error::{ConfigError, Error};

/// Loads service account credentials and keeps an access token fresh.
///
/// Share it between clients with an [`Arc`](std::sync::Arc); token state is
/// shared by every request issued through the same store.
#[derive(Debug)]
pub struct CredentialStore {
    key: ServiceAccountKey,
    credentials: ServiceAccountCredentials,
    session: reqwest::Client,
    owns_session: bool,
    token: RwLock<AccessToken>,
    refresh_lock: Mutex<()>,
}

// Verify CredentialStore is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CredentialStore>();
};

impl CredentialStore {
    /// Creates a builder for a store backed by the keyfile at `keyfile`.
    #[must_use]
    pub fn builder(keyfile: impl Into<PathBuf>) -> CredentialStoreBuilder {
        CredentialStoreBuilder::new(keyfile.into())
    }

    /// Creates a store with the default scope and a new session.
    ///
    /// # Errors
    ///
    /// See [`CredentialStoreBuilder::build`].
    pub fn from_keyfile(keyfile: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Self::builder(keyfile).build()
    }

    /// Returns the parsed keyfile.
    #[must_use]
    pub const fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Returns the project id from the keyfile, if present.
    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.key.project_id.as_deref()
    }

    /// Returns the resolved scopes.
    #[must_use]
    pub const fn scopes(&self) -> &ScopeSet {
        self.credentials.scopes()
    }

    /// Returns the signing credentials.
    #[must_use]
    pub const fn credentials(&self) -> &ServiceAccountCredentials {
        &self.credentials
    }

    /// Returns the HTTP session used for token requests.
    #[must_use]
    pub const fn session(&self) -> &reqwest::Client {
        &self.session
    }

    /// Returns `true` if this store created its session rather than being given one.
    #[must_use]
    pub const fn owns_session(&self) -> bool {
        self.owns_session
    }

    /// Returns a snapshot of the current access token.
    pub async fn access_token(&self) -> AccessToken {
        self.token.read().await.clone()
    }

    /// Fetches a new access token from the token endpoint.
    ///
    /// # Errors
    ///
    /// - [`HttpError::Network`] if the endpoint cannot be reached
    /// - [`HttpError::Response`] if the endpoint answers with a non-2xx status
    /// - [`AuthError::MissingAccessToken`] if the response lacks `access_token`
    /// - [`AuthError::InvalidTokenResponse`] if the response is not JSON
    pub async fn refresh_token(&self) -> Result<(), Error> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await.map(|_| ())
    }

    /// Returns a token that stays valid for at least the expiry skew,
    /// refreshing first if needed.
    ///
    /// # Errors
    ///
    /// Any error from [`refresh_token`](Self::refresh_token).
    pub async fn ensure_valid_token(&self) -> Result<String, Error> {
        if let Some(token) = self.current_valid_token().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = self.current_valid_token().await {
            return Ok(token);
        }
        self.refresh_locked().await
    }

    async fn current_valid_token(&self) -> Option<String> {
        self.token.read().await.valid_token().map(str::to_owned)
    }

    /// Performs the refresh. Callers must hold `refresh_lock`.
    async fn refresh_locked(&self) -> Result<String, Error> {
        let url = self.credentials.token_uri();
        let host = url_host(url);
        let assertion = self.credentials.make_assertion()?;
        let form = [
            ("assertion", assertion.as_str()),
            ("grant_type", JWT_GRANT_TYPE),
        ];

        tracing::debug!(method = "POST", url, "Request");
        let response = self
            .session
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                let error = HttpError::network(&host, &e);
                tracing::error!("{error}");
                error
            })?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default();
        tracing::debug!(
            method = "POST",
            url,
            status = status.as_u16(),
            reason,
            "Response"
        );

        let body = response
            .text()
            .await
            .map_err(|e| HttpError::network(&host, &e))?;

        if !status.is_success() {
            let error = HttpError::Response(HttpResponseError {
                host,
                code: status.as_u16(),
                reason: reason.to_string(),
                message: body,
            });
            tracing::error!("{error}");
            return Err(error.into());
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::InvalidTokenResponse {
                reason: e.to_string(),
            })?;
        let expiry = parsed.expiry_from(Utc::now());
        let Some(token) = parsed.access_token.filter(|t| !t.is_empty()) else {
            let error = AuthError::MissingAccessToken;
            tracing::error!("{error}");
            return Err(error.into());
        };

        *self.token.write().await = AccessToken::new(token.clone(), expiry);
        Ok(token)
    }
}

/// Builder for [`CredentialStore`].
///
/// # Defaults
///
/// - scopes: `cloud-platform`
/// - session: a new session built from the [`ClientConfig`] (or its default)
#[derive(Debug)]
pub struct CredentialStoreBuilder {
    keyfile: PathBuf,
    scopes: Vec<String>,
    session: Option<reqwest::Client>,
    config: Option<ClientConfig>,
    subject: Option<String>,
}

impl CredentialStoreBuilder {
    fn new(keyfile: PathBuf) -> Self {
        Self {
            keyfile,
            scopes: Vec::new(),
            session: None,
            config: None,
            subject: None,
        }
    }

    /// Sets the short scope names to authorize (e.g. `ndev.clouddns.readwrite`).
    #[must_use]
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Reuses an existing HTTP session instead of creating one.
    #[must_use]
    pub fn session(mut self, session: reqwest::Client) -> Self {
        self.session = Some(session);
        self
    }

    /// Sets the configuration used when the store creates its own session.
    #[must_use]
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.config = Some(config.clone());
        self
    }

    /// Impersonates `subject` via domain-wide delegation.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Loads the keyfile and builds the store.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::KeyfileNotFound`], [`ConfigError::InvalidKeyfile`] or
    ///   [`ConfigError::UnreadableKeyfile`] if the keyfile cannot be loaded
    /// - [`ConfigError::InvalidScope`] if a scope name is blank
    /// - [`ConfigError::InvalidPrivateKey`] if the private key is unusable
    /// - [`ConfigError::SessionBuild`] if a new session cannot be created
    pub fn build(self) -> Result<CredentialStore, ConfigError> {
        let key = ServiceAccountKey::from_file(&self.keyfile)?;
        let scopes = ScopeSet::from_names(&self.scopes)?;

        let mut credentials = ServiceAccountCredentials::new(&key, scopes)?;
        if let Some(subject) = self.subject {
            credentials = credentials.with_subject(subject);
        }

        let (session, owns_session) = match self.session {
            Some(session) => (session, false),
            None => (
                self.config.unwrap_or_default().build_session()?,
                true,
            ),
        };

        Ok(CredentialStore {
            key,
            credentials,
            session,
            owns_session,
            token: RwLock::new(AccessToken::default()),
            refresh_lock: Mutex::new(()),
        })
    }
}

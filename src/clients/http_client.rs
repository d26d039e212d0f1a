//! HTTP client for Google Cloud REST APIs.
//!
//! This module provides the [`HttpClient`] type, which attaches a fresh bearer
//! token to every request, retries once when the API answers `401`, and turns
//! every failure into a typed error.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::auth::CredentialStore;
use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::{DataType, HttpMethod, HttpRequest};
use crate::config::ClientConfig;
use crate::error::Error;

/// Total attempts for one request: the original try plus one retry after a 401.
pub const MAX_REQUEST_ATTEMPTS: u32 = 2;

/// Status codes that trigger a token refresh and retry.
pub const REFRESH_STATUS_CODES: [u16; 1] = [401];

const AUTHORIZATION: &str = "Authorization";

/// Async HTTP client with service-account authentication.
///
/// The client handles:
/// - Default headers (`X-Goog-API-Client`, `Accept-Encoding`, `User-Agent`)
/// - A valid bearer token on every attempt
/// - One retry, with a forced token refresh, on `401 Unauthorized`
/// - Wrapping transport and HTTP failures in [`HttpError`]
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`. Clients built over the same
/// [`CredentialStore`] share its token and, by default, its session.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use gcp_http::{CredentialStore, HttpClient, HttpMethod, HttpRequest};
///
/// let store = Arc::new(CredentialStore::from_keyfile("/path/to/keyfile.json")?);
/// let client = HttpClient::new(store, None, None);
///
/// let request = HttpRequest::builder(HttpMethod::Get, "https://dns.googleapis.com/dns/v1/projects/p/managedZones")
///     .build()?;
/// let body = client.request(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    credentials: Arc<CredentialStore>,
    session: reqwest::Client,
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new client over `credentials`.
    ///
    /// # Arguments
    ///
    /// * `credentials` - The store providing access tokens
    /// * `session` - Optional session; defaults to the store's session
    /// * `config` - Optional configuration for the `User-Agent` and
    ///   `X-Goog-API-Client` headers
    #[must_use]
    pub fn new(
        credentials: Arc<CredentialStore>,
        session: Option<reqwest::Client>,
        config: Option<&ClientConfig>,
    ) -> Self {
        let session = session.unwrap_or_else(|| credentials.session().clone());

        let default_config = ClientConfig::default();
        let config = config.unwrap_or(&default_config);

        let mut default_headers = HashMap::new();
        default_headers.insert("X-Goog-API-Client".to_string(), config.api_client());
        default_headers.insert("Accept-Encoding".to_string(), "gzip".to_string());
        default_headers.insert("User-Agent".to_string(), config.user_agent());
        default_headers.insert(AUTHORIZATION.to_string(), String::new());

        Self {
            credentials,
            session,
            default_headers,
        }
    }

    /// Returns the credential store backing this client.
    #[must_use]
    pub const fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Returns the HTTP session used for API requests.
    #[must_use]
    pub const fn session(&self) -> &reqwest::Client {
        &self.session
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends a request and returns the response body as text.
    ///
    /// Each attempt merges the request's own headers over the defaults,
    /// ensures a valid token and sets `Authorization: Bearer <token>`. A `401`
    /// on the first attempt forces a token refresh and a second attempt built
    /// from the original request.
    ///
    /// # Errors
    ///
    /// - [`HttpError::InvalidRequest`] if the request fails validation
    /// - [`HttpError::Network`] if no response was received
    /// - [`HttpError::Response`] for a non-2xx status (including a second `401`)
    /// - any error from refreshing the token
    pub async fn request(&self, request: HttpRequest) -> Result<String, Error> {
        request.verify().map_err(HttpError::from)?;

        let host = request.host();
        let method = request.http_method;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let mut headers = self.merge_headers(&request);
            let token = self.credentials.ensure_valid_token().await?;
            insert_header(&mut headers, AUTHORIZATION, format!("Bearer {token}"));

            let response = self.send(&request, &headers).await.map_err(|e| {
                let error = HttpError::network(&host, &e);
                tracing::error!("{error}");
                error
            })?;

            let status = response.status();
            let reason = status.canonical_reason().unwrap_or_default();
            tracing::debug!(
                method = %method,
                url = %request.url,
                status = status.as_u16(),
                reason,
                "Response"
            );

            if REFRESH_STATUS_CODES.contains(&status.as_u16()) && attempt < MAX_REQUEST_ATTEMPTS {
                tracing::info!(
                    attempt,
                    "Unauthorized. Attempting to refresh token and try again."
                );
                self.credentials.refresh_token().await?;
                continue;
            }

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

            return Ok(body);
        }
    }

    /// Sends a `GET` request and decodes the JSON response body.
    ///
    /// # Errors
    ///
    /// Any error from [`request`](Self::request), or [`HttpError::Decode`] if
    /// the body is not valid JSON for `T`.
    pub async fn get_json<T>(
        &self,
        url: &str,
        query: Option<HashMap<String, String>>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned + Send,
    {
        self.get_json_with(url, query, |body| serde_json::from_str(body))
            .await
    }

    /// Sends a `GET` request and decodes the body with a custom decoder.
    ///
    /// # Errors
    ///
    /// Any error from [`request`](Self::request), or [`HttpError::Decode`] if
    /// `decode` fails.
    pub async fn get_json_with<T, F>(
        &self,
        url: &str,
        query: Option<HashMap<String, String>>,
        decode: F,
    ) -> Result<T, Error>
    where
        T: Send,
        F: FnOnce(&str) -> serde_json::Result<T> + Send,
    {
        let mut builder = HttpRequest::builder(HttpMethod::Get, url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        let request = builder.build().map_err(HttpError::from)?;
        let host = request.host();

        let body = self.request(request).await?;
        decode(&body).map_err(|e| {
            HttpError::Decode {
                host,
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Merges the request's headers over the defaults for one attempt.
    fn merge_headers(&self, request: &HttpRequest) -> HashMap<String, String> {
        let mut headers = self.default_headers.clone();
        if let Some(body_type) = &request.body_type {
            insert_header(
                &mut headers,
                "Content-Type",
                body_type.as_content_type().to_string(),
            );
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                insert_header(&mut headers, key, value.clone());
            }
        }
        headers
    }

    async fn send(
        &self,
        request: &HttpRequest,
        headers: &HashMap<String, String>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut req_builder = self
            .session
            .request(request.http_method.as_reqwest(), &request.url);

        for (key, value) in headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }

        if let Some(body) = &request.body {
            req_builder = match request.body_type {
                Some(DataType::Form) => req_builder.form(body),
                _ => req_builder.body(body.to_string()),
            };
        }

        tracing::debug!(method = %request.http_method, url = %request.url, "Request");
        req_builder.send().await
    }
}

/// Inserts a header, replacing any existing entry with the same name in any case.
fn insert_header(headers: &mut HashMap<String, String>, key: &str, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(key));
    headers.insert(key.to_string(), value);
}

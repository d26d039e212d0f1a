//! HTTP client types for Google Cloud API communication.
//!
//! This module provides the authenticated HTTP layer that API-specific
//! clients are built on. It attaches bearer tokens, merges default headers,
//! recovers from a rejected token once and aggregates paginated listings.
//!
//! # Overview
//!
//! - [`HttpClient`]: the async client that sends authenticated requests
//! - [`HttpRequest`]: a request to be sent to an API
//! - [`HttpMethod`]: supported HTTP methods
//! - [`DataType`]: content types for request bodies
//! - [`Paginate`]: `list_all` over `nextPageToken` continuation
//! - [`HttpError`]: failures of a request
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gcp_http::CredentialStore;
//! use gcp_http::clients::{HttpClient, HttpMethod, HttpRequest};
//!
//! let credentials = Arc::new(CredentialStore::from_keyfile("/path/to/keyfile.json")?);
//! let client = HttpClient::new(credentials, None, None);
//!
//! let request = HttpRequest::builder(
//!     HttpMethod::Get,
//!     "https://dns.googleapis.com/dns/v1/projects/my-project/managedZones",
//! )
//! .build()?;
//!
//! let body = client.request(request).await?;
//! ```
//!
//! # Retry Behavior
//!
//! A `401 Unauthorized` response forces a token refresh and the request is
//! sent once more. No other status is retried, and a second `401` is
//! returned to the caller as an [`HttpError::Response`].

mod errors;
mod http_client;
mod http_request;
mod pagination;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{HttpClient, MAX_REQUEST_ATTEMPTS, REFRESH_STATUS_CODES};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use pagination::{FetchJson, Paginate, NEXT_PAGE_TOKEN_FIELD, PAGE_TOKEN_PARAM};

pub(crate) use http_request::url_host;

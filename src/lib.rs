//! # GCP HTTP Client
//!
//! An async HTTP layer for Google Cloud REST APIs, authenticated with
//! service account credentials.
//!
//! ## Overview
//!
//! This crate provides:
//! - Service account keyfile loading and OAuth scope resolution
//! - JWT-bearer token acquisition with proactive refresh 60 seconds before expiry
//! - A single forced refresh and retry when an API answers `401 Unauthorized`
//! - Typed errors: [`ConfigError`], [`AuthError`] and [`HttpError`]
//! - Aggregation of paginated listings via `nextPageToken`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gcp_http::{CredentialStore, HttpClient};
//!
//! let credentials = Arc::new(
//!     CredentialStore::builder("/path/to/keyfile.json")
//!         .scopes(["ndev.clouddns.readwrite"])
//!         .build()?,
//! );
//! let client = HttpClient::new(credentials, None, None);
//!
//! let zones: serde_json::Value = client
//!     .get_json("https://dns.googleapis.com/dns/v1/projects/my-project/managedZones", None)
//!     .await?;
//! ```
//!
//! ## Pagination
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use gcp_http::Paginate;
//!
//! let pages = client
//!     .list_all("https://dns.googleapis.com/dns/v1/projects/my-project/managedZones", &HashMap::new())
//!     .await?;
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use std::time::Duration;
//! use gcp_http::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .user_agent_prefix("my-app/1.0")
//!     .request_timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//! assert!(config.user_agent().starts_with("my-app/1.0 | gcp-http-client/"));
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: credentials and sessions are passed explicitly
//! - **Fail-fast validation**: keyfiles, scopes and keys are checked at construction
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;

// Re-export public types at crate root for convenience
pub use auth::{
    AccessToken, AuthError, CredentialStore, CredentialStoreBuilder, ScopeSet,
    ServiceAccountCredentials, ServiceAccountKey,
};
pub use config::{ClientConfig, ClientConfigBuilder, SDK_VERSION};
pub use error::{ConfigError, Error};

// Re-export HTTP client types
pub use clients::{
    DataType, FetchJson, HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder,
    HttpResponseError, InvalidHttpRequestError, Paginate,
};

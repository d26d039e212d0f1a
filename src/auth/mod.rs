//! Service account authentication for Google Cloud APIs.
//!
//! This module loads service account keys, resolves OAuth scopes, signs
//! JWT-bearer assertions and keeps an access token fresh.
//!
//! # Overview
//!
//! - [`CredentialStore`]: loads a keyfile and manages the token lifecycle
//! - [`ServiceAccountKey`]: the parsed keyfile
//! - [`ServiceAccountCredentials`]: signs authorization grant assertions
//! - [`ScopeSet`]: ordered, fully qualified scope URIs
//! - [`AccessToken`]: the current token and its expiry
//! - [`AuthError`]: token endpoint responses that could not be used
//!
//! Only service account (JWT-bearer) credentials are supported.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gcp_http::CredentialStore;
//!
//! let store = Arc::new(
//!     CredentialStore::builder("/path/to/keyfile.json")
//!         .scopes(["ndev.clouddns.readwrite"])
//!         .build()?,
//! );
//! let token = store.ensure_valid_token().await?;
//! ```

mod assertion;
mod credentials;
mod error;
mod scopes;
mod service_account;
mod token;

pub use assertion::{ServiceAccountCredentials, ASSERTION_LIFETIME_SECS, JWT_GRANT_TYPE};
pub use credentials::{CredentialStore, CredentialStoreBuilder};
pub use error::AuthError;
pub use scopes::{ScopeSet, DEFAULT_SCOPE, SCOPE_TEMPLATE_URL};
pub use service_account::ServiceAccountKey;
pub use token::{
    AccessToken, TokenResponse, DEFAULT_TOKEN_LIFETIME_SECS, TOKEN_EXPIRY_SKEW_SECS,
};

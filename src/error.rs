//! Error types for the GCP HTTP client.
//!
//! This module contains [`ConfigError`] for static configuration defects and
//! the crate-wide [`Error`] that fallible async operations return.
//!
//! # Error Kinds
//!
//! Callers see exactly one of three kinds:
//!
//! - [`ConfigError`]: keyfile missing or malformed, bad scopes, bad timeouts.
//!   Raised at construction and never retried.
//! - [`AuthError`]: the token endpoint answered but the response did not carry
//!   a usable access token.
//! - [`HttpError`]: a non-2xx response (after the single 401 retry) or a
//!   transport failure, including during token refresh.
//!
//! # Example
//!
//! ```rust
//! use gcp_http::{ConfigError, Error};
//!
//! let error: Error = ConfigError::InvalidScope { scope: " ".to_string() }.into();
//! assert!(matches!(error, Error::Config(ConfigError::InvalidScope { .. })));
//! ```

use crate::auth::AuthError;
use crate::clients::HttpError;
use thiserror::Error;

/// Errors that can occur while configuring a client.
///
/// Each variant carries enough context (usually the offending path or value)
/// to be actionable on its own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The service account keyfile does not exist.
    #[error("Keyfile {path} was not found.")]
    KeyfileNotFound {
        /// The path that was looked up.
        path: String,
    },

    /// The keyfile exists but is not a valid service account key.
    #[error("Keyfile {path} is not valid JSON. {reason}")]
    InvalidKeyfile {
        /// The path of the keyfile.
        path: String,
        /// Why parsing failed.
        reason: String,
    },

    /// The keyfile exists but could not be read.
    #[error("Keyfile {path} could not be read: {reason}")]
    UnreadableKeyfile {
        /// The path of the keyfile.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// The private key in the keyfile is not a usable RSA PEM key.
    #[error("Invalid service account private key: {reason}")]
    InvalidPrivateKey {
        /// Why the key was rejected.
        reason: String,
    },

    /// A scope name is empty or blank.
    #[error("Invalid scope '{scope}'. Scope names must not be empty.")]
    InvalidScope {
        /// The rejected scope name.
        scope: String,
    },

    /// A timeout was configured as zero.
    #[error("Invalid {field}: timeouts must be greater than zero.")]
    InvalidTimeout {
        /// The name of the timeout setting.
        field: &'static str,
    },

    /// The HTTP session could not be created.
    #[error("Failed to create HTTP session: {reason}")]
    SessionBuild {
        /// The underlying builder failure.
        reason: String,
    },
}

/// Unified error type for client operations.
///
/// Token refresh, requests, JSON fetching and pagination all return this
/// type so that a refresh failure in the middle of a request surfaces with
/// its original kind.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration defect.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The token endpoint response was unusable.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An HTTP or transport failure.
    #[error(transparent)]
    Http(#[from] HttpError),
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConfigError>();
    assert_send_sync::<Error>();
};

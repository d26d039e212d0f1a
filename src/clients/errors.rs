//! HTTP-specific error types.
//!
//! Transport exceptions never cross this boundary: every failure is converted
//! into an [`HttpError`] that names the target host and the underlying reason.
//!
//! # Example
//!
//! ```rust,ignore
//! use gcp_http::{Error, HttpError};
//!
//! match client.request(request).await {
//!     Ok(body) => println!("{body}"),
//!     Err(Error::Http(HttpError::Response(e))) => {
//!         println!("{} answered {} {}", e.host, e.code, e.reason);
//!     }
//!     Err(Error::Http(HttpError::Network { host, reason })) => {
//!         println!("Could not reach {host}: {reason}");
//!     }
//!     Err(e) => println!("{e}"),
//! }
//! ```

use thiserror::Error;

/// Error returned when a request receives a non-successful response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Issue connecting to {host}: {code} {reason}")]
pub struct HttpResponseError {
    /// Host of the request URL.
    pub host: String,
    /// The HTTP status code of the response.
    pub code: u16,
    /// The canonical reason phrase (e.g. `Unauthorized`).
    pub reason: String,
    /// The response body, kept for diagnostics.
    pub message: String,
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// The URL could not be parsed.
    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A form-encoded body must be a JSON object with scalar values.
    #[error("Form-encoded request bodies must be flat JSON objects of strings, numbers or booleans.")]
    InvalidFormBody,

    /// A caller header has a name or value that cannot go on the wire.
    #[error("Invalid request header '{name}': {reason}")]
    InvalidHeader {
        /// The rejected header name.
        name: String,
        /// Why the name or value was rejected.
        reason: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response, after the single unauthorized retry if any.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// The request never produced a response (DNS, connect, TLS, timeout, body read).
    #[error("Issue connecting to {host}: {reason}")]
    Network {
        /// Host of the request URL.
        host: String,
        /// The transport failure.
        reason: String,
    },

    /// A successful response body could not be decoded.
    #[error("Could not decode response from {host}: {reason}")]
    Decode {
        /// Host of the request URL.
        host: String,
        /// The decoding failure.
        reason: String,
    },

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),
}

impl HttpError {
    /// Wraps a transport error without leaking its type.
    pub(crate) fn network(host: &str, error: &reqwest::Error) -> Self {
        Self::Network {
            host: host.to_string(),
            reason: error.to_string(),
        }
    }

    /// Returns the status code if this error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            _ => None,
        }
    }
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};

//! Authentication error types.

use thiserror::Error;

/// Errors raised while obtaining an access token.
///
/// Transport failures and non-2xx token endpoint responses are reported as
/// [`HttpError`](crate::clients::HttpError) instead; this type covers
/// responses that arrived successfully but could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token endpoint responded without an `access_token`.
    #[error("No access token in response.")]
    MissingAccessToken,

    /// The token endpoint response body was not valid JSON.
    #[error("Invalid token response: {reason}")]
    InvalidTokenResponse {
        /// Why decoding failed.
        reason: String,
    },

    /// The JWT-bearer assertion could not be signed.
    #[error("Failed to sign authorization grant assertion: {reason}")]
    Assertion {
        /// The underlying signing failure.
        reason: String,
    },
}

// Verify AuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};

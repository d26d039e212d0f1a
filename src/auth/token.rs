//! Access token state and token endpoint responses.
//!
//! [`AccessToken`] is the value the token manager swaps on every successful
//! refresh. [`TokenResponse`] is the JSON body returned by the OAuth token
//! endpoint.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Safety margin subtracted from a token's expiry when checking validity.
pub const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// The current OAuth access token and its expiry.
///
/// Either both fields are set or neither is. A present token whose expiry is
/// within [`TOKEN_EXPIRY_SKEW_SECS`] of now is treated as invalid.
///
/// # Security
///
/// The `Debug` implementation masks the token value.
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use gcp_http::AccessToken;
///
/// let empty = AccessToken::default();
/// assert!(!empty.is_valid());
///
/// let token = AccessToken::new("ya29.c0ffee", Utc::now() + Duration::seconds(3600));
/// assert!(token.is_valid());
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccessToken {
    token: Option<String>,
    expiry: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a token that expires at `expiry` (UTC).
    #[must_use]
    pub fn new(token: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            token: Some(token.into()),
            expiry: Some(expiry),
        }
    }

    /// Returns the token string, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the expiry timestamp, if any.
    #[must_use]
    pub const fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Returns `true` if the token is present and outlives `now` plus the skew.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.expiry) {
            (Some(token), Some(expiry)) => {
                !token.is_empty() && expiry > now + Duration::seconds(TOKEN_EXPIRY_SKEW_SECS)
            }
            _ => false,
        }
    }

    /// Returns `true` if the token is valid right now.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Returns the token string if it is valid right now.
    #[must_use]
    pub fn valid_token(&self) -> Option<&str> {
        if self.is_valid() {
            self.token()
        } else {
            None
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &self.token.as_ref().map(|_| "*****"))
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Body of a successful token endpoint response.
///
/// Only the fields the client needs are decoded. `access_token` is optional
/// here so that its absence can be reported as an auth error rather than a
/// decoding error.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// The issued access token.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Lifetime of the token in seconds.
    #[serde(default, deserialize_with = "deserialize_expires_in")]
    pub expires_in: Option<i64>,

    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Computes the expiry relative to `now`.
    ///
    /// Uses `expires_in` when present, otherwise [`DEFAULT_TOKEN_LIFETIME_SECS`].
    /// Negative lifetimes yield an already-expired token.
    #[must_use]
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let lifetime = self
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            .max(0);
        Duration::try_seconds(lifetime)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Accepts `expires_in` as a JSON number (integer or float) or a numeric
/// string. Fractional seconds are truncated.
fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(seconds)) => Ok(Some(seconds)),
        Some(Raw::Float(seconds)) => Ok(Some(whole_seconds(seconds))),
        Some(Raw::Str(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(whole_seconds))
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid expires_in: {s:?}")))
        }
    }
}

// `as` saturates at the i64 bounds and maps NaN to 0.
#[allow(clippy::cast_possible_truncation)]
fn whole_seconds(seconds: f64) -> i64 {
    seconds.trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_token_is_empty_and_invalid() {
        let token = AccessToken::default();
        assert!(token.token().is_none());
        assert!(token.expiry().is_none());
        assert!(!token.is_valid());
        assert!(token.valid_token().is_none());
    }

    #[test]
    fn test_token_inside_skew_window_is_invalid() {
        let now = Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap();
        let token = AccessToken::new("c0ffe3", now + Duration::seconds(30));
        assert!(!token.is_valid_at(now));
    }

    #[test]
    fn test_token_outside_skew_window_is_valid() {
        let now = Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap();
        let token = AccessToken::new("c0ffe3", now + Duration::seconds(120));
        assert!(token.is_valid_at(now));
    }

    #[test]
    fn test_token_exactly_at_skew_is_invalid() {
        let now = Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap();
        let token = AccessToken::new("c0ffe3", now + Duration::seconds(TOKEN_EXPIRY_SKEW_SECS));
        assert!(!token.is_valid_at(now));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let token = AccessToken::new("c0ffe3", Utc::now() - Duration::seconds(10));
        assert!(!token.is_valid());
    }

    #[test]
    fn test_empty_token_string_is_invalid() {
        let token = AccessToken::new("", Utc::now() + Duration::seconds(3600));
        assert!(!token.is_valid());
    }

    #[test]
    fn test_debug_masks_token() {
        let token = AccessToken::new("super-secret", Utc::now());
        let debug = format!("{token:?}");
        assert!(debug.contains("*****"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_token_response_expiry_from_integer() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"c0ffe3","expires_in":3599,"token_type":"Bearer"}"#)
                .unwrap();
        let now = Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(response.access_token.as_deref(), Some("c0ffe3"));
        assert_eq!(response.expiry_from(now), now + Duration::seconds(3599));
    }

    #[test]
    fn test_token_response_expiry_from_string() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"c0ffe3","expires_in":"120"}"#).unwrap();
        assert_eq!(response.expires_in, Some(120));
    }

    #[test]
    fn test_token_response_expiry_from_float() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"c0ffe3","expires_in":3599.0}"#).unwrap();
        assert_eq!(response.access_token.as_deref(), Some("c0ffe3"));
        assert_eq!(response.expires_in, Some(3599));

        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"c0ffe3","expires_in":59.9}"#).unwrap();
        assert_eq!(response.expires_in, Some(59));

        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"c0ffe3","expires_in":"120.5"}"#).unwrap();
        assert_eq!(response.expires_in, Some(120));
    }

    #[test]
    fn test_token_response_rejects_non_numeric_expires_in() {
        let result: Result<TokenResponse, _> =
            serde_json::from_str(r#"{"access_token":"c0ffe3","expires_in":"soon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_token_response_without_expires_in_uses_default_lifetime() {
        let response: TokenResponse = serde_json::from_str(r#"{"access_token":"c0ffe3"}"#).unwrap();
        let now = Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            response.expiry_from(now),
            now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS)
        );
    }

    #[test]
    fn test_token_response_without_access_token_still_decodes() {
        let response: TokenResponse = serde_json::from_str(r#"{"expires_in":3600}"#).unwrap();
        assert!(response.access_token.is_none());
    }
}

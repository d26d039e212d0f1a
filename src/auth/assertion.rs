//! JWT-bearer assertions for the service account grant.
//!
//! [`ServiceAccountCredentials`] holds the parsed signing key and the claims
//! that do not change between refreshes. Each call to
//! [`ServiceAccountCredentials::make_assertion`] produces a freshly signed JWT
//! suitable for the `assertion` field of an OAuth token request.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::auth::{AuthError, ScopeSet, ServiceAccountKey};
use crate::error::ConfigError;

/// Grant type for the JWT-bearer token request.
pub const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of a signed assertion, in seconds.
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Claims of the signed assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
}

/// Signing identity derived from a service account key and scopes.
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    issuer: String,
    token_uri: String,
    key_id: Option<String>,
    scopes: ScopeSet,
    subject: Option<String>,
    signing_key: EncodingKey,
}

impl ServiceAccountCredentials {
    /// Builds credentials from key material and resolved scopes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrivateKey`] if the private key is not a
    /// PEM-encoded RSA key.
    pub fn new(key: &ServiceAccountKey, scopes: ScopeSet) -> Result<Self, ConfigError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            let error = ConfigError::InvalidPrivateKey {
                reason: e.to_string(),
            };
            tracing::error!("{error}");
            error
        })?;

        Ok(Self {
            issuer: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            key_id: key.private_key_id.clone(),
            scopes,
            subject: None,
            signing_key,
        })
    }

    /// Returns a copy that impersonates `subject` (domain-wide delegation).
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Returns the issuer (service account email).
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the token endpoint, which is also the assertion audience.
    #[must_use]
    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// Returns the authorized scopes.
    #[must_use]
    pub const fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    /// Returns the delegated subject, if any.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Signs a new RS256 authorization grant assertion.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Assertion`] if signing fails.
    pub fn make_assertion(&self) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.issuer,
            scope: self.scopes.to_string(),
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
            sub: self.subject.as_deref(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key_id);

        encode(&header, &claims, &self.signing_key).map_err(|e| AuthError::Assertion {
            reason: e.to_string(),
        })
    }
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("issuer", &self.issuer)
            .field("token_uri", &self.token_uri)
            .field("key_id", &self.key_id)
            .field("scopes", &self.scopes)
            .field("subject", &self.subject)
            .field("signing_key", &"*****")
            .finish()
    }
}

// Verify ServiceAccountCredentials is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServiceAccountCredentials>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
    use serde::Deserialize;

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/service_account_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/service_account_key.pub.pem");

    #[derive(Debug, Deserialize)]
    struct DecodedClaims {
        iss: String,
        scope: String,
        aud: String,
        iat: i64,
        exp: i64,
        sub: Option<String>,
    }

    fn test_key(private_key: &str) -> ServiceAccountKey {
        serde_json::from_value(serde_json::json!({
            "type": "service_account",
            "project_id": "a-test-project",
            "private_key_id": "key-1",
            "private_key": private_key,
            "client_email": "test-key@a-test-project.iam.gserviceaccount.com",
            "token_uri": "https://example.com/token"
        }))
        .unwrap()
    }

    fn decode_claims(assertion: &str) -> DecodedClaims {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://example.com/token"]);
        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
        decode::<DecodedClaims>(assertion, &key, &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn test_assertion_carries_expected_claims() {
        let scopes = ScopeSet::from_names(["ndev.clouddns.readwrite", "cloud-platform"]).unwrap();
        let creds = ServiceAccountCredentials::new(&test_key(PRIVATE_KEY), scopes).unwrap();

        let assertion = creds.make_assertion().unwrap();
        let claims = decode_claims(&assertion);

        assert_eq!(claims.iss, "test-key@a-test-project.iam.gserviceaccount.com");
        assert_eq!(claims.aud, "https://example.com/token");
        assert_eq!(
            claims.scope,
            "https://www.googleapis.com/auth/ndev.clouddns.readwrite https://www.googleapis.com/auth/cloud-platform"
        );
        assert_eq!(claims.exp - claims.iat, ASSERTION_LIFETIME_SECS);
        assert!(claims.sub.is_none());
    }

    #[test]
    fn test_assertion_header_has_key_id() {
        let creds =
            ServiceAccountCredentials::new(&test_key(PRIVATE_KEY), ScopeSet::default()).unwrap();
        let header = decode_header(&creds.make_assertion().unwrap()).unwrap();

        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));
    }

    #[test]
    fn test_subject_is_included_when_set() {
        let creds = ServiceAccountCredentials::new(&test_key(PRIVATE_KEY), ScopeSet::default())
            .unwrap()
            .with_subject("admin@example.com");

        let claims = decode_claims(&creds.make_assertion().unwrap());
        assert_eq!(claims.sub.as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn test_invalid_private_key_is_config_error() {
        let result = ServiceAccountCredentials::new(&test_key("nope"), ScopeSet::default());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPrivateKey { .. })
        ));
    }

    #[test]
    fn test_debug_masks_signing_key() {
        let creds =
            ServiceAccountCredentials::new(&test_key(PRIVATE_KEY), ScopeSet::default()).unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("signing_key: \"*****\""));
        assert!(debug.contains("test-key@a-test-project"));
    }
}

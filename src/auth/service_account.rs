//! Service account keyfile loading.
//!
//! A service account keyfile is the JSON document downloaded from the Google
//! Cloud console. Only the fields needed to sign a JWT-bearer assertion are
//! required; the rest are kept for callers that want them (e.g. `project_id`).

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Parsed service account key material.
///
/// # Security
///
/// The `Debug` implementation masks the private key.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ServiceAccountKey {
    /// Key type, normally `service_account`.
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,

    /// Project the service account belongs to.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Identifier of the private key, sent as the JWT `kid`.
    #[serde(default)]
    pub private_key_id: Option<String>,

    /// PEM-encoded RSA private key.
    pub private_key: String,

    /// Service account email, used as the JWT issuer.
    pub client_email: String,

    /// Numeric client identifier.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Authorization endpoint.
    #[serde(default)]
    pub auth_uri: Option<String>,

    /// OAuth token endpoint the assertion is posted to.
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Reads and parses a keyfile.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::KeyfileNotFound`] if `path` does not exist
    /// - [`ConfigError::InvalidKeyfile`] if the content is not valid JSON or
    ///   lacks a required field
    /// - [`ConfigError::UnreadableKeyfile`] for any other I/O failure
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let contents = std::fs::read_to_string(path).map_err(|e| {
            let error = if e.kind() == ErrorKind::NotFound {
                ConfigError::KeyfileNotFound {
                    path: display.clone(),
                }
            } else {
                ConfigError::UnreadableKeyfile {
                    path: display.clone(),
                    reason: e.to_string(),
                }
            };
            tracing::error!(error = %e, "{error}");
            error
        })?;

        Self::from_json(&contents).map_err(|reason| {
            let error = ConfigError::InvalidKeyfile {
                path: display,
                reason,
            };
            tracing::error!("{error}");
            error
        })
    }

    fn from_json(contents: &str) -> Result<Self, String> {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"*****")
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

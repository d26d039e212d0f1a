//! OAuth scope handling for Google Cloud APIs.
//!
//! This module provides the [`ScopeSet`] type, which turns short scope names
//! such as `cloud-platform` or `ndev.clouddns.readwrite` into the fully
//! qualified URIs a service account must request.

use crate::error::ConfigError;
use std::fmt;

/// Template URL for Google auth scopes.
pub const SCOPE_TEMPLATE_URL: &str = "https://www.googleapis.com/auth/";

/// Scope used when none are given.
pub const DEFAULT_SCOPE: &str = "cloud-platform";

/// An ordered set of fully qualified authorization scopes.
///
/// Unlike a hash set, order is part of the value: scopes appear in the JWT
/// assertion exactly as they were given.
///
/// # Example
///
/// ```rust
/// use gcp_http::ScopeSet;
///
/// let scopes = ScopeSet::from_names(["ndev.clouddns.readwrite", "compute.readonly"]).unwrap();
/// assert_eq!(
///     scopes.as_slice(),
///     [
///         "https://www.googleapis.com/auth/ndev.clouddns.readwrite",
///         "https://www.googleapis.com/auth/compute.readonly",
///     ]
/// );
///
/// let default = ScopeSet::default();
/// assert_eq!(default.as_slice(), ["https://www.googleapis.com/auth/cloud-platform"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeSet {
    scopes: Vec<String>,
}

impl ScopeSet {
    /// Resolves short scope names into scope URIs, preserving order.
    ///
    /// Leading and trailing whitespace is stripped from each name before it
    /// is templated, so `" compute.readonly "` resolves like
    /// `"compute.readonly"`. Duplicates are kept. An empty input resolves to
    /// [`DEFAULT_SCOPE`] alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidScope`] if any name is blank.
    pub fn from_names<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scopes = Vec::new();
        for name in names {
            let name = name.as_ref();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::InvalidScope {
                    scope: name.to_string(),
                });
            }
            scopes.push(Self::template(trimmed));
        }

        if scopes.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self { scopes })
    }

    fn template(name: &str) -> String {
        format!("{SCOPE_TEMPLATE_URL}{name}")
    }

    /// Returns the scope URIs in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.scopes
    }

    /// Returns an iterator over the scope URIs.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Always `false`: a resolved scope set holds at least the default scope.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl Default for ScopeSet {
    fn default() -> Self {
        Self {
            scopes: vec![Self::template(DEFAULT_SCOPE)],
        }
    }
}

/// Space-delimited, as used in the `scope` claim.
impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scopes.join(" "))
    }
}

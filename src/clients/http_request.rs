//! Outbound request description.
//!
//! An [`HttpRequest`] names everything a Google API call needs before the
//! client adds credentials: method, absolute URL, optional body and its
//! encoding, query string and caller headers. [`HttpRequest::verify`] rejects
//! anything that could not be put on the wire, so transport errors only
//! describe the network.

use std::collections::HashMap;
use std::fmt;

use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;

use crate::clients::errors::InvalidHttpRequestError;

/// Verb of a Google API call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// Reads a resource or a collection page.
    Get,
    /// Creates a resource or submits a change set.
    Post,
    /// Replaces a resource.
    Put,
    /// Updates selected fields of a resource.
    Patch,
    /// Deletes a resource.
    Delete,
}

impl HttpMethod {
    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding of a request body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// Sent as `application/json`; the usual encoding for Google APIs.
    Json,
    /// Sent as `application/x-www-form-urlencoded`; values must be scalars.
    Form,
}

impl DataType {
    /// `Content-Type` header value for bodies of this encoding.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
        }
    }
}

/// A call to a Google Cloud REST endpoint, before authentication.
///
/// `url` is absolute; the client does not prepend a base path.
///
/// # Example
///
/// ```rust
/// use gcp_http::clients::{DataType, HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let list = HttpRequest::builder(HttpMethod::Get, "https://dns.googleapis.com/dns/v1/projects/p/managedZones")
///     .query_param("maxResults", "100")
///     .build()
///     .unwrap();
///
/// let change = HttpRequest::builder(HttpMethod::Post, "https://dns.googleapis.com/dns/v1/projects/p/managedZones/z/changes")
///     .body(json!({"additions": []}))
///     .body_type(DataType::Json)
///     .build()
///     .unwrap();
/// # let _ = (list, change);
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// Verb of the call.
    pub http_method: HttpMethod,
    /// Absolute endpoint URL.
    pub url: String,
    /// Payload, encoded according to `body_type`.
    pub body: Option<Value>,
    /// Encoding of `body`; required whenever `body` is set.
    pub body_type: Option<DataType>,
    /// Query string parameters such as `maxResults` or `pageToken`.
    pub query: Option<HashMap<String, String>>,
    /// Caller headers, merged over the client defaults.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl HttpRequest {
    /// Starts describing a `method` call to `url`.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder {
            request: Self {
                http_method: method,
                url: url.into(),
                body: None,
                body_type: None,
                query: None,
                extra_headers: None,
            },
        }
    }

    /// Checks that the request can be sent as described.
    ///
    /// # Errors
    ///
    /// - [`InvalidHttpRequestError::MissingBodyType`] for a body without an encoding
    /// - [`InvalidHttpRequestError::InvalidFormBody`] for a form body that is
    ///   not an object of strings, numbers or booleans
    /// - [`InvalidHttpRequestError::InvalidUrl`] for a URL that is not absolute
    /// - [`InvalidHttpRequestError::InvalidHeader`] for a caller header whose
    ///   name or value is not valid HTTP
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        match (&self.body, self.body_type) {
            (Some(_), None) => return Err(InvalidHttpRequestError::MissingBodyType),
            (Some(body), Some(DataType::Form)) if !is_flat_form(body) => {
                return Err(InvalidHttpRequestError::InvalidFormBody);
            }
            _ => {}
        }

        reqwest::Url::parse(&self.url).map_err(|e| InvalidHttpRequestError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        for (name, value) in self.extra_headers.iter().flatten() {
            verify_header(name, value)?;
        }

        Ok(())
    }

    /// Returns the host of the request URL, or the raw URL if it has none.
    #[must_use]
    pub fn host(&self) -> String {
        url_host(&self.url)
    }
}

/// Extracts the host of `url` for error reporting.
pub(crate) fn url_host(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

fn is_flat_form(body: &Value) -> bool {
    body.as_object().is_some_and(|fields| {
        fields
            .values()
            .all(|value| value.is_string() || value.is_number() || value.is_boolean())
    })
}

fn verify_header(name: &str, value: &str) -> Result<(), InvalidHttpRequestError> {
    let invalid = |reason: String| InvalidHttpRequestError::InvalidHeader {
        name: name.to_string(),
        reason,
    };
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

/// Incrementally describes an [`HttpRequest`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    /// Attaches a payload. Pair it with [`body_type`](Self::body_type).
    #[must_use]
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// Chooses how the payload is encoded.
    #[must_use]
    pub const fn body_type(mut self, body_type: DataType) -> Self {
        self.request.body_type = Some(body_type);
        self
    }

    /// Replaces the query string parameters.
    #[must_use]
    pub fn query(mut self, query: HashMap<String, String>) -> Self {
        self.request.query = Some(query);
        self
    }

    /// Appends one query string parameter, replacing an earlier one of the same name.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .query
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replaces the caller headers.
    #[must_use]
    pub fn extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.request.extra_headers = Some(headers);
        self
    }

    /// Adds one caller header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Finishes the description and runs [`HttpRequest::verify`] on it.
    ///
    /// # Errors
    ///
    /// Any error from [`HttpRequest::verify`].
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        self.request.verify()?;
        Ok(self.request)
    }
}

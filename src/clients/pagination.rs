//! Aggregation of paginated list responses.
//!
//! Google list endpoints return at most one page per call, plus a
//! `nextPageToken` when more results exist. [`Paginate::list_all`] follows
//! those tokens and returns every page, verbatim and in request order.
//!
//! Pagination only needs one capability from its host: fetching a JSON value
//! for a URL and query parameters ([`FetchJson`]). Any type implementing it
//! gets `list_all` through a blanket implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use gcp_http::clients::Paginate;
//!
//! let mut params = HashMap::new();
//! params.insert("maxResults".to_string(), "500".to_string());
//!
//! let pages = client
//!     .list_all("https://dns.googleapis.com/dns/v1/projects/p/managedZones/z/rrsets", &params)
//!     .await?;
//! let records: Vec<_> = pages
//!     .iter()
//!     .filter_map(|page| page["rrsets"].as_array())
//!     .flatten()
//!     .collect();
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::HttpClient;
use crate::error::Error;

/// Query parameter carrying the continuation token.
pub const PAGE_TOKEN_PARAM: &str = "pageToken";

/// Response field holding the continuation token.
pub const NEXT_PAGE_TOKEN_FIELD: &str = "nextPageToken";

/// Capability to fetch one JSON document.
#[async_trait]
pub trait FetchJson {
    /// Fetches `url` with `params` as query parameters and decodes the body.
    async fn fetch_json(&self, url: &str, params: &HashMap<String, String>)
        -> Result<Value, Error>;
}

/// Aggregates every page of a list query.
#[async_trait]
pub trait Paginate: FetchJson + Sync {
    /// Fetches pages until one arrives without a continuation token.
    ///
    /// `params` is copied; the caller's map is never modified.
    ///
    /// # Errors
    ///
    /// The first error from [`FetchJson::fetch_json`] aborts aggregation and
    /// is returned as is; pages fetched so far are discarded.
    async fn list_all(
        &self,
        url: &str,
        params: &HashMap<String, String>,
    ) -> Result<Vec<Value>, Error> {
        let mut params = params.clone();
        let mut pages = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            if let Some(token) = next_page_token.take() {
                params.insert(PAGE_TOKEN_PARAM.to_string(), token);
            }

            let page = self.fetch_json(url, &params).await?;
            next_page_token = next_page_token_of(&page);
            pages.push(page);

            if next_page_token.is_none() {
                tracing::debug!(url, pages = pages.len(), "Fetched all pages");
                return Ok(pages);
            }
        }
    }
}

impl<T: FetchJson + Sync + ?Sized> Paginate for T {}

#[async_trait]
impl FetchJson for HttpClient {
    async fn fetch_json(
        &self,
        url: &str,
        params: &HashMap<String, String>,
    ) -> Result<Value, Error> {
        self.get_json(url, Some(params.clone())).await
    }
}

/// Returns the continuation token of `page`, if it has a non-empty one.
fn next_page_token_of(page: &Value) -> Option<String> {
    page.get(NEXT_PAGE_TOKEN_FIELD)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

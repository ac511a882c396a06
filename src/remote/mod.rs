//! Remote list fetching.
//!
//! Every list endpoint answers a `(query, page, pageSize, filters)` request
//! with the same pagination envelope. This module defines the request and
//! result types and the [`ListProvider`] trait the list controller is
//! generic over.

pub mod envelope;
pub mod error;
pub mod http;

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::{NearbyError, Result};

pub use envelope::{Endpoint, decode_page};
pub use error::ApiError;
pub use http::HttpListProvider;

/// Parameters of a single page request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Search text; empty means "browse"
    pub search_text: String,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    /// Call-site specific filters (store id, coordinates, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(search_text: impl Into<String>, page: u32, page_size: u32) -> Self {
        Self {
            search_text: search_text.into(),
            page,
            page_size,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}

/// One page of results plus the pagination metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of pages for the query, as reported by the server
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_pages: u32) -> Self {
        Self { items, total_pages }
    }
}

/// Parse a `key=value` filter argument
pub fn parse_filter(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(NearbyError::InvalidFilter(s.to_string())),
    }
}

/// Source of paginated list data.
///
/// `Ok` corresponds to the success callback of the list endpoints and `Err`
/// to the failure callback.
pub trait ListProvider: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Fetch a single page
    fn fetch_page(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Page<Self::Item>>> + Send;
}

/// Adapts a plain async function into a [`ListProvider`]
pub struct FnProvider<F> {
    fetch: F,
}

impl<F> FnProvider<F> {
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F, T> ListProvider for FnProvider<F>
where
    F: Fn(ListQuery) -> BoxFuture<'static, Result<Page<T>>> + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn fetch_page(&self, query: &ListQuery) -> impl Future<Output = Result<Page<T>>> + Send {
        (self.fetch)(query.clone())
    }
}

/// HTTP-level classification of provider errors
pub trait AsHttpError {
    /// Status code and Retry-After seconds, when the error came from a response
    fn as_http_error(&self) -> Option<(reqwest::StatusCode, Option<u64>)>;

    /// Whether repeating the request may succeed
    fn is_transient(&self) -> bool;

    fn is_rate_limited(&self) -> bool;

    fn is_unauthorized(&self) -> bool {
        self.as_http_error()
            .is_some_and(|(status, _)| status.as_u16() == 401 || status.as_u16() == 403)
    }

    fn get_retry_after(&self) -> Option<Duration> {
        if !self.is_rate_limited() {
            return None;
        }
        let seconds = self
            .as_http_error()
            .and_then(|(_, retry_after)| retry_after)
            .unwrap_or(60);
        Some(Duration::from_secs(seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn test_query_builder() {
        let query = ListQuery::new("pizza", 2, 10)
            .with_filter("lat", "24.7")
            .with_filter("lng", "46.6");
        assert_eq!(query.search_text, "pizza");
        assert_eq!(query.page, 2);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters["lat"], "24.7");
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("storeId=42").unwrap(),
            ("storeId".to_string(), "42".to_string())
        );
        assert_eq!(
            parse_filter("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert!(parse_filter("storeId").is_err());
        assert!(parse_filter("=42").is_err());
    }

    #[tokio::test]
    async fn test_fn_provider_passes_query_through() {
        let provider = FnProvider::new(|query: ListQuery| {
            async move {
                let page = query.page.to_string();
                Ok::<_, NearbyError>(Page::new(vec![query.search_text, page], 1))
            }
            .boxed()
        });

        let page = provider
            .fetch_page(&ListQuery::new("abc", 3, 10))
            .await
            .unwrap();
        assert_eq!(page.items, vec!["abc".to_string(), "3".to_string()]);
    }
}

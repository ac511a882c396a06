//! HTTP list provider backed by `reqwest`.
//!
//! # Security Note - Logging
//!
//! The session token is attached as a sensitive header value, so it is
//! never printed by reqwest's or hyper's request logging. Request URLs are
//! logged at `debug` level and contain only the query and filters.

use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use url::Url;

use crate::catalog::ListKind;
use crate::config::Config;
use crate::error::{NearbyError, Result};
use crate::session::Session;

use super::{ApiError, Endpoint, ListProvider, ListQuery, Page, decode_page};

/// List provider that calls one endpoint of the REST API
pub struct HttpListProvider<T> {
    client: Client,
    base_url: Url,
    endpoint: Endpoint,
    session: Session,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpListProvider<T> {
    /// Create a provider for an arbitrary endpoint
    ///
    /// Configures the HTTP client with the given total timeout and a connect
    /// timeout of at most 10s.
    pub fn new(
        base_url: &str,
        endpoint: Endpoint,
        session: Session,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            endpoint,
            session,
            _item: PhantomData,
        })
    }

    /// Create a provider for a catalog list using configuration and session
    pub fn for_list(kind: ListKind, config: &Config, session: Session) -> Result<Self> {
        Self::new(
            &config.base_url(),
            kind.endpoint(),
            session,
            config.remote_timeout(),
        )
    }

    /// Full request URL for a query
    pub fn request_url(&self, query: &ListQuery) -> Result<Url> {
        let mut url = self.base_url.join(self.endpoint.path.trim_start_matches('/'))?;
        {
            let mut pairs = url.query_pairs_mut();
            if !query.search_text.is_empty() {
                pairs.append_pair(&self.endpoint.search_param, &query.search_text);
            }
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("pageSize", &query.page_size.to_string());
            for (key, value) in &query.filters {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

impl<T> HttpListProvider<T>
where
    T: DeserializeOwned,
{
    async fn get_page(&self, query: &ListQuery) -> Result<Page<T>> {
        let url = self.request_url(query)?;
        tracing::debug!(%url, "fetching list page");

        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(auth) = self.session.authorization()? {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();

            let mut error = ApiError::from_response_body(status, &body);
            if let Some(seconds) = retry_after {
                error = error.with_retry_after(seconds);
            }
            return Err(error.into());
        }

        let body: serde_json::Value = response.json().await?;
        decode_page(body, &self.endpoint.items_field)
    }
}

impl<T> ListProvider for HttpListProvider<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Item = T;

    fn fetch_page(&self, query: &ListQuery) -> impl Future<Output = Result<Page<T>>> + Send {
        self.get_page(query)
    }
}

/// Parse the base URL, making sure it ends with `/` so endpoint paths are
/// joined under it rather than replacing its last segment.
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(NearbyError::Config("api.base_url is empty".to_string()));
    }
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(NearbyError::Config(format!(
            "api.base_url must be http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}

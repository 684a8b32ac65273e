//! Instantiation of the [`DataSource`] interface for the upstream REST API over HTTP.
//!
//! This instantiation is built on [`reqwest`].
#![cfg(feature = "http")]

use crate::graphql::backend::{DataSource, Error, Locator};
use crate::upstream::records::SearchPage;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// The public instance of the upstream API.
pub const DEFAULT_BASE_URL: &str = "https://swapi.dev/api/";

/// Configuration for an [`HttpDataSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpConfig {
    /// The root of the upstream API.
    ///
    /// Searches are issued against `people/` relative to this URL. Records are fetched from
    /// whatever locators the upstream hands out, which need not be under this URL.
    pub base_url: Url,
    /// Timeout for each request. If not set, the transport default is used.
    pub timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
            timeout: None,
        }
    }
}

impl HttpConfig {
    /// Use the upstream rooted at `base_url`.
    pub fn new(mut base_url: Url) -> Self {
        // Without a trailing slash, `Url::join` would replace the last path segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            timeout: None,
        }
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A data source backed by the upstream REST API.
#[derive(Clone, Debug)]
pub struct HttpDataSource {
    client: Client,
    base_url: Url,
}

impl HttpDataSource {
    /// Create a data source with the given [`HttpConfig`].
    pub fn new(config: HttpConfig) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| Error::custom(format!("error building HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    /// The URL of a search for people matching `term`.
    pub fn search_url(&self, term: &str) -> Result<Url, Error> {
        let mut url = self
            .base_url
            .join("people/")
            .map_err(|err| Error::custom(format!("invalid base URL {}: {err}", self.base_url)))?;
        url.query_pairs_mut().append_pair("search", term);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        tracing::debug!("GET {url}");
        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| {
                tracing::warn!("GET {url} failed: {err}");
                Error::transport(&url, err)
            })?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!("GET {url} responded with {status}");
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        res.json()
            .await
            .map_err(|err| Error::decode::<T>(&url, err))
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn search_people(&self, term: &str) -> Result<Vec<Value>, Error> {
        let page: SearchPage<Value> = self.get(self.search_url(term)?).await?;
        tracing::debug!(term, count = page.count, "search complete");
        Ok(page.results)
    }

    async fn fetch(&self, locator: &Locator) -> Result<Value, Error> {
        self.get(Url::clone(locator)).await
    }
}

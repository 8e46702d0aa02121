//! Shared client for the manuscript API.
//!
//! # Responsibilities
//! - Resolve request paths against the configured base URL
//! - Hold the default headers sent with every request
//! - Carry the bearer token once the identity bootstrap succeeds
//!
//! # Design Decisions
//! - Clones share one set of defaults (one client per application)
//! - Defaults are swapped atomically; requests already built keep their headers
//! - The Authorization value is marked sensitive so it never shows in Debug output

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// Error type for API requests.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header: {0}")]
    Header(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    Status { status: u16, url: Url },
}

/// The application-wide HTTP client.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    defaults: Arc<ArcSwap<HeaderMap>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("defaults", &self.defaults.load_full())
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the configured API.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|source| ApiError::Url {
            url: config.base_url.clone(),
            source,
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            defaults: Arc::new(ArcSwap::from_pointee(HeaderMap::new())),
        })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request path.
    ///
    /// Absolute http(s) URLs are used as is. Anything else is a path appended
    /// to the base URL with exactly one `/` between them, so a base path like
    /// `/api` is kept and `folio:12r` stays relative.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        if let Ok(absolute) = Url::parse(path) {
            if matches!(absolute.scheme(), "http" | "https") {
                return Ok(absolute);
            }
        }

        let joined = if path.is_empty() {
            self.base_url.as_str().to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.as_str().trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };

        Url::parse(&joined).map_err(|source| ApiError::Url {
            url: joined,
            source,
        })
    }

    /// Snapshot of the headers currently attached to every request.
    pub fn default_headers(&self) -> HeaderMap {
        HeaderMap::clone(&self.defaults.load())
    }

    /// Attach a header to all subsequent requests.
    pub fn set_default_header(&self, name: &str, value: &str) -> Result<(), ApiError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::Header(format!("{}: {}", name, e)))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| ApiError::Header(format!("{}: {}", name, e)))?;
        self.insert_default(name, value);
        Ok(())
    }

    /// Stop sending a header with subsequent requests.
    pub fn remove_default_header(&self, name: &str) {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            return;
        };
        self.defaults.rcu(|current| {
            let mut next = HeaderMap::clone(current);
            next.remove(&name);
            next
        });
    }

    /// Attach `Authorization: Bearer <token>` to all subsequent requests.
    pub fn set_bearer_token(&self, token: &str) -> Result<(), ApiError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ApiError::Header(format!("authorization: {}", e)))?;
        value.set_sensitive(true);
        self.insert_default(AUTHORIZATION, value);
        Ok(())
    }

    /// The current Authorization default, if one is set.
    pub fn authorization(&self) -> Option<String> {
        self.defaults
            .load()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn insert_default(&self, name: HeaderName, value: HeaderValue) {
        self.defaults.rcu(|current| {
            let mut next = HeaderMap::clone(current);
            next.insert(name.clone(), value.clone());
            next
        });
    }

    /// Issue a GET request with the default headers.
    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        let url = self.url(path)?;
        tracing::debug!(url = %url, "API request");

        let response = self
            .client
            .get(url.clone())
            .headers(self.default_headers())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response)
    }

    /// Issue a GET request and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        Ok(self.get(path).await?.json::<T>().await?)
    }
}

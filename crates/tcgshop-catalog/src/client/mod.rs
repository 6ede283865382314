//! HTTP client for the Square Catalog and Inventory APIs.

mod inventory;

use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tcgshop_core::AppConfig;

use crate::error::CatalogError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{
    RetrieveCatalogObjectResponse, SearchCatalogObjectsRequest, SearchCatalogObjectsResponse,
    SquareErrorResponse,
};

/// Maximum number of pages followed by a single multi-page call before
/// returning an error. Guards against a cursor that never terminates.
pub(crate) const MAX_PAGES: usize = 100;

/// Fallback wait when a 429 carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Connection settings for [`SquareClient`].
#[derive(Clone)]
pub struct SquareClientConfig {
    pub base_url: String,
    pub access_token: String,
    pub api_version: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure on transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl SquareClientConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.square_base_url.clone(),
            access_token: config.square_access_token.clone(),
            api_version: config.square_api_version.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

impl std::fmt::Debug for SquareClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SquareClientConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}

/// Client for the Square catalog search, object retrieval and inventory
/// count endpoints.
///
/// Every request carries the bearer token and a pinned `Square-Version`.
/// Responses map onto typed errors: 429 → [`CatalogError::RateLimited`],
/// 404 → [`CatalogError::NotFound`], a Square error envelope on any other
/// 4xx → [`CatalogError::Api`], everything else non-2xx →
/// [`CatalogError::UnexpectedStatus`]. Transient failures are retried with
/// jittered exponential back-off.
pub struct SquareClient {
    client: Client,
    base_url: Url,
    access_token: String,
    api_version: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SquareClient {
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`CatalogError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(config: &SquareClientConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
            base_url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            access_token: config.access_token.clone(),
            api_version: config.api_version.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    /// # Errors
    ///
    /// See [`SquareClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, CatalogError> {
        Self::new(&SquareClientConfig::from_app_config(config))
    }

    /// Runs one catalog search (`POST /v2/catalog/search`).
    ///
    /// # Errors
    ///
    /// Any [`CatalogError`] from the transport, status mapping or body
    /// decoding, after retries are exhausted.
    pub async fn search_catalog(
        &self,
        request: &SearchCatalogObjectsRequest,
    ) -> Result<SearchCatalogObjectsResponse, CatalogError> {
        let url = self.endpoint("v2/catalog/search")?;
        let response: SearchCatalogObjectsResponse = self
            .send(Method::POST, url, Some(request), "catalog search")
            .await?;
        tracing::debug!(
            objects = response.objects.len(),
            related = response.related_objects.len(),
            has_cursor = response.cursor.is_some(),
            "catalog search page received"
        );
        Ok(response)
    }

    /// Retrieves one catalog object with its related objects
    /// (`GET /v2/catalog/object/{id}?include_related_objects=true`).
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] when the object does not exist, otherwise
    /// as for [`SquareClient::search_catalog`].
    pub async fn retrieve_object(
        &self,
        object_id: &str,
    ) -> Result<RetrieveCatalogObjectResponse, CatalogError> {
        let mut url = self.endpoint("v2/catalog/object")?;
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "base URL cannot carry path segments".to_owned(),
            })?
            .push(object_id);
        url.query_pairs_mut()
            .append_pair("include_related_objects", "true");

        self.send(
            Method::GET,
            url,
            None::<&()>,
            &format!("catalog object {object_id}"),
        )
        .await
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })
    }

    /// Sends one request with retry and decodes a 2xx body as `T`.
    async fn send<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        context: &str,
    ) -> Result<T, CatalogError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let method = method.clone();
            let url = url.clone();
            async move {
                let mut request = self
                    .client
                    .request(method, url.clone())
                    .bearer_auth(&self.access_token)
                    .header("Square-Version", &self.api_version)
                    .header(reqwest::header::ACCEPT, "application/json");
                if let Some(body) = body {
                    request = request.json(body);
                }

                let response = request.send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                    return Err(CatalogError::RateLimited { retry_after_secs });
                }

                if status == StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound {
                        url: url.to_string(),
                    });
                }

                let text = response.text().await?;

                if !status.is_success() {
                    return Err(error_for_status(status, &url, &text));
                }

                serde_json::from_str::<T>(&text).map_err(|source| CatalogError::Deserialize {
                    context: context.to_owned(),
                    source,
                })
            }
        })
        .await
    }
}

/// Maps a non-2xx response (other than 404/429) to a typed error.
///
/// Client errors carrying a Square error envelope become
/// [`CatalogError::Api`] with the first listed error; server errors always
/// stay [`CatalogError::UnexpectedStatus`] so they remain retriable.
fn error_for_status(status: StatusCode, url: &Url, body: &str) -> CatalogError {
    if status.is_client_error() {
        let first = serde_json::from_str::<SquareErrorResponse>(body)
            .ok()
            .and_then(|envelope| envelope.errors.into_iter().next());
        if let Some(error) = first {
            return CatalogError::Api {
                category: error.category,
                code: error.code,
                detail: error.detail.unwrap_or_default(),
            };
        }
    }
    CatalogError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_string(),
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;

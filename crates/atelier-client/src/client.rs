//! Configured HTTP client, endpoint building, and response classification.

use std::time::Duration;

use atelier_api_models::{ApiErrorBody, DeleteResponse};
use atelier_console::{ActionError, ActionResult};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Header carrying the admin API key.
pub const HEADER_API_KEY: &str = "x-atelier-api-key";

/// Header correlating every request of one client session in server logs.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Request timeout applied when the builder is not given one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Failure while constructing an [`ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The base URL cannot carry path segments.
    #[error("base URL '{url}' cannot carry API paths")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },
    /// The API key contains bytes not allowed in an HTTP header.
    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,
    /// The trace identifier contains bytes not allowed in an HTTP header.
    #[error("request identifier contains characters not allowed in a header")]
    InvalidRequestId,
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Builder for [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: Url,
    api_key: Option<String>,
    request_id: Option<String>,
    timeout: Duration,
}

impl ApiClientBuilder {
    /// Attach an API key sent as [`HEADER_API_KEY`] on every request.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Attach a trace identifier sent as [`HEADER_REQUEST_ID`] on every
    /// request.
    #[must_use]
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the configured client.
    ///
    /// # Errors
    ///
    /// Fails when the base URL cannot carry paths, the API key or trace
    /// identifier is not a valid header value, or the HTTP client cannot
    /// be constructed.
    pub fn build(self) -> Result<ApiClient, ClientError> {
        if self.base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
            });
        }

        let mut default_headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let mut value =
                HeaderValue::from_str(key).map_err(|_| ClientError::InvalidApiKey)?;
            value.set_sensitive(true);
            default_headers.insert(HEADER_API_KEY, value);
        }
        if let Some(id) = &self.request_id {
            let value = HeaderValue::from_str(id).map_err(|_| ClientError::InvalidRequestId)?;
            default_headers.insert(HEADER_REQUEST_ID, value);
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .default_headers(default_headers)
            .build()?;

        Ok(ApiClient {
            http,
            base_url: self.base_url,
        })
    }
}

/// Client for the Atelier admin REST surface.
///
/// Every collection lives under `/api/admin/{collection}` and shares the
/// same endpoint shapes, so the methods here take the collection segment
/// and deserialize into whatever entity type the caller names.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    /// Start building a client for the API at `base_url`.
    #[must_use]
    pub const fn builder(base_url: Url) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url,
            api_key: None,
            request_id: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// The API root this client talks to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch one page of a collection listing.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`]; see [`classify_status`].
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &atelier_console::ListQuery,
    ) -> ActionResult<atelier_api_models::PageEnvelope<T>> {
        let mut url = self.endpoint(&[collection]);
        url.query_pairs_mut().extend_pairs(query.to_query_pairs());
        self.get_json(url).await
    }

    /// Fetch a single entity by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; otherwise classified per
    /// [`ActionError`].
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> ActionResult<T> {
        self.get_json(self.endpoint(&[collection, id])).await
    }

    /// Create an entity and return the server's canonical copy.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`].
    pub async fn create<T: DeserializeOwned>(
        &self,
        collection: &str,
        body: &impl Serialize,
    ) -> ActionResult<T> {
        let url = self.endpoint(&[collection]);
        send(self.http.post(url).json(body)).await
    }

    /// Partially update an entity and return the server's canonical copy.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`].
    pub async fn update<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        body: &impl Serialize,
    ) -> ActionResult<T> {
        let url = self.endpoint(&[collection, id]);
        send(self.http.patch(url).json(body)).await
    }

    /// Replace an entity wholesale and return the server's canonical copy.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`].
    pub async fn replace<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        body: &impl Serialize,
    ) -> ActionResult<T> {
        let url = self.endpoint(&[collection, id]);
        send(self.http.put(url).json(body)).await
    }

    /// Request a status transition and return the canonical updated entity.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`].
    pub async fn perform_action<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        request: &atelier_api_models::StatusActionRequest,
    ) -> ActionResult<T> {
        let url = self.endpoint(&[collection, id, "action"]);
        send(self.http.post(url).json(request)).await
    }

    /// Delete an entity.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`]; a 2xx body reporting
    /// `success: false` surfaces as a `Network` error.
    pub async fn remove(&self, collection: &str, id: &str) -> ActionResult<()> {
        let url = self.endpoint(&[collection, id]);
        let body: DeleteResponse = send(self.http.delete(url)).await?;
        if body.success {
            Ok(())
        } else {
            Err(ActionError::Network(
                "server reported an unsuccessful delete".to_string(),
            ))
        }
    }

    /// GET with one retry. Reads are idempotent, so a single transient
    /// failure gets one more attempt; writes never do.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ActionResult<T> {
        match send(self.http.get(url.clone())).await {
            Err(err) if is_transient(&err) => {
                tracing::debug!(%url, error = %err, "retrying idempotent read");
                send(self.http.get(url)).await
            }
            other => other,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "admin"])
                .extend(segments.iter().copied());
        }
        url
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ActionResult<T> {
    let response = request.send().await.map_err(transport_error)?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> ActionResult<T> {
    let status = response.status();
    if status.is_success() {
        response.json::<T>().await.map_err(transport_error)
    } else {
        Err(classify_status(status, error_message(response).await))
    }
}

/// Pull the server's `{"error": ...}` message out of a non-2xx response,
/// falling back to the raw body text.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();
    serde_json::from_slice::<ApiErrorBody>(&bytes).map_or_else(
        |_| {
            let text = String::from_utf8_lossy(&bytes);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                format!("request failed with status {status}")
            } else {
                trimmed.to_string()
            }
        },
        |body| body.error,
    )
}

/// Map an HTTP status onto the action error taxonomy, keeping the server's
/// message verbatim where the caller can act on it.
fn classify_status(status: StatusCode, message: String) -> ActionError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ActionError::Validation(message)
        }
        StatusCode::NOT_FOUND => ActionError::NotFound,
        StatusCode::CONFLICT => ActionError::Conflict,
        _ => ActionError::Network(format!("{message} (status {status})")),
    }
}

fn transport_error(err: reqwest::Error) -> ActionError {
    if err.is_timeout() {
        ActionError::Timeout
    } else {
        ActionError::Network(err.to_string())
    }
}

const fn is_transient(err: &ActionError) -> bool {
    matches!(err, ActionError::Network(_) | ActionError::Timeout)
}

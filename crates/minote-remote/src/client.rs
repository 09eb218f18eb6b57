//! HTTP client for the Mi Notes web service

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

use minote_core::{CatalogPage, NoteDetail, RemoteNoteService, RemoteResult};

use crate::config::{ClientConfig, RetryPolicy};
use crate::error::{ClientError, Result};
use crate::types::{DetailData, Envelope};

/// Longest error body echoed into an error message
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the catalog, detail and file endpoints
#[derive(Clone)]
pub struct MinoteClient {
    client: Client,
    base_url: String,
    page_limit: u32,
    retry_config: RetryPolicy,
}

impl MinoteClient {
    /// Create a client with the default configuration and the given session cookie
    pub fn new(cookie: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::builder().cookie(cookie).build())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.cookie.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ClientError::InvalidConfig(format!("cookie is not a valid header: {}", e)))?;
            headers.insert(COOKIE, value);
        } else {
            warn!("No session cookie configured; the service will reject requests");
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .default_headers(headers)
            .build()
            .map_err(ClientError::RequestFailed)?;

        Ok(Self {
            client,
            base_url: config.base_url,
            page_limit: config.page_limit,
            retry_config: config.retry,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Catalog =====

    /// Fetch one catalog page; `None` starts from the beginning.
    pub async fn catalog_page(&self, cursor: Option<&str>) -> Result<CatalogPage> {
        debug!("Fetching catalog page (cursor: {:?})", cursor);

        self.retry_request(|| async {
            let url = format!("{}/note/full/page/", self.base_url);
            let mut query = vec![
                ("ts", timestamp()),
                ("limit", self.page_limit.to_string()),
            ];
            if let Some(cursor) = cursor {
                query.push(("syncTag", cursor.to_string()));
            }
            let response = self.client.get(&url).query(&query).send().await?;
            self.handle_envelope(response).await
        })
        .await
    }

    // ===== Notes =====

    /// Fetch the full entry of one note
    pub async fn note_detail(&self, id: &str) -> Result<NoteDetail> {
        debug!("Fetching note detail: {}", id);

        self.retry_request(|| async {
            let url = format!("{}/note/note/{}/", self.base_url, urlencoding::encode(id));
            let response = self
                .client
                .get(&url)
                .query(&[("ts", timestamp())])
                .send()
                .await?;
            let data: DetailData = self.handle_envelope(response).await?;
            Ok(data.entry)
        })
        .await
    }

    // ===== Files =====

    /// Download the raw bytes of an attachment
    pub async fn file_bytes(&self, file_id: &str) -> Result<Vec<u8>> {
        debug!("Downloading file: {}", file_id);

        self.retry_request(|| async {
            let url = format!("{}/file/full", self.base_url);
            let response = self
                .client
                .get(&url)
                .query(&[("type", "note_img"), ("fileid", file_id)])
                .send()
                .await?;
            let response = self.check_status(response).await?;
            Ok(response.bytes().await?.to_vec())
        })
        .await
    }

    // ===== Helper Methods =====

    /// Map non-success statuses to errors
    async fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = match body.trim() {
                    "" => format!("HTTP {}", status.as_u16()),
                    text => text.chars().take(MAX_ERROR_BODY).collect(),
                };
                Err(ClientError::HttpError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Check status, decode the envelope and unwrap its `data`
    async fn handle_envelope<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let response = self.check_status(response).await?;
        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            warn!("Failed to parse response JSON: {}", e);
            ClientError::InvalidResponse(format!("Invalid JSON response: {}", e))
        })?;

        if envelope.code != 0 {
            return Err(ClientError::Api {
                code: envelope.code,
                message: envelope.message(),
            });
        }

        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("response carries no data".to_string()))
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, request_fn: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_config.initial_backoff;

        loop {
            match request_fn().await {
                Ok(result) => {
                    if attempts > 0 {
                        debug!("Request succeeded after {} retries", attempts);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    attempts += 1;

                    if !self.is_retriable(&error) {
                        return Err(error);
                    }
                    if attempts > self.retry_config.max_retries {
                        warn!("Request failed after {} attempts: {}", attempts, error);
                        return Err(ClientError::TooManyRetries {
                            attempts,
                            last: error.to_string(),
                        });
                    }

                    warn!(
                        "Request failed (attempt {}/{}), retrying in {:?}: {}",
                        attempts, self.retry_config.max_retries, delay, error
                    );

                    sleep(delay).await;

                    delay = std::cmp::min(delay * 2, self.retry_config.max_backoff);
                }
            }
        }
    }

    /// Check if an error is retriable
    fn is_retriable(&self, error: &ClientError) -> bool {
        match error {
            ClientError::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),

            // Retry on 5xx server errors and 429 rate limiting
            ClientError::HttpError { status, .. } => *status >= 500 || *status == 429,

            ClientError::Unauthorized
            | ClientError::Api { .. }
            | ClientError::InvalidResponse(_)
            | ClientError::TooManyRetries { .. }
            | ClientError::InvalidConfig(_) => false,
        }
    }
}

/// Cache-busting `ts` parameter the web client sends
fn timestamp() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

#[async_trait]
impl RemoteNoteService for MinoteClient {
    async fn fetch_page(&self, cursor: Option<&str>) -> RemoteResult<CatalogPage> {
        Ok(self.catalog_page(cursor).await?)
    }

    async fn fetch_note_details(&self, id: &str) -> RemoteResult<NoteDetail> {
        Ok(self.note_detail(id).await?)
    }

    async fn fetch_image(&self, file_id: &str) -> RemoteResult<Vec<u8>> {
        Ok(self.file_bytes(file_id).await?)
    }
}

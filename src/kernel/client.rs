use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::types::{CreateConversationRequest, SignedUrlRequest, SignedUrlResponse};
use crate::config::{KernelConfig, RequestConfig};
use crate::error::{AppResult, KernelError, KernelResult};
use crate::services::{
    Conversation, ConversationDirectory, NewResearchContext, RemoteFile, RemoteFileDownloader,
    ResearchContext, ResearchContextDirectory, SignedUrlProvider, SourceDataListing,
};

/// Client for the kernel REST API
#[derive(Clone)]
pub struct KernelClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_config: RequestConfig,
}

impl KernelClient {
    /// Create a new kernel client
    pub fn new(config: &KernelConfig, request_config: RequestConfig) -> KernelResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(KernelError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List every research context visible to the caller
    pub async fn list_research_contexts(&self) -> KernelResult<Vec<ResearchContext>> {
        self.get_json("list_research_contexts", "/research-contexts")
            .await
    }

    /// Create a research context
    pub async fn create_research_context(
        &self,
        request: &NewResearchContext,
    ) -> KernelResult<ResearchContext> {
        info!(title = %request.title, files = request.files.len(), "Creating research context");
        self.post_json("create_research_context", "/research-contexts", request)
            .await
    }

    /// List the conversations of a research context
    pub async fn list_conversations(
        &self,
        research_context_id: i64,
    ) -> KernelResult<Vec<Conversation>> {
        let path = format!("/research-contexts/{}/conversations", research_context_id);
        self.get_json("list_conversations", &path).await
    }

    /// Create a conversation under a research context
    pub async fn create_conversation(
        &self,
        research_context_id: i64,
        title: &str,
    ) -> KernelResult<Conversation> {
        let path = format!("/research-contexts/{}/conversations", research_context_id);
        let body = CreateConversationRequest {
            title: title.to_string(),
        };
        info!(research_context_id, title = %title, "Creating conversation");
        self.post_json("create_conversation", &path, &body).await
    }

    /// List the source data available to the caller
    pub async fn list_source_data(&self) -> KernelResult<Vec<RemoteFile>> {
        self.get_json("list_source_data", "/source-data").await
    }

    /// Download a remote object as raw bytes
    pub async fn download_file(&self, relative_path: &str) -> KernelResult<Vec<u8>> {
        let url = format!("{}/files/download", self.base_url);
        let response = self
            .send_with_retry("download_file", || {
                self.client
                    .get(&url)
                    .query(&[("relativePath", relative_path)])
            })
            .await?;

        let bytes = response.bytes().await.map_err(|e| KernelError::InvalidResponse {
            message: format!("Failed to read download body: {}", e),
        })?;

        debug!(relative_path = %relative_path, bytes = bytes.len(), "Downloaded remote file");
        Ok(bytes.to_vec())
    }

    /// Request a time-limited signed URL for a remote object
    pub async fn create_signed_url(
        &self,
        relative_path: &str,
        expires_in_secs: u64,
    ) -> KernelResult<String> {
        let body = SignedUrlRequest {
            relative_path: relative_path.to_string(),
            expires_in_seconds: expires_in_secs,
        };
        let response: SignedUrlResponse = self
            .post_json("signed_url", "/files/signed-url", &body)
            .await?;
        Ok(response.signed_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, path: &str) -> KernelResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .send_with_retry(operation, || self.client.get(&url))
            .await?;
        decode(operation, response).await
    }

    /// Single attempt: creates are not retried to avoid duplicates.
    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> KernelResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        match self.execute(self.client.post(&url).json(body)).await {
            Ok(response) => {
                info!(
                    operation = %operation,
                    latency_ms = start.elapsed().as_millis(),
                    "Kernel call succeeded"
                );
                decode(operation, response).await
            }
            Err(e) => {
                error!(
                    operation = %operation,
                    error = %e,
                    latency_ms = start.elapsed().as_millis(),
                    "Kernel call failed"
                );
                Err(e)
            }
        }
    }

    /// Send an idempotent request, retrying transient failures with backoff
    async fn send_with_retry<F>(&self, operation: &str, build: F) -> KernelResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                let delay = Duration::from_millis(
                    self.request_config.retry_delay_ms * (2_u64.pow(retries - 1)),
                );
                warn!(
                    operation = %operation,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying kernel request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute(build()).await {
                Ok(response) => {
                    info!(
                        operation = %operation,
                        latency_ms = start.elapsed().as_millis(),
                        "Kernel call succeeded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    error!(
                        operation = %operation,
                        error = %e,
                        latency_ms = start.elapsed().as_millis(),
                        retry = retries,
                        "Kernel call failed"
                    );
                    if !is_retryable(&e) {
                        return Err(e);
                    }
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        Err(KernelError::Unavailable {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
            retries,
        })
    }

    /// Execute a single request (internal)
    async fn execute(&self, request: RequestBuilder) -> KernelResult<Response> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    KernelError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    KernelError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(KernelError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> KernelResult<T> {
    response
        .json()
        .await
        .map_err(|e| KernelError::InvalidResponse {
            message: format!("Failed to parse {} response: {}", operation, e),
        })
}

fn is_retryable(err: &KernelError) -> bool {
    match err {
        KernelError::Api { status, .. } => *status == 429 || *status >= 500,
        KernelError::Timeout { .. } | KernelError::Http(_) => true,
        KernelError::Unavailable { .. } | KernelError::InvalidResponse { .. } => false,
    }
}

#[async_trait]
impl ResearchContextDirectory for KernelClient {
    async fn list(&self) -> AppResult<Vec<ResearchContext>> {
        Ok(self.list_research_contexts().await?)
    }

    async fn create(&self, request: NewResearchContext) -> AppResult<ResearchContext> {
        Ok(self.create_research_context(&request).await?)
    }
}

#[async_trait]
impl ConversationDirectory for KernelClient {
    async fn list(&self, research_context_id: i64) -> AppResult<Vec<Conversation>> {
        Ok(self.list_conversations(research_context_id).await?)
    }

    async fn create(&self, research_context_id: i64, title: String) -> AppResult<Conversation> {
        Ok(self.create_conversation(research_context_id, &title).await?)
    }
}

#[async_trait]
impl SourceDataListing for KernelClient {
    async fn list_for_client(&self) -> AppResult<Vec<RemoteFile>> {
        Ok(self.list_source_data().await?)
    }
}

#[async_trait]
impl RemoteFileDownloader for KernelClient {
    async fn download(&self, relative_path: &str) -> AppResult<Vec<u8>> {
        Ok(self.download_file(relative_path).await?)
    }
}

#[async_trait]
impl SignedUrlProvider for KernelClient {
    async fn signed_url(&self, relative_path: &str, expires_in_secs: u64) -> AppResult<String> {
        Ok(self.create_signed_url(relative_path, expires_in_secs).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> KernelConfig {
        KernelConfig {
            api_key: "test_key".to_string(),
            base_url: "http://localhost:8000/".to_string(),
        }
    }

    #[test]
    fn test_client_creation_trims_base_url() {
        let client = KernelClient::new(&test_config(), RequestConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable(&KernelError::Api {
            status: 503,
            message: String::new(),
        }));
        assert!(is_retryable(&KernelError::Api {
            status: 429,
            message: String::new(),
        }));
        assert!(!is_retryable(&KernelError::Api {
            status: 404,
            message: String::new(),
        }));
        assert!(is_retryable(&KernelError::Timeout { timeout_ms: 10 }));
        assert!(!is_retryable(&KernelError::InvalidResponse {
            message: String::new(),
        }));
    }
}

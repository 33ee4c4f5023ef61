use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{
    Assistant, CreateAssistantRequest, CreateVectorStoreRequest, FileObject, VectorStore,
    ASSISTANTS_BETA,
};
use crate::config::{OpenAiConfig, RequestConfig};
use crate::error::{OpenAiError, OpenAiResult};

/// Client for the OpenAI files, vector store and assistants endpoints
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_config: RequestConfig,
}

impl OpenAiClient {
    /// Create a new OpenAI client
    pub fn new(config: &OpenAiConfig, request_config: RequestConfig) -> OpenAiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(OpenAiError::Http)?;

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

    /// Upload a file for use by assistants
    pub async fn upload_file(&self, filename: &str, content: Vec<u8>) -> OpenAiResult<FileObject> {
        let url = format!("{}/v1/files", self.base_url);
        let size = content.len();
        let form = Form::new()
            .text("purpose", "assistants")
            .part("file", Part::bytes(content).file_name(filename.to_string()));

        debug!(filename = %filename, bytes = size, "Uploading file to OpenAI");

        self.call("upload_file", self.client.post(&url).multipart(form))
            .await
    }

    /// Create a vector store over uploaded files
    pub async fn create_vector_store(
        &self,
        request: &CreateVectorStoreRequest,
    ) -> OpenAiResult<VectorStore> {
        let url = format!("{}/v1/vector_stores", self.base_url);

        info!(name = %request.name, files = request.file_ids.len(), "Creating vector store");

        self.call(
            "create_vector_store",
            self.client
                .post(&url)
                .header("OpenAI-Beta", ASSISTANTS_BETA)
                .json(request),
        )
        .await
    }

    /// Create an assistant
    pub async fn create_assistant(&self, request: &CreateAssistantRequest) -> OpenAiResult<Assistant> {
        let url = format!("{}/v1/assistants", self.base_url);

        info!(name = %request.name, model = %request.model, "Creating assistant");

        self.call(
            "create_assistant",
            self.client
                .post(&url)
                .header("OpenAI-Beta", ASSISTANTS_BETA)
                .json(request),
        )
        .await
    }

    /// Execute a single request and decode its JSON body (internal)
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> OpenAiResult<T> {
        let start = Instant::now();

        let response = match self.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    operation = %operation,
                    error = %e,
                    latency_ms = start.elapsed().as_millis(),
                    "OpenAI call failed"
                );
                return Err(e);
            }
        };

        info!(
            operation = %operation,
            latency_ms = start.elapsed().as_millis(),
            "OpenAI call succeeded"
        );

        response
            .json()
            .await
            .map_err(|e| OpenAiError::InvalidResponse {
                message: format!("Failed to parse {} response: {}", operation, e),
            })
    }

    async fn execute(&self, request: RequestBuilder) -> OpenAiResult<Response> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OpenAiError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    OpenAiError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        Ok(response)
    }
}

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::client::OpenAiClient;
use super::types::{CreateAssistantRequest, CreateVectorStoreRequest};
use crate::error::AppResult;
use crate::prompts::unsupported_files_note;
use crate::services::{
    Agent, AgentRegistration, KnowledgeBaseProvisioner, KnowledgeIndex, RemoteFile,
    RemoteFileDownloader,
};

/// File extensions accepted by OpenAI file search.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "c", "cpp", "cs", "css", "doc", "docx", "go", "html", "java", "js", "json", "md", "pdf",
    "php", "pptx", "py", "rb", "sh", "tex", "ts", "txt",
];

/// Whether a file can be indexed by file search.
pub fn is_indexable(file: &RemoteFile) -> bool {
    file.extension()
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Knowledge-base provisioner backed by OpenAI vector stores and assistants.
///
/// Source files are pulled from remote storage through `downloader` and
/// re-uploaded to OpenAI before indexing.
#[derive(Clone)]
pub struct OpenAiProvisioner {
    openai: OpenAiClient,
    downloader: Arc<dyn RemoteFileDownloader>,
    model: String,
}

impl OpenAiProvisioner {
    pub fn new(
        openai: OpenAiClient,
        downloader: Arc<dyn RemoteFileDownloader>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            openai,
            downloader,
            model: model.into(),
        }
    }
}

#[async_trait]
impl KnowledgeBaseProvisioner for OpenAiProvisioner {
    async fn create_index(&self, files: Vec<RemoteFile>) -> AppResult<KnowledgeIndex> {
        let (supported, unsupported): (Vec<RemoteFile>, Vec<RemoteFile>) =
            files.into_iter().partition(is_indexable);

        for file in &unsupported {
            warn!(relative_path = %file.relative_path, "Skipping file not supported by file search");
        }

        let mut file_ids = Vec::with_capacity(supported.len());
        for file in &supported {
            let content = self.downloader.download(&file.relative_path).await?;
            let uploaded = self.openai.upload_file(file.file_name(), content).await?;
            file_ids.push(uploaded.id);
        }

        let request = CreateVectorStoreRequest {
            name: format!("kb-{}", uuid::Uuid::new_v4()),
            file_ids,
        };
        let store = self.openai.create_vector_store(&request).await?;

        info!(
            vector_store_id = %store.id,
            indexed = supported.len(),
            unsupported = unsupported.len(),
            "Knowledge base index created"
        );

        Ok(KnowledgeIndex {
            id: store.id,
            unsupported_files: unsupported,
        })
    }

    async fn register_agent(&self, registration: AgentRegistration) -> AppResult<Agent> {
        let instructions = match unsupported_files_note(&registration.unsupported_files) {
            Some(note) => format!("{}\n\n{}", registration.instructions, note),
            None => registration.instructions,
        };

        let request =
            CreateAssistantRequest::file_search(&self.model, &registration.title, &registration.index_id)
                .with_description(registration.description)
                .with_instructions(instructions);

        let assistant = self.openai.create_assistant(&request).await?;

        info!(
            assistant_id = %assistant.id,
            vector_store_id = %registration.index_id,
            "Agent registered"
        );

        Ok(Agent {
            external_id: assistant.id,
            model: assistant.model,
            vector_store_id: registration.index_id,
            tools: request.tools.iter().map(|t| t.tool_type.clone()).collect(),
            instructions: assistant.instructions.unwrap_or(request.instructions),
        })
    }
}

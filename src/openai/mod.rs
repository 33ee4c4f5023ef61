//! OpenAI files, vector stores and assistants, and the knowledge-base
//! provisioner built on them.

mod client;
mod provisioner;
mod types;

pub use client::OpenAiClient;
pub use provisioner::{is_indexable, OpenAiProvisioner, SUPPORTED_EXTENSIONS};
pub use types::{
    Assistant, AssistantTool, CreateAssistantRequest, CreateVectorStoreRequest, FileObject,
    FileSearchResources, ToolResources, VectorStore, ASSISTANTS_BETA,
};

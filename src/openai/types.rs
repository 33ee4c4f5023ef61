use serde::{Deserialize, Serialize};

/// Beta header value required by the assistants and vector-store endpoints
pub const ASSISTANTS_BETA: &str = "assistants=v2";

/// An uploaded file
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Request to create a vector store
#[derive(Debug, Clone, Serialize)]
pub struct CreateVectorStoreRequest {
    pub name: String,
    pub file_ids: Vec<String>,
}

/// A vector store
#[derive(Debug, Clone, Deserialize)]
pub struct VectorStore {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Tool enabled on an assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantTool {
    #[serde(rename = "type")]
    pub tool_type: String,
}

impl AssistantTool {
    /// Retrieval over attached vector stores
    pub fn file_search() -> Self {
        Self {
            tool_type: "file_search".to_string(),
        }
    }
}

/// File-search resources bound to an assistant
#[derive(Debug, Clone, Serialize)]
pub struct FileSearchResources {
    pub vector_store_ids: Vec<String>,
}

/// Tool resources bound to an assistant
#[derive(Debug, Clone, Serialize)]
pub struct ToolResources {
    pub file_search: FileSearchResources,
}

/// Request to create an assistant
#[derive(Debug, Clone, Serialize)]
pub struct CreateAssistantRequest {
    pub model: String,
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub tools: Vec<AssistantTool>,
    pub tool_resources: ToolResources,
}

impl CreateAssistantRequest {
    /// Create a file-search assistant over a single vector store
    pub fn file_search(
        model: impl Into<String>,
        name: impl Into<String>,
        vector_store_id: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            name: name.into(),
            description: String::new(),
            instructions: String::new(),
            tools: vec![AssistantTool::file_search()],
            tool_resources: ToolResources {
                file_search: FileSearchResources {
                    vector_store_ids: vec![vector_store_id.into()],
                },
            },
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set system instructions
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

/// A created assistant
#[derive(Debug, Clone, Deserialize)]
pub struct Assistant {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<AssistantTool>,
}

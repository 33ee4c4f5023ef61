//! Domain entities and the capability traits the bootstrap workflow depends on.
//!
//! Each collaborator (research-context directory, conversation directory,
//! metadata store, source-data listing, knowledge-base provisioner) is reached
//! through one narrow trait so that the workflow can be driven by the real
//! kernel/OpenAI clients or by test doubles.


use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::metadata::{CaseStudyMetadata, MetadataKey};

/// Lifecycle status of a research context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchContextStatus {
    /// The context can be used for conversations.
    Active,
    /// Any status the kernel reports other than active.
    #[serde(other)]
    Other,
}

/// A research context: the unit an agent and its conversations hang off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchContext {
    /// Kernel-assigned identifier.
    pub id: i64,
    /// Canonical `{caseStudy}_{tracerID}_{jobID}` title.
    pub title: String,
    /// Human-readable description.
    pub description: String,
    /// Current status.
    pub status: ResearchContextStatus,
}

impl ResearchContext {
    /// Whether the context is usable.
    pub fn is_active(&self) -> bool {
        self.status == ResearchContextStatus::Active
    }
}

/// A conversation owned by a research context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
}

/// Kind of a listed source-data object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Remote,
    Local,
    #[serde(other)]
    Other,
}

/// A source-data object stored by an external storage provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub relative_path: String,
    pub created_at: DateTime<Utc>,
    /// Storage provider tag (e.g. "s3", "minio").
    pub provider: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
}

impl RemoteFile {
    /// Whether the object lives in remote storage.
    pub fn is_remote(&self) -> bool {
        self.kind == FileKind::Remote
    }

    /// Display file name, falling back to the last path segment when unnamed.
    pub fn file_name(&self) -> &str {
        if self.name.is_empty() {
            self.relative_path.rsplit('/').next().unwrap_or_default()
        } else {
            self.name.as_str()
        }
    }

    /// Lower-cased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// Parameters for creating a research context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResearchContext {
    /// External id of the agent serving this context.
    pub agent_external_id: String,
    pub title: String,
    pub description: String,
    /// Source files the agent was given access to.
    pub files: Vec<RemoteFile>,
}

/// Handle to a provisioned knowledge-base index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeIndex {
    /// Vector store id.
    pub id: String,
    /// Files that could not be indexed.
    pub unsupported_files: Vec<RemoteFile>,
}

/// Parameters for registering an agent over a knowledge-base index.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRegistration {
    pub title: String,
    pub description: String,
    pub index_id: String,
    pub unsupported_files: Vec<RemoteFile>,
    pub instructions: String,
}

/// A registered conversational agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub external_id: String,
    pub model: String,
    pub vector_store_id: String,
    pub tools: Vec<String>,
    pub instructions: String,
}

/// Directory of research contexts.
#[async_trait]
pub trait ResearchContextDirectory: Send + Sync {
    /// List every research context visible to the caller.
    async fn list(&self) -> AppResult<Vec<ResearchContext>>;
    /// Create a research context.
    async fn create(&self, request: NewResearchContext) -> AppResult<ResearchContext>;
}

/// Directory of conversations scoped to a research context.
#[async_trait]
pub trait ConversationDirectory: Send + Sync {
    /// List conversations of a research context, in kernel order.
    async fn list(&self, research_context_id: i64) -> AppResult<Vec<Conversation>>;
    /// Create a conversation under a research context.
    async fn create(&self, research_context_id: i64, title: String) -> AppResult<Conversation>;
}

/// Source of per-case-study metadata descriptors.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch and parse the metadata descriptor for a case-study run.
    async fn fetch(&self, key: MetadataKey) -> AppResult<CaseStudyMetadata>;
}

/// Listing of the source data available to the current caller.
#[async_trait]
pub trait SourceDataListing: Send + Sync {
    async fn list_for_client(&self) -> AppResult<Vec<RemoteFile>>;
}

/// Knowledge-base provisioning: index creation and agent registration.
#[async_trait]
pub trait KnowledgeBaseProvisioner: Send + Sync {
    /// Index the given files; unsupported ones are reported back, not indexed.
    async fn create_index(&self, files: Vec<RemoteFile>) -> AppResult<KnowledgeIndex>;
    /// Register an agent with retrieval access to an index.
    async fn register_agent(&self, registration: AgentRegistration) -> AppResult<Agent>;
}

/// Raw download of objects from remote storage.
#[async_trait]
pub trait RemoteFileDownloader: Send + Sync {
    async fn download(&self, relative_path: &str) -> AppResult<Vec<u8>>;
}

/// Issues time-limited signed URLs for objects in remote storage.
#[async_trait]
pub trait SignedUrlProvider: Send + Sync {
    async fn signed_url(&self, relative_path: &str, expires_in_secs: u64) -> AppResult<String>;
}

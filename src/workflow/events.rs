use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::metadata::DisplayMetadata;
use crate::services::{Conversation, ResearchContext};

/// External operation (or local check) a workflow failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ValidateRequest,
    ListResearchContexts,
    ListConversations,
    FetchMetadata,
    ValidateMetadata,
    ListSourceData,
    CreateIndex,
    RegisterAgent,
    CreateResearchContext,
    CreateConversation,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ValidateRequest => "validate_request",
            Operation::ListResearchContexts => "list_research_contexts",
            Operation::ListConversations => "list_conversations",
            Operation::FetchMetadata => "fetch_metadata",
            Operation::ValidateMetadata => "validate_metadata",
            Operation::ListSourceData => "list_source_data",
            Operation::CreateIndex => "create_index",
            Operation::RegisterAgent => "register_agent",
            Operation::CreateResearchContext => "create_research_context",
            Operation::CreateConversation => "create_conversation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal workflow failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{operation}: {message}")]
pub struct WorkflowFailure {
    pub operation: Operation,
    pub message: String,
    /// Upstream detail, e.g. the collaborator's error text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl WorkflowFailure {
    pub fn new(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Canonical progress phases, in the order a fresh bootstrap visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    ResolveResearchContext,
    LoadMetadata,
    ProvisionKnowledgeBase,
    RegisterAgent,
    CreateResearchContext,
    CreateConversation,
}

impl Phase {
    /// Number of canonical phases.
    pub const TOTAL: u8 = 6;

    /// 1-based position of the phase.
    pub fn step(&self) -> u8 {
        match self {
            Phase::ResolveResearchContext => 1,
            Phase::LoadMetadata => 2,
            Phase::ProvisionKnowledgeBase => 3,
            Phase::RegisterAgent => 4,
            Phase::CreateResearchContext => 5,
            Phase::CreateConversation => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::ResolveResearchContext => "Looking up research context",
            Phase::LoadMetadata => "Loading case study metadata",
            Phase::ProvisionKnowledgeBase => "Indexing source data",
            Phase::RegisterAgent => "Registering research agent",
            Phase::CreateResearchContext => "Creating research context",
            Phase::CreateConversation => "Creating conversation",
        }
    }
}

/// Payload of a progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub phase: Phase,
    pub step: u8,
    pub total: u8,
    pub label: String,
}

impl From<Phase> for ProgressUpdate {
    fn from(phase: Phase) -> Self {
        Self {
            phase,
            step: phase.step(),
            total: Phase::TOTAL,
            label: phase.label().to_string(),
        }
    }
}

/// Result of a successful bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapSuccess {
    pub metadata: DisplayMetadata,
    pub research_context: ResearchContext,
    pub conversation: Conversation,
}

/// Event emitted by the workflow: zero or more progress events, then exactly
/// one success or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BootstrapEvent {
    Progress(ProgressUpdate),
    Success(Box<BootstrapSuccess>),
    Error(WorkflowFailure),
}

impl BootstrapEvent {
    /// Whether this is the last event of a run.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BootstrapEvent::Progress(_))
    }
}

/// Observable view state: the initial `request` state plus the last event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ViewState {
    Request,
    Progress(ProgressUpdate),
    Success(Box<BootstrapSuccess>),
    Error(WorkflowFailure),
}

impl From<BootstrapEvent> for ViewState {
    fn from(event: BootstrapEvent) -> Self {
        match event {
            BootstrapEvent::Progress(update) => ViewState::Progress(update),
            BootstrapEvent::Success(success) => ViewState::Success(success),
            BootstrapEvent::Error(failure) => ViewState::Error(failure),
        }
    }
}

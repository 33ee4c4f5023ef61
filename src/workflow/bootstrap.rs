use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::events::{BootstrapSuccess, Operation, Phase, WorkflowFailure};
use super::progress::ProgressReporter;
use crate::error::AppError;
use crate::metadata::{CaseStudyMetadata, CaseStudyName, MetadataKey};
use crate::prompts::{agent_description, canonical_title, AGENT_INSTRUCTIONS};
use crate::services::{
    Agent, AgentRegistration, Conversation, ConversationDirectory, KnowledgeBaseProvisioner,
    MetadataStore, NewResearchContext, RemoteFile, ResearchContext, ResearchContextDirectory,
    SourceDataListing,
};

/// Input of a bootstrap run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapRequest {
    #[serde(rename = "caseStudyName")]
    pub case_study_name: String,
    #[serde(rename = "tracerID")]
    pub tracer_id: String,
    #[serde(rename = "jobID")]
    pub job_id: u64,
}

impl BootstrapRequest {
    pub fn new(case_study_name: impl Into<String>, tracer_id: impl Into<String>, job_id: u64) -> Self {
        Self {
            case_study_name: case_study_name.into(),
            tracer_id: tracer_id.into(),
            job_id,
        }
    }
}

/// A validated request and its canonical title
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub case_study: CaseStudyName,
    pub tracer_id: String,
    pub job_id: u64,
    pub title: String,
}

impl Target {
    fn metadata_key(&self) -> MetadataKey {
        MetadataKey::new(self.case_study, self.tracer_id.clone(), self.job_id)
    }
}

/// An existing research context and, if found, its canonical conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingContext {
    pub context: ResearchContext,
    pub conversation: Option<Conversation>,
}

/// Stages of a bootstrap run. Each call to [`BootstrapWorkflow::advance`]
/// moves one stage forward or fails terminally.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapState {
    NotStarted(BootstrapRequest),
    ContextResolved {
        target: Target,
        context: Option<ResearchContext>,
    },
    ConversationResolved {
        target: Target,
        existing: Option<ExistingContext>,
    },
    MetadataReady {
        target: Target,
        existing: Option<ExistingContext>,
        metadata: CaseStudyMetadata,
    },
    Provisioned {
        target: Target,
        metadata: CaseStudyMetadata,
        agent: Agent,
        files: Vec<RemoteFile>,
    },
    Done(BootstrapSuccess),
}

/// Ensures a research context and conversation exist for a case-study run,
/// wired to an agent over the run's designated source files.
///
/// Runs strictly sequentially. Nothing created before a failure is rolled
/// back, and two concurrent runs for the same triple may both create.
#[derive(Clone)]
pub struct BootstrapWorkflow {
    contexts: Arc<dyn ResearchContextDirectory>,
    conversations: Arc<dyn ConversationDirectory>,
    metadata: Arc<dyn MetadataStore>,
    source_data: Arc<dyn SourceDataListing>,
    provisioner: Arc<dyn KnowledgeBaseProvisioner>,
}

fn upstream(operation: Operation, message: &'static str) -> impl FnOnce(AppError) -> WorkflowFailure {
    move |err| WorkflowFailure::new(operation, message).with_context(err.to_string())
}

impl BootstrapWorkflow {
    pub fn new(
        contexts: Arc<dyn ResearchContextDirectory>,
        conversations: Arc<dyn ConversationDirectory>,
        metadata: Arc<dyn MetadataStore>,
        source_data: Arc<dyn SourceDataListing>,
        provisioner: Arc<dyn KnowledgeBaseProvisioner>,
    ) -> Self {
        Self {
            contexts,
            conversations,
            metadata,
            source_data,
            provisioner,
        }
    }

    /// Run a bootstrap to completion, reporting progress and exactly one
    /// terminal event through `reporter`.
    pub async fn execute(
        &self,
        request: BootstrapRequest,
        reporter: &ProgressReporter,
    ) -> Result<BootstrapSuccess, WorkflowFailure> {
        let start = Instant::now();
        let mut state = BootstrapState::NotStarted(request);

        loop {
            match self.advance(state, reporter).await {
                Ok(BootstrapState::Done(success)) => {
                    info!(
                        research_context_id = success.research_context.id,
                        conversation_id = success.conversation.id,
                        latency_ms = start.elapsed().as_millis(),
                        "Bootstrap completed"
                    );
                    reporter.success(success.clone());
                    return Ok(success);
                }
                Ok(next) => state = next,
                Err(failure) => {
                    error!(
                        operation = %failure.operation,
                        message = %failure.message,
                        context = ?failure.context,
                        latency_ms = start.elapsed().as_millis(),
                        "Bootstrap failed"
                    );
                    reporter.failure(failure.clone());
                    return Err(failure);
                }
            }
        }
    }

    /// Perform one transition.
    pub async fn advance(
        &self,
        state: BootstrapState,
        reporter: &ProgressReporter,
    ) -> Result<BootstrapState, WorkflowFailure> {
        match state {
            BootstrapState::NotStarted(request) => {
                let target = validate(&request)?;
                reporter.progress(Phase::ResolveResearchContext);
                let context = self.resolve_context(&target).await?;
                Ok(BootstrapState::ContextResolved { target, context })
            }
            BootstrapState::ContextResolved { target, context } => {
                let existing = match context {
                    Some(context) => {
                        let conversation = self.resolve_conversation(&target, &context).await?;
                        Some(ExistingContext {
                            context,
                            conversation,
                        })
                    }
                    None => None,
                };
                Ok(BootstrapState::ConversationResolved { target, existing })
            }
            BootstrapState::ConversationResolved { target, existing } => {
                reporter.progress(Phase::LoadMetadata);
                let metadata = self.load_metadata(&target).await?;
                Ok(BootstrapState::MetadataReady {
                    target,
                    existing,
                    metadata,
                })
            }
            BootstrapState::MetadataReady {
                target,
                existing: Some(existing),
                metadata,
            } => {
                let conversation = match existing.conversation {
                    Some(conversation) => {
                        debug!(conversation_id = conversation.id, "Reusing existing conversation");
                        conversation
                    }
                    None => {
                        reporter.progress(Phase::CreateConversation);
                        self.create_conversation(existing.context.id, &target).await?
                    }
                };
                Ok(BootstrapState::Done(BootstrapSuccess {
                    metadata: metadata.into_display(),
                    research_context: existing.context,
                    conversation,
                }))
            }
            BootstrapState::MetadataReady {
                target,
                existing: None,
                metadata,
            } => {
                reporter.progress(Phase::ProvisionKnowledgeBase);
                let files = self.agent_files(&metadata).await?;
                let index = self
                    .provisioner
                    .create_index(files.clone())
                    .await
                    .map_err(upstream(Operation::CreateIndex, "failed to create knowledge base index"))?;

                reporter.progress(Phase::RegisterAgent);
                let registration = AgentRegistration {
                    title: target.title.clone(),
                    description: agent_description(target.case_study, &target.tracer_id, target.job_id),
                    index_id: index.id,
                    unsupported_files: index.unsupported_files,
                    instructions: AGENT_INSTRUCTIONS.to_string(),
                };
                let agent = self
                    .provisioner
                    .register_agent(registration)
                    .await
                    .map_err(upstream(Operation::RegisterAgent, "failed to register agent"))?;

                Ok(BootstrapState::Provisioned {
                    target,
                    metadata,
                    agent,
                    files,
                })
            }
            BootstrapState::Provisioned {
                target,
                metadata,
                agent,
                files,
            } => {
                reporter.progress(Phase::CreateResearchContext);
                let request = NewResearchContext {
                    agent_external_id: agent.external_id,
                    title: target.title.clone(),
                    description: agent_description(target.case_study, &target.tracer_id, target.job_id),
                    files,
                };
                let context = self.contexts.create(request).await.map_err(upstream(
                    Operation::CreateResearchContext,
                    "failed to create research context",
                ))?;

                reporter.progress(Phase::CreateConversation);
                let conversation = self.create_conversation(context.id, &target).await?;

                Ok(BootstrapState::Done(BootstrapSuccess {
                    metadata: metadata.into_display(),
                    research_context: context,
                    conversation,
                }))
            }
            done @ BootstrapState::Done(_) => Ok(done),
        }
    }

    async fn resolve_context(&self, target: &Target) -> Result<Option<ResearchContext>, WorkflowFailure> {
        let contexts = self.contexts.list().await.map_err(upstream(
            Operation::ListResearchContexts,
            "failed to list research contexts",
        ))?;

        let mut matching: Vec<ResearchContext> = contexts
            .into_iter()
            .filter(|rc| rc.title == target.title)
            .collect();

        match matching.len() {
            0 => {
                debug!(title = %target.title, "No research context found");
                Ok(None)
            }
            1 => {
                let context = matching.remove(0);
                if !context.is_active() {
                    return Err(WorkflowFailure::new(
                        Operation::ListResearchContexts,
                        format!("research context {} found but not active", target.title),
                    ));
                }
                debug!(research_context_id = context.id, "Found research context");
                Ok(Some(context))
            }
            count => Err(WorkflowFailure::new(
                Operation::ListResearchContexts,
                format!("more than one research context found for {}", target.title),
            )
            .with_context(format!("{} matches", count))),
        }
    }

    async fn resolve_conversation(
        &self,
        target: &Target,
        context: &ResearchContext,
    ) -> Result<Option<Conversation>, WorkflowFailure> {
        let conversations = self.conversations.list(context.id).await.map_err(upstream(
            Operation::ListConversations,
            "failed to list conversations",
        ))?;

        let mut matching: Vec<Conversation> = conversations
            .into_iter()
            .filter(|c| c.title == target.title)
            .collect();

        if matching.len() > 1 {
            warn!(
                research_context_id = context.id,
                title = %target.title,
                count = matching.len(),
                "Multiple conversations match, using the last listed"
            );
        }

        Ok(matching.pop())
    }

    async fn load_metadata(&self, target: &Target) -> Result<CaseStudyMetadata, WorkflowFailure> {
        let metadata = self
            .metadata
            .fetch(target.metadata_key())
            .await
            .map_err(upstream(Operation::FetchMetadata, "failed to fetch case study metadata"))?;

        if metadata.case_study() != target.case_study {
            return Err(WorkflowFailure::new(
                Operation::ValidateMetadata,
                format!(
                    "metadata case study {} does not match requested {}",
                    metadata.case_study(),
                    target.case_study
                ),
            ));
        }

        if metadata.relative_paths_for_agent().is_empty() {
            return Err(WorkflowFailure::new(
                Operation::ValidateMetadata,
                "metadata lists no files for the agent",
            ));
        }

        Ok(metadata)
    }

    async fn agent_files(&self, metadata: &CaseStudyMetadata) -> Result<Vec<RemoteFile>, WorkflowFailure> {
        let wanted = metadata.relative_paths_for_agent();
        let files: Vec<RemoteFile> = self
            .source_data
            .list_for_client()
            .await
            .map_err(upstream(Operation::ListSourceData, "failed to list source data"))?
            .into_iter()
            .filter(|f| f.is_remote() && wanted.contains(&f.relative_path))
            .collect();

        if files.is_empty() {
            warn!(wanted = wanted.len(), "No source data matches the agent paths");
        } else {
            debug!(wanted = wanted.len(), matched = files.len(), "Selected agent files");
        }

        Ok(files)
    }

    async fn create_conversation(
        &self,
        research_context_id: i64,
        target: &Target,
    ) -> Result<Conversation, WorkflowFailure> {
        self.conversations
            .create(research_context_id, target.title.clone())
            .await
            .map_err(upstream(Operation::CreateConversation, "failed to create conversation"))
    }
}

/// Check the case study and derive the canonical title.
pub fn validate(request: &BootstrapRequest) -> Result<Target, WorkflowFailure> {
    let case_study = CaseStudyName::from_str(&request.case_study_name).map_err(|_| {
        WorkflowFailure::new(Operation::ValidateRequest, "unrecognized case study")
            .with_context(request.case_study_name.clone())
    })?;

    Ok(Target {
        case_study,
        tracer_id: request.tracer_id.clone(),
        job_id: request.job_id,
        title: canonical_title(case_study, &request.tracer_id, request.job_id),
    })
}

//! # Case Study Bootstrap
//!
//! Prepares the research-assistant side of a satellite or climate case-study
//! run: a research context and conversation in the kernel service, backed by an
//! OpenAI assistant that can search the run's source data.
//!
//! ## Architecture
//!
//! ```text
//! Caller → BootstrapWorkflow → capability traits (services)
//!                                   ├─ KernelClient       (contexts, conversations, storage)
//!                                   ├─ KernelMetadataStore (metadata.json → CaseStudyMetadata)
//!                                   └─ OpenAiProvisioner  (files, vector stores, assistants)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use casestudy_bootstrap::{Config, kernel::KernelClient, metadata::{KernelMetadataStore, MetadataParser}};
//! use casestudy_bootstrap::openai::{OpenAiClient, OpenAiProvisioner};
//! use casestudy_bootstrap::workflow::{BootstrapRequest, BootstrapWorkflow, ProgressReporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let kernel = Arc::new(KernelClient::new(&config.kernel, config.request.clone())?);
//!     let parser = MetadataParser::new(config.metadata.clone(), kernel.clone());
//!     let store = Arc::new(KernelMetadataStore::new(kernel.clone(), parser));
//!     let openai = OpenAiClient::new(&config.openai, config.request.clone())?;
//!     let provisioner = Arc::new(OpenAiProvisioner::new(openai, kernel.clone(), &config.openai.model));
//!     let workflow = BootstrapWorkflow::new(kernel.clone(), kernel.clone(), store, kernel, provisioner);
//!
//!     let (reporter, _events) = ProgressReporter::channel();
//!     workflow.execute(BootstrapRequest::new("sentinel-5p", "potato", 4), &reporter).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration loaded from the environment.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Kernel service client.
pub mod kernel;
/// Case-study metadata model, parser and store.
pub mod metadata;
/// OpenAI client and knowledge-base provisioner.
pub mod openai;
/// Agent instructions and generated text.
pub mod prompts;
/// Domain entities and collaborator capability traits.
pub mod services;
/// The case-study bootstrap workflow.
pub mod workflow;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use workflow::{BootstrapRequest, BootstrapWorkflow, ProgressReporter};

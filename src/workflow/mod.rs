//! Case-study bootstrap workflow.
//!
//! Given a case study, tracer id and job id, the workflow makes sure a research
//! context and a conversation exist for the run, wiring a fresh agent over the
//! run's source files when the context does not exist yet:
//!
//! ```text
//! validate → list contexts → list conversations → fetch metadata
//!     ├─ context exists:  reuse conversation | create conversation
//!     └─ no context:      list source data → index → agent → context → conversation
//! ```
//!
//! Progress and the terminal outcome are reported through a [`ProgressReporter`].

mod bootstrap;
mod events;
mod progress;

pub use bootstrap::{
    validate, BootstrapRequest, BootstrapState, BootstrapWorkflow, ExistingContext, Target,
};
pub use events::{
    BootstrapEvent, BootstrapSuccess, Operation, Phase, ProgressUpdate, ViewState,
    WorkflowFailure,
};
pub use progress::ProgressReporter;

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use super::events::{BootstrapEvent, BootstrapSuccess, Phase, ViewState, WorkflowFailure};

#[derive(Clone, Default)]
enum Sink {
    #[default]
    Silent,
    Channel(mpsc::UnboundedSender<BootstrapEvent>),
    Signal(Arc<watch::Sender<ViewState>>),
}

/// Where the workflow reports its phase transitions.
///
/// Sending never fails: once the receiving side is gone, reports are dropped.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    sink: Sink,
}

impl ProgressReporter {
    /// A reporter that discards everything.
    pub fn silent() -> Self {
        Self::default()
    }

    /// A reporter streaming every event into a channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BootstrapEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::from_sender(tx), rx)
    }

    /// Wrap an existing channel sender.
    pub fn from_sender(sender: mpsc::UnboundedSender<BootstrapEvent>) -> Self {
        Self {
            sink: Sink::Channel(sender),
        }
    }

    /// A reporter publishing into an observable view state that starts at
    /// [`ViewState::Request`].
    pub fn signal() -> (Self, watch::Receiver<ViewState>) {
        let (tx, rx) = watch::channel(ViewState::Request);
        let reporter = Self {
            sink: Sink::Signal(Arc::new(tx)),
        };
        (reporter, rx)
    }

    pub fn progress(&self, phase: Phase) {
        self.emit(BootstrapEvent::Progress(phase.into()));
    }

    pub fn success(&self, success: BootstrapSuccess) {
        self.emit(BootstrapEvent::Success(Box::new(success)));
    }

    pub fn failure(&self, failure: WorkflowFailure) {
        self.emit(BootstrapEvent::Error(failure));
    }

    pub fn emit(&self, event: BootstrapEvent) {
        let delivered = match &self.sink {
            Sink::Silent => true,
            Sink::Channel(tx) => tx.send(event).is_ok(),
            Sink::Signal(tx) => tx.send(event.into()).is_ok(),
        };

        if !delivered {
            debug!("Progress receiver dropped, discarding event");
        }
    }
}

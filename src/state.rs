use crate::events::{EventBroadcaster, FlowEvent};
use crate::{Result, ScrobbleError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which flow an event or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    Setlist,
    CsvImport,
}

/// Lifecycle of a flow.
///
/// ```text
/// Idle --> Fetching --> Ready --> Submitting
///  ^          |          |  ^         |
///  +----------+          |  +---------+
///  +---------------------+
/// ```
///
/// User controls are enabled only in `Idle` and `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowState {
    /// Nothing loaded
    Idle,
    /// A remote call or file parse is in flight
    Fetching,
    /// Results are loaded and may be acted on
    Ready,
    /// A scrobble batch is in flight
    Submitting,
}

impl FlowState {
    pub fn can_transition_to(self, next: FlowState) -> bool {
        use FlowState::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Ready, Fetching)
                | (Fetching, Idle)
                | (Fetching, Ready)
                | (Ready, Submitting)
                | (Submitting, Ready)
                | (Ready, Idle)
        )
    }

    /// Whether an operation is outstanding and user controls are disabled.
    pub fn is_busy(self) -> bool {
        matches!(self, FlowState::Fetching | FlowState::Submitting)
    }
}

/// State machine plus status line shared by both flows.
#[derive(Debug)]
pub struct FlowTracker {
    kind: FlowKind,
    state: FlowState,
    status: String,
    broadcaster: Arc<EventBroadcaster>,
}

impl FlowTracker {
    pub fn new(kind: FlowKind, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self {
            kind,
            state: FlowState::Idle,
            status: String::new(),
            broadcaster,
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }

    /// Move to `next`, emitting [`FlowEvent::StateChanged`].
    ///
    /// Staying in the current state is a no-op.
    pub fn transition(&mut self, next: FlowState) -> Result<()> {
        if self.state == next {
            return Ok(());
        }
        if !self.state.can_transition_to(next) {
            return Err(ScrobbleError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        log::debug!("{:?} flow: {:?} -> {:?}", self.kind, self.state, next);
        let from = std::mem::replace(&mut self.state, next);
        self.emit(FlowEvent::StateChanged {
            flow: self.kind,
            from,
            to: next,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Reject user interaction while an operation is outstanding.
    pub fn ensure_interactive(&self, operation: &'static str) -> Result<()> {
        if self.state.is_busy() {
            return Err(ScrobbleError::Busy(operation));
        }
        Ok(())
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.status = message.clone();
        self.emit(FlowEvent::StatusChanged {
            flow: self.kind,
            message,
        });
    }

    pub fn emit(&self, event: FlowEvent) {
        self.broadcaster.broadcast_event(event);
    }
}

//! # Flow Events
//!
//! This module provides the broadcast channel that flows use to announce state
//! changes to the presentation layer. A UI subscribes once and re-renders
//! whatever the event names, instead of binding to individual properties.

use crate::state::{FlowKind, FlowState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

/// Events emitted by the setlist and CSV flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEvent {
    /// The flow's state machine moved to a new state.
    StateChanged {
        flow: FlowKind,
        /// The previous state
        from: FlowState,
        /// The new state
        to: FlowState,
        timestamp: DateTime<Utc>,
    },
    /// The one-line status message changed.
    StatusChanged { flow: FlowKind, message: String },
    /// A new artist search result replaced the previous one.
    ArtistsLoaded {
        /// Number of artists found
        count: usize,
    },
    /// A page of setlists replaced the previous one.
    SetlistsLoaded {
        /// Number of setlists on this page
        count: usize,
        /// Page number (1-indexed)
        page: u32,
        /// Total number of pages
        total_pages: u32,
    },
    /// The list of candidate tracks was replaced or cleared.
    TracksLoaded { flow: FlowKind, count: usize },
    /// Some rows changed their selection flags.
    SelectionChanged {
        flow: FlowKind,
        /// Rows now marked for submission
        selected: usize,
    },
    /// CSV parsing finished with unparsable rows the user may export.
    ParseErrorsFound {
        /// Number of rows that could not be parsed
        count: usize,
    },
    /// A batch was handed to the scrobble service.
    ScrobblesSubmitted {
        flow: FlowKind,
        /// Number of scrobbles in the batch
        count: usize,
        /// Whether the service accepted it
        success: bool,
    },
}

/// Type alias for the broadcast receiver
pub type FlowEventReceiver = broadcast::Receiver<FlowEvent>;

/// Type alias for the watch receiver
pub type FlowEventWatcher = watch::Receiver<Option<FlowEvent>>;

/// Shared event broadcasting state.
///
/// Several flows may share one broadcaster so a UI needs a single subscription.
#[derive(Clone)]
pub struct EventBroadcaster {
    event_tx: broadcast::Sender<FlowEvent>,
    last_event_tx: watch::Sender<Option<FlowEvent>>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with room for 100 queued events per receiver.
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast_event(&self, event: FlowEvent) {
        let _ = self.event_tx.send(event.clone());
        self.last_event_tx.send_replace(Some(event));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> FlowEventReceiver {
        self.event_tx.subscribe()
    }

    /// Watch the most recent event
    pub fn watch(&self) -> FlowEventWatcher {
        self.last_event_tx.subscribe()
    }

    /// Get the latest event
    pub fn latest_event(&self) -> Option<FlowEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

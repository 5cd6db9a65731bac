use crate::state::FlowState;
use thiserror::Error;

/// Error types for scrobble import operations.
///
/// Failures of the external services are caught by the flows and turned into a
/// status message, so most callers only ever see the variants describing misuse
/// of a flow (wrong state, bad index) or local I/O problems.
///
/// # Error Handling Examples
///
/// ```rust
/// use scrobble_import::{FlowState, ScrobbleError};
///
/// let err = ScrobbleError::InvalidTransition {
///     from: FlowState::Idle,
///     to: FlowState::Submitting,
/// };
///
/// match err {
///     ScrobbleError::Service(msg) => eprintln!("Remote call failed: {}", msg),
///     ScrobbleError::InvalidTransition { from, to } => {
///         eprintln!("Cannot go from {:?} to {:?}", from, to);
///     }
///     e => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum ScrobbleError {
    /// An external service (artist search, setlist lookup, scrobbling) failed.
    ///
    /// This covers network failures and error responses alike; the services
    /// are implemented by the host application.
    #[error("Service error: {0}")]
    Service(String),

    /// A value could not be parsed (timestamp, duration, JSON document).
    #[error("Failed to parse: {0}")]
    Parse(String),

    /// The CSV reader failed in a way that affects the whole file.
    ///
    /// Row-level problems never produce this error; they are collected as
    /// [`CsvParseError`](crate::CsvParseError)s instead.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The flow's state machine does not allow the requested transition.
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// State the flow was in
        from: FlowState,
        /// State the operation tried to enter
        to: FlowState,
    },

    /// The flow is fetching or submitting and rejects user interaction.
    #[error("Operation '{0}' rejected while the flow is busy")]
    Busy(&'static str),

    /// A list index supplied by the caller does not exist.
    #[error("Index {index} out of range for {len} items")]
    OutOfRange {
        /// The requested index
        index: usize,
        /// Number of items available
        len: usize,
    },

    /// The step between two timestamps cannot be represented, or stepping
    /// would leave the supported date range.
    #[error("Timestamp out of range: {0}")]
    TimestampRange(String),

    /// An operation needs a choice the user has not made yet.
    #[error("No {0} selected")]
    NotSelected(&'static str),

    /// A background task panicked or was aborted.
    #[error("Background task failed: {0}")]
    Task(String),

    /// File system I/O errors.
    ///
    /// This can occur when reading CSV files, writing error reports or
    /// persisting configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialisation errors for configuration and setlist documents.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

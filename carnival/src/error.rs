//! Error types shared by every Carnival game.
//!
//! Nothing here is fatal: a `ValidationError` is answered with an inline
//! message and no state change, an `InferenceError` is surfaced once and the
//! player may resubmit by hand.

use thiserror::Error;

/// Input that was rejected before it could touch session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The guess was empty once non-letters were stripped.
    #[error("Please enter a word")]
    EmptyGuess,

    /// The word was already guessed in this session.
    #[error("'{0}' has already been searched")]
    DuplicateGuess(String),

    /// A toggle or click landed outside the logical image grid.
    #[error("Cell ({x}, {y}) is outside the {grid_size}x{grid_size} grid")]
    OutOfBounds { x: i64, y: i64, grid_size: u32 },

    /// A stored point set listed the same cell twice.
    #[error("Cell ({x}, {y}) appears more than once")]
    DuplicateCell { x: u32, y: u32 },

    /// Submission of a sketch with no toggled cells.
    #[error("Toggle at least one cell before submitting")]
    EmptySketch,
}

/// Failures reported by, or on the way to, the hosted inference service.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference request failed: {0}")]
    Transport(String),

    #[error("Inference service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed inference output: {0}")]
    Malformed(String),

    #[error("Prediction {status}: {message}")]
    PredictionFailed { status: String, message: String },

    #[error("Prediction still pending after {polls} polls")]
    Timeout { polls: u32 },

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// Top-level error for session operations.
#[derive(Debug, Error)]
pub enum CarnivalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ExternalService(#[from] InferenceError),

    /// A second submit arrived while the first was still outstanding.
    #[error("A request is already in flight")]
    SubmissionInFlight,

    /// A response was applied to a session that was not waiting for one.
    #[error("No request is in flight")]
    NothingInFlight,
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, CarnivalError>;

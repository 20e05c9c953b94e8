//! Error types shared across the crate.
//!
//! Invariant violations and protocol violations surface as [`EngineError`]
//! from the state machine; collaborator failures are [`ExternalError`] and
//! [`StoreError`], which the machine turns into a notification and a return
//! to idle rather than propagating.

use crate::element::ElementId;
use crate::input::StateTag;

/// Errors returned by [`crate::engine::EngineCore::handle`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The current state does not accept this event. The state is unchanged.
    #[error("event `{event}` is not accepted in state `{state}`")]
    UnexpectedEvent { state: StateTag, event: &'static str },
    /// An operation referenced an element that is not in the store.
    #[error("element {0} does not exist")]
    MissingElement(ElementId),
    /// An operation that needs a selection ran with nothing selected.
    #[error("operation requires at least one selected element")]
    EmptySelection,
    /// A point edit targeted an element without a point list.
    #[error("element {0} is not a linear element")]
    NotLinear(ElementId),
    /// A text edit targeted an element that is not text.
    #[error("element {0} is not a text element")]
    NotText(ElementId),
    #[error("point index {index} out of range for {len} handles")]
    PointIndexOutOfRange { index: usize, len: usize },
}

/// Failures of the clipboard and image collaborators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExternalError {
    #[error("clipboard access denied: {0}")]
    ClipboardDenied(String),
    #[error("image is too large ({bytes} bytes, max {max})")]
    ImageTooLarge { bytes: usize, max: usize },
    #[error("image could not be decoded: {0}")]
    ImageDecode(String),
}

/// Failures of a persistence store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid zoom range: min {min} must be positive and below max {max}")]
    ZoomRange { min: f64, max: f64 },
    #[error("{var} must be positive")]
    NotPositive { var: &'static str },
}

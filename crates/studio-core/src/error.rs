use crate::event::EventKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecorderError {
    #[error("Command index {index} out of range (log has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    #[error("Failed to subscribe to '{event}' events: {reason}")]
    Subscribe { event: EventKind, reason: String },

    #[error("Unknown event type: {0}")]
    UnknownEvent(String),
}

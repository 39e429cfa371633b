//! Error type shared by every fallible tint operation.

pub type Result<T> = std::result::Result<T, TintError>;

#[derive(Debug, thiserror::Error)]
pub enum TintError {
    /// The input text is not a well-formed document (or fragment).
    #[error("Malformed document at byte {position}: {message}")]
    MalformedDocument { position: u64, message: String },

    /// A group fragment no longer parses after its properties were rewritten.
    #[error("Rewritten group `{group}` is not a well-formed element: {message}")]
    InvalidRewrittenFragment { group: String, message: String },

    /// No element matched the layer selector, so there is nothing to rebuild.
    #[error("No layer container found ({selector})")]
    MissingLayerContainer { selector: String },

    #[error("Invalid theme JSON: {0}")]
    Theme(#[from] serde_json::Error),
}

impl TintError {
    pub(crate) fn malformed(position: u64, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            position,
            message: message.into(),
        }
    }
}

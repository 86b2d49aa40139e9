//! Error type shared by every transformation step.

/// Result alias for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors that can occur while mapping an event to a statement.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A field declared as required is absent (or null) in the payload
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field is present but cannot be interpreted
    #[error("Invalid field {path}: {reason}")]
    InvalidField {
        /// Dotted path of the offending field
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// The transformer has no object type or identifier configured
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// No transformer is registered for the event type
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// A transformer is already registered for the event type
    #[error("Event type already registered: {0}")]
    DuplicateEventType(String),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransformError {
    /// Build an [`TransformError::InvalidField`] for `path`.
    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

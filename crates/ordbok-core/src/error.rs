/// Shown when a failed lookup carries no message of its own
pub const GENERIC_FAILURE: &str = "Failed to connect. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Single error state a lookup reports to its caller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("Lookup failed: {message}")]
    Failed { message: String },
}

impl LookupError {
    pub fn failed(message: impl Into<String>) -> Self {
        LookupError::Failed {
            message: message.into(),
        }
    }

    /// Human-readable text for the error state
    pub fn user_message(&self) -> String {
        match self {
            LookupError::EmptyQuery => "Type a word to look up.".to_string(),
            LookupError::Failed { message } if !message.trim().is_empty() => message.clone(),
            LookupError::Failed { .. } => GENERIC_FAILURE.to_string(),
        }
    }
}

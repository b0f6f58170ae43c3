pub mod client;
pub mod prompt;
pub mod response;
pub mod retry;

pub use client::{ClientError, GeneratorClient};
pub use prompt::LanguageProfile;
pub use retry::{RetryPolicy, is_rate_limited, with_retry, with_retry_when};

/// Remote text generation interface
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Run one generation and return the raw response text
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system_instruction: String,
    pub prompt: String,
    /// Shape the response is asked to follow, if any
    pub response_schema: Option<serde_json::Value>,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub model: String,
    pub requires_api_key: bool,
}

/// Failures at the generator boundary. Status codes are part of the message
/// so that rate limits stay recognizable after conversion to text.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Authentication error")]
    AuthenticationError,

    #[error("Malformed response: {0}")]
    Malformed(String),
}

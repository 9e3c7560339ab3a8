/// Errors raised while talking to the model or running the chat loop.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The model API returned a non-2xx status code.
    #[error("Model API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Model kept requesting tools after {0} rounds")]
    ToolLoopExhausted(usize),

    #[error(transparent)]
    Store(#[from] sentry_db::StoreError),
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::InvalidResponse(err.to_string())
    }
}

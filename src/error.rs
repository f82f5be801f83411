//! Error types for the finance chat assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Pipeline Errors
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    // Router-level parse failures. Display text is the exact reply
    // shown to the user; the store is never mutated on these.
    #[error("Formato inválido. Use: 'registrar receita VALOR | DESCRIÇÃO'.")]
    MalformedIncomePayload,

    #[error("Formato inválido. Use: 'definir meta de gastos X'.")]
    MalformedGoalPayload,

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AssistantError {
    /// True for the router-level payload failures that carry their own
    /// fixed instructional reply text.
    pub fn is_malformed_payload(&self) -> bool {
        matches!(
            self,
            AssistantError::MalformedIncomePayload | AssistantError::MalformedGoalPayload
        )
    }
}

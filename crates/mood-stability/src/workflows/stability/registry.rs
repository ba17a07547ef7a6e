use serde::Serialize;

use super::domain::{Message, Scale, ScaleId, StabilityFormula, UserId};

/// Source of scale definitions, satisfied by any storage backend.
pub trait ScaleRegistry: Send + Sync {
    fn active_scales(&self, user: &UserId) -> Result<Vec<Scale>, RegistryError>;
    fn scales_by_ids(&self, ids: &[ScaleId]) -> Result<Vec<Scale>, RegistryError>;
}

/// Source of stored stability formulas.
pub trait FormulaRegistry: Send + Sync {
    fn active_formula(&self, user: &UserId) -> Result<Option<StabilityFormula>, RegistryError>;
    fn default_formula(&self) -> Result<Option<StabilityFormula>, RegistryError>;
}

/// Error enumeration for registry failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Chat completion request handed to the text-generation provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

/// Text-generation provider. Implementations own transport, timeouts, and
/// retries; callers only see the assistant's reply text.
pub trait AssistantClient: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("assistant error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("no response received from assistant")]
    NoResponse,
}

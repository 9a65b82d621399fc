use async_trait::async_trait;
use serde_json::Value;

/// Structured-output request for a text-understanding service.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// Full instruction prompt, script text already embedded
    pub prompt: String,
    /// Name the provider associates with the schema
    pub schema_name: String,
    /// JSON schema the response must conform to
    pub schema: Value,
}

/// Repository for the external service that turns script text into lines.
/// Abstracts the provider (OpenAI, Gemini through an OpenAI-compatible
/// endpoint, a local model server, etc.)
///
/// Implementations make exactly one call per request. They return the raw
/// response text untouched; validation belongs to the caller.
#[async_trait]
pub trait ScriptModelRepository: Send + Sync {
    /// Returns `Ok(None)` when the provider answered without any content.
    ///
    /// # Errors
    /// Returns the upstream failure reason (network, auth, quota, ...)
    async fn complete_structured(&self, request: &StructuredRequest)
        -> Result<Option<String>, String>;
}

use super::script_model_repository::{ScriptModelRepository, StructuredRequest};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Script parsing through an OpenAI-compatible chat completions endpoint,
/// using schema-constrained (`json_schema`, strict) responses.
pub struct OpenAiScriptModelRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiScriptModelRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    /// Build a client from an API key and an optional alternative API base
    pub fn client_from(api_key: &str, api_base: Option<&str>) -> Client<OpenAIConfig> {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base {
            config = config.with_api_base(base);
        }
        Client::with_config(config)
    }
}

#[async_trait]
impl ScriptModelRepository for OpenAiScriptModelRepository {
    async fn complete_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, String> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            model = %self.model,
            schema = %request.schema_name,
            prompt_length = request.prompt.len(),
            "Calling chat completions for script parsing"
        );

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(|e| format!("failed to build request message: {}", e))?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([message.into()])
            .temperature(0.0)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: Some("Dialogue lines and stage directions of a script".to_string()),
                    name: request.schema_name.clone(),
                    schema: Some(request.schema.clone()),
                    strict: Some(true),
                },
            })
            .build()
            .map_err(|e| format!("failed to build chat request: {}", e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                prompt_length = request.prompt.len(),
                "Chat completions call failed"
            );
            format!("upstream error: {}", e)
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty());

        tracing::info!(
            provider = "openai",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis(),
            response_length = content.as_ref().map(|c| c.len()).unwrap_or(0),
            "Chat completions call finished"
        );

        Ok(content)
    }
}

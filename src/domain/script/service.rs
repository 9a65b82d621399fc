use super::error::ParseError;
use super::prompt::{build_prompt, line_schema, SCHEMA_NAME};
use super::validation::validate_response;
use crate::domain::scene::ParsedLine;
use crate::infrastructure::repositories::{ScriptModelRepository, StructuredRequest};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ScriptParser {
    model_repo: Arc<dyn ScriptModelRepository>,
    max_script_chars: usize,
}

impl ScriptParser {
    pub fn new(model_repo: Arc<dyn ScriptModelRepository>, max_script_chars: usize) -> Self {
        Self {
            model_repo,
            max_script_chars,
        }
    }
}

#[async_trait]
pub trait ScriptParserApi: Send + Sync {
    /// Turn raw script text into line records
    ///
    /// This operation:
    /// - Rejects blank or oversized input without calling upstream
    /// - Makes a single schema-constrained call to the text-understanding service
    /// - Validates the response shape strictly (no best-effort recovery)
    ///
    /// Returned records are exactly what the service produced.
    async fn parse(&self, raw_text: &str) -> Result<Vec<ParsedLine>, ParseError>;
}

#[async_trait]
impl ScriptParserApi for ScriptParser {
    async fn parse(&self, raw_text: &str) -> Result<Vec<ParsedLine>, ParseError> {
        self.guard_input(raw_text)?;

        let request = StructuredRequest {
            prompt: build_prompt(raw_text),
            schema_name: SCHEMA_NAME.to_string(),
            schema: line_schema(),
        };

        let response = self
            .model_repo
            .complete_structured(&request)
            .await
            .map_err(ParseError::Upstream)?
            .ok_or(ParseError::EmptyResponse)?;

        let lines = validate_response(&response).map_err(|e| {
            tracing::warn!(
                error = %e,
                response_length = response.len(),
                "Script parse response rejected"
            );
            e
        })?;

        tracing::info!(
            input_length = raw_text.len(),
            line_count = lines.len(),
            "Script parsed"
        );

        Ok(lines)
    }
}

impl ScriptParser {
    fn guard_input(&self, raw_text: &str) -> Result<(), ParseError> {
        if raw_text.trim().is_empty() {
            return Err(ParseError::Invalid("Script text cannot be empty".to_string()));
        }

        let length = raw_text.chars().count();
        if length > self.max_script_chars {
            return Err(ParseError::TooLarge {
                length,
                limit: self.max_script_chars,
            });
        }

        Ok(())
    }
}

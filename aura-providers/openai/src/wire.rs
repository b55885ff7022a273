//! Chat completions request and response payloads.

use aura_core::{GenerationRequest, ResponseSchema, ServiceError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 2],
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: Value,
}

impl<'a> ChatRequest<'a> {
    pub(crate) fn from_generation(request: &'a GenerationRequest<'a>) -> Self {
        Self {
            model: request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.instruction.to_owned(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user_content(),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.schema.name,
                    strict: true,
                    schema: request.schema.json_schema(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Pulls the structured content out of a chat completions body.
///
/// A malformed envelope is an upstream failure; an envelope without usable
/// content (refusal, truncation, no choices) means the model could not
/// produce schema-conforming output.
pub(crate) fn extract_content(body: &str, schema: &ResponseSchema) -> Result<String, ServiceError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|err| {
        ServiceError::upstream(format!("failed to parse chat completion payload: {err}"))
    })?;
    let violation = |reason: String| ServiceError::SchemaValidation {
        schema: schema.name.to_owned(),
        reason,
    };

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| violation("completion contained no choices".to_owned()))?;
    if let Some(refusal) = choice.message.refusal {
        return Err(violation(format!("model refused: {refusal}")));
    }
    if choice.finish_reason.as_deref() == Some("length") {
        return Err(violation("output truncated at the token limit".to_owned()));
    }
    choice
        .message
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| violation("completion returned no content".to_owned()))
}

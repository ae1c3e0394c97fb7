/// LLM client: the single entry point for every Claude API call.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: claude-sonnet-4-5 (fixed, not configurable)
///
/// There is no retry loop and no client-side timeout: a failed call is reported
/// once, and slow calls rely on the transport defaults.
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

pub mod prompts;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
/// Shared by every call; not read from configuration.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Analysis service API key is not configured")]
    NotConfigured,

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse API response as JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API with structured output helpers.
///
/// The API key is optional at construction so the service can start without
/// one; every call then fails with `LlmError::NotConfigured` before any
/// request leaves the process.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes a single call to the Claude API, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(classify_api_error(status, message));
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }

    /// Convenience method that calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;

        let text = response.text().ok_or(LlmError::EmptyContent)?;

        parse_json_payload(text)
    }
}

/// Parses model output as JSON after fence-stripping and brace-trimming.
/// The raw text is logged when parsing fails.
pub fn parse_json_payload<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let payload = extract_json_payload(text);
    serde_json::from_str(payload).map_err(|source| {
        error!(raw = %payload, "Failed to parse JSON response from LLM: {source}");
        LlmError::Parse {
            source,
            raw: payload.to_string(),
        }
    })
}

fn classify_api_error(status: StatusCode, message: String) -> LlmError {
    let lower = message.to_lowercase();
    let key_rejected = lower.contains("api key not valid")
        || lower.contains("invalid x-api-key")
        || lower.contains("invalid api key");
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) || key_rejected {
        return LlmError::InvalidApiKey(message);
    }
    LlmError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Reduces LLM output to the JSON object it carries.
///
/// 1. ```` ```json ... ``` ```` or ```` ``` ... ``` ```` fences are removed.
/// 2. If the remainder still does not start with `{`, the span from the first
///    `{` to the last `}` is used.
pub fn extract_json_payload(text: &str) -> &str {
    let text = strip_json_fences(text);
    if text.starts_with('{') {
        return text;
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// Any language tag directly after the opening fence is dropped.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };
    let inner = inner
        .trim_start_matches(|c: char| c.is_alphanumeric() || c == '_')
        .trim();
    if inner.is_empty() {
        text
    } else {
        inner
    }
}

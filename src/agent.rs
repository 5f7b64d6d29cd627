//! LLM agent for summarisation.
//!
//! Speaks the OpenAI-compatible chat-completions protocol that Groq
//! exposes. The whole acquired text is stuffed into a single prompt and
//! summarised in one completion; nothing is chunked or map-reduced.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::AgentConfig;
use crate::document::Document;

/// The fixed summarisation prompt; `{text}` is its single slot.
pub const SUMMARY_TEMPLATE: &str =
    "Provide a 300-word summary of the following content:\nContent: {text}";

const SLOT: &str = "{text}";

/// Default timeout for completion requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("LLM rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("LLM response contained no summary")]
    EmptyResponse,
    #[error("prompt template must contain exactly one {{text}} slot")]
    BadTemplate,
}

/// A prompt with exactly one `{text}` substitution slot.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Validate and wrap a template string.
    pub fn new(template: impl Into<String>) -> Result<Self, AgentError> {
        let template = template.into();
        if template.matches(SLOT).count() != 1 {
            return Err(AgentError::BadTemplate);
        }
        Ok(Self { template })
    }

    /// The built-in bounded-length summary prompt.
    pub fn summary() -> Self {
        Self {
            template: SUMMARY_TEMPLATE.to_string(),
        }
    }

    /// Substitute text into the slot, verbatim. The substituted text is
    /// never re-scanned for slots.
    pub fn render(&self, text: &str) -> String {
        self.template.replacen(SLOT, text, 1)
    }
}

/// The model one request runs against: model name plus the credential to
/// authenticate with. Built fresh per invocation; the key is never logged.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    pub model: String,
    pub api_key: String,
}

impl ModelHandle {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
        }
    }
}

/// Produces a summary from acquired documents.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Stuff every document's text into the prompt's slot and run one
    /// completion against the handle's model.
    async fn summarize(
        &self,
        handle: &ModelHandle,
        prompt: &PromptTemplate,
        documents: &[Document],
    ) -> Result<String, AgentError>;
}

/// Concatenate every document's text into one context block.
pub fn stuff_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| doc.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Chat-completions client for the Groq API.
pub struct GroqAgent {
    client: Client,
    api_base: String,
}

impl GroqAgent {
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Summarizer for GroqAgent {
    async fn summarize(
        &self,
        handle: &ModelHandle,
        prompt: &PromptTemplate,
        documents: &[Document],
    ) -> Result<String, AgentError> {
        let context = stuff_documents(documents);
        let rendered = prompt.render(&context);
        let body = ChatRequest {
            model: &handle.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &rendered,
            }],
        };

        tracing::debug!(model = %handle.model, prompt_chars = rendered.len(), "requesting summary");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&handle.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request rejected")
                        .to_string()
                });
            return Err(AgentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AgentError::EmptyResponse)
    }
}

//! Hosted model client.
//!
//! The engine hands the API layer a rendered system instruction; this module
//! turns it into a chat-completions call. Configuration is via environment
//! variables:
//! - `INTAKE_OPENAI_API_KEY` - API key (required for live calls)
//! - `INTAKE_OPENAI_MODEL` - model name (default: `gpt-4o-mini`)
//! - `INTAKE_OPENAI_URL` - API base URL (default: `https://api.openai.com/v1`)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Message;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API key not configured (set INTAKE_OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("Model API returned {0}: {1}")]
    Api(StatusCode, String),

    #[error("Model reply contained no choices")]
    EmptyReply,
}

/// Seam between the turn loop and whatever produces assistant replies.
/// Tests script this; production uses [`OpenAiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String, ModelError>;
}

/// Chat-completions client for the OpenAI API (or anything wire-compatible).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl OpenAiClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("INTAKE_OPENAI_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("INTAKE_OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_key = std::env::var("INTAKE_OPENAI_API_KEY").ok();
        Self::new(base_url, api_key, model)
    }

    /// Create with explicit configuration.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String, ModelError> {
        let api_key = self.api_key.as_ref().ok_or(ModelError::MissingApiKey)?;

        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(WireMessage {
            role: "system",
            content: system,
        });
        wire.extend(messages.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        let request = ChatRequest {
            model: &self.model,
            messages: wire,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(status, body));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ModelError::EmptyReply)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

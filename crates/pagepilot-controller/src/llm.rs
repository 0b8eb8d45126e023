//! Client for an OpenAI-compatible chat completion API.

use serde::{Deserialize, Serialize};

use pagepilot_config::LlmConfig;

use crate::chat::ChatMessage;
use crate::error::ControllerError;
use crate::prompt::SYSTEM_PROMPT;

/// Thin completion client. The system prompt is prepended on every call so
/// callers only manage the task transcript.
pub struct LlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<&'a ChatMessage>,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::with_url(&config.api_url, config.api_key.clone(), config.model.clone())
    }

    /// Create a client against a custom API root (for compatible APIs and tests).
    pub fn with_url(api_url: &str, api_key: String, model: String) -> Self {
        LlmClient {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", api_url.trim_end_matches('/')),
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the transcript and return the assistant's reply text.
    pub async fn complete(&self, transcript: &[ChatMessage]) -> Result<String, ControllerError> {
        let system = ChatMessage::system(SYSTEM_PROMPT);
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(&system);
        messages.extend(transcript.iter());

        let api_request = ApiRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ControllerError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ControllerError::LlmApi { status, message });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ControllerError::Network(e.to_string()))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);

        match content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ControllerError::UnparseableReply(
                "completion carried no content".to_string(),
            )),
        }
    }
}

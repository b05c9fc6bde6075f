//! Minimal OpenAI-compatible chat-completions client.
//!
//! Every model call the pipeline makes (routing oracle and worker
//! generation) goes through this client. Responses are reduced to the first
//! choice's message content; anything else counts as a malformed response.

use serde_json::{json, Value};

use crate::config::{ConfigError, ModelProfile};

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("missing API key environment variable: {0}")]
    MissingApiKey(String),
    #[error("request to {0} failed: {1}")]
    Request(String, String),
    #[error("provider returned status {status}: {body}")]
    BadStatus { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Chat client bound to a single model profile.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    profile: ModelProfile,
    api_key: String,
}

impl ChatClient {
    pub fn new(profile: ModelProfile, timeout_ms: u64) -> Result<Self, LlmError> {
        let api_key = profile.api_key().map_err(|e| match e {
            ConfigError::MissingApiKey(var) => LlmError::MissingApiKey(var),
            other => LlmError::ClientBuild(other.to_string()),
        })?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            profile,
            api_key,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.profile.id
    }

    /// Send one system+user exchange and return the assistant text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = endpoint_url(&self.profile.base_url);
        let payload = json!({
            "model": self.profile.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Request(url.clone(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::BadStatus {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
        extract_content(&parsed)
    }
}

fn endpoint_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn extract_content(response: &Value) -> Result<String, LlmError> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| {
            LlmError::MalformedResponse("no choices[0].message.content in response".to_string())
        })
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::prompts::PromptParts;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const BASE_URL_ENV: &str = "FLOWGPT_LLM_BASE_URL";
const MODEL_ENV: &str = "FLOWGPT_LLM_MODEL";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Read the configuration from the environment. The API key is required;
    /// base URL and model fall back to the hosted defaults.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }
        if let Ok(model) = env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug)]
pub enum LlmError {
    MissingApiKey,
    Http(reqwest::Error),
    Api { status: u16, body: String },
    EmptyReply,
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => {
                write!(f, "completion API key is not configured (set {API_KEY_ENV})")
            }
            Self::Http(source) => write!(f, "completion API request failed: {source}"),
            Self::Api { status, body } => {
                write!(f, "completion API returned status {status}: {body}")
            }
            Self::EmptyReply => f.write_str("completion API returned an empty reply"),
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(source) => Some(source),
            _ => None,
        }
    }
}

/// Thin client for an OpenAI-style `chat/completions` endpoint.
///
/// One request per call, no retries: a failed call surfaces an error and the
/// operation is abandoned, matching the UI's fire-and-forget contract.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl CompletionClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(LlmError::Http)?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    pub async fn complete(&self, prompt: &PromptParts) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: &prompt.system },
                ChatMessage { role: "user", content: &prompt.user },
            ],
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status: status.as_u16(), body });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(LlmError::Http)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            return Err(LlmError::EmptyReply);
        }
        Ok(content.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatCompletionResponse, LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

    #[test]
    fn config_defaults_to_hosted_endpoint() {
        let config = LlmConfig::new("sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model(), DEFAULT_MODEL);

        let config = config.with_model("gpt-4o-mini").with_base_url("http://localhost:1234/v1");
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.base_url, "http://localhost:1234/v1");
    }

    #[test]
    fn completion_response_deserializes_wire_shape() {
        let raw = r#"{
            "choices": [
                { "message": { "role": "assistant", "content": "graph TD\n    A --> B" } }
            ]
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("graph TD\n    A --> B")
        );
    }
}

//! OpenAI-compatible chat completion client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use termset_core::config::LlmConfig;
use termset_core::error::AppError;
use termset_core::result::AppResult;

use crate::http::{check_status, read_json, transport_error};
use crate::traits::LlmClient;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat client with a fast and a good model.
#[derive(Debug, Clone)]
pub struct HttpLlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl HttpLlmClient {
    /// Client using `config`.
    pub fn new(http: reqwest::Client, config: LlmConfig) -> Self {
        Self { http, config }
    }

    fn model(&self, use_fast_model: bool) -> &str {
        if use_fast_model {
            &self.config.fast_model
        } else {
            &self.config.good_model
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn chat(&self, prompt: &str, use_fast_model: bool) -> AppResult<String> {
        let what = "LLM chat";
        let model = self.model(use_fast_model);
        debug!("Sending {} prompt characters to {}", prompt.len(), model);

        let response = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.config.url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.api_key)
            .json(&ChatRequest {
                model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;
        let response = check_status(response, what).await?;
        let body: ChatResponse = read_json(response, what).await?;

        body.choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| AppError::external("LLM response contained no text"))
    }
}

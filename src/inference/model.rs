//! Language model backends.
//!
//! [`LanguageModel`] takes a fully rendered prompt and returns only the newly
//! generated text. [`HttpCompletionModel`] talks to an OpenAI-compatible
//! `/v1/completions` endpoint (vLLM, TGI, llama.cpp server), which already
//! returns just the continuation of the prompt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ModelConfig;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no completion")]
    EmptyResponse,

    #[error("model error: {0}")]
    Other(String),
}

/// Text generation backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate at most `max_new_tokens` tokens continuing `prompt`.
    async fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String, ModelError>;

    /// Model identifier, for logs
    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
    stream: bool,
    echo: bool,
    skip_special_tokens: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

/// Client for an OpenAI-compatible text completion server.
pub struct HttpCompletionModel {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
}

impl HttpCompletionModel {
    pub fn new(config: &ModelConfig) -> Self {
        let mut builder = Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }

        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            url: completions_url(&config.endpoint),
            model: config.name.clone(),
            temperature: config.temperature,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `{endpoint}/v1/completions`, tolerating a trailing slash or an explicit `/v1`.
fn completions_url(endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/completions")
    } else {
        format!("{base}/v1/completions")
    }
}

fn first_completion(response: CompletionResponse) -> Result<String, ModelError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .ok_or(ModelError::EmptyResponse)
}

#[async_trait]
impl LanguageModel for HttpCompletionModel {
    #[tracing::instrument(skip(self, prompt), fields(prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String, ModelError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: max_new_tokens,
            temperature: self.temperature,
            stream: false,
            echo: false,
            skip_special_tokens: true,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = first_completion(response.json().await?)?;
        tracing::debug!(generated_chars = text.len(), "completion_received");
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

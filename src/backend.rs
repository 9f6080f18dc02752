use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{BlogError, Tiered};

pub type Generated = Tiered<String>;

const TEMPERATURE: f32 = 0.7;

/// A text-generation model. Implementations may block for a long time.
#[async_trait]
pub trait TextBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Local model served over the Ollama-style `/api/generate` endpoint.
pub struct LocalModel {
    client: Client,
    base_url: String,
    model: String,
}

impl LocalModel {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

impl fmt::Debug for LocalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalModel")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl TextBackend for LocalModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: max_tokens,
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BlogError::BackendUnavailable(format!("HTTP status {}", response.status())).into());
        }

        let body = response.json::<GenerateResponse>().await?;
        Ok(body.response)
    }
}

/// Wraps an optional backend and degrades to canned prose.
#[derive(Debug, Default)]
pub struct ContentBackend {
    inner: Option<Box<dyn TextBackend>>,
}

impl ContentBackend {
    pub fn new(inner: Option<Box<dyn TextBackend>>) -> Self {
        Self { inner }
    }

    pub fn from_config(config: Option<&BackendConfig>) -> Self {
        Self::new(config.map(|c| Box::new(LocalModel::new(c)) as Box<dyn TextBackend>))
    }

    pub fn describe(&self) -> &str {
        self.inner.as_ref().map(|b| b.name()).unwrap_or("canned fallback")
    }

    pub async fn generate(&self, prompt: &str, token_budget: u32) -> Generated {
        let Some(backend) = &self.inner else {
            return Tiered::Fallback(canned_text(prompt).to_string());
        };

        match backend.complete(prompt, token_budget).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(backend = backend.name(), chars = text.len(), "Generated text");
                Tiered::Primary(text.trim().to_string())
            }
            Ok(_) => {
                warn!(backend = backend.name(), "Backend returned empty text, using canned text");
                Tiered::Fallback(canned_text(prompt).to_string())
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Backend failed, using canned text");
                Tiered::Fallback(canned_text(prompt).to_string())
            }
        }
    }
}

fn canned_text(prompt: &str) -> &'static str {
    let prompt = prompt.to_lowercase();

    if prompt.contains("top 10") {
        "Here are the top 10 tennis rackets that excel in their respective categories, offering exceptional performance for players of all skill levels."
    } else if prompt.contains("utr") {
        "Improving your UTR rating requires consistent practice, proper technique, and strategic match play to see significant gains."
    } else if prompt.contains("racket") {
        "This racket offers excellent performance characteristics that make it suitable for players seeking specific playing styles."
    } else if prompt.contains("drill") {
        "This drill focuses on improving fundamental tennis skills through consistent practice and proper technique."
    } else {
        "Tennis improvement requires dedication, proper equipment, and consistent practice to reach your goals."
    }
}

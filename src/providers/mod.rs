mod anthropic;
mod ollama;
mod open_ai;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use open_ai::OpenAIProvider;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{ImportError, Result};
use crate::pdf::EmbeddedImage;
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// One completion backend, chosen once at startup
pub enum Provider {
    OpenAI(OpenAIProvider),
    Anthropic(AnthropicProvider),
    Ollama(OllamaProvider),
}

impl Provider {
    /// Create the provider described by `config`
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Ok(match config.kind {
            ProviderKind::OpenAi => Provider::OpenAI(OpenAIProvider::new(config)?),
            ProviderKind::Anthropic => Provider::Anthropic(AnthropicProvider::new(config)?),
            ProviderKind::Ollama => Provider::Ollama(OllamaProvider::new(config)?),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::OpenAI(_) => ProviderKind::OpenAi,
            Provider::Anthropic(_) => ProviderKind::Anthropic,
            Provider::Ollama(_) => ProviderKind::Ollama,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI(p) => &p.model,
            Provider::Anthropic(p) => &p.model,
            Provider::Ollama(p) => &p.model,
        }
    }

    /// Send a single prompt (with optional images) and return the answer text.
    pub fn complete(&self, prompt: &str, images: &[EmbeddedImage]) -> Result<String> {
        match self {
            Provider::OpenAI(p) => p.complete(prompt, images),
            Provider::Anthropic(p) => p.complete(prompt, images),
            Provider::Ollama(p) => p.complete(prompt, images),
        }
    }
}

pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ImportError::provider(provider, format!("Failed to build HTTP client: {}", e)))
}

/// Send `request` and decode the JSON body, mapping every failure to a provider error.
pub(crate) fn send_json(provider: &str, request: RequestBuilder) -> Result<Value> {
    let response = request
        .send()
        .map_err(|e| ImportError::provider(provider, describe_transport_error(&e)))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|e| ImportError::provider(provider, format!("Failed to read response: {}", e)))?;
    debug!("{} response ({}): {}", provider, status, body);

    if !status.is_success() {
        return Err(ImportError::provider(
            provider,
            describe_status(status, &error_detail(&body)),
        ));
    }

    let value: Value = serde_json::from_str(&body).map_err(|e| {
        ImportError::provider(provider, format!("Response is not valid JSON: {}", e))
    })?;

    // Some gateways report failures inside a 200 response.
    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        return Err(ImportError::provider(
            provider,
            format!("API error: {}", error_message(error)),
        ));
    }

    Ok(value)
}

/// Reject empty answers so a blank result never reaches the caller.
pub(crate) fn non_empty(provider: &str, text: Option<&str>, body: &Value) -> Result<String> {
    match text.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        Some(_) => Err(ImportError::provider(provider, "Model returned an empty answer")),
        None => Err(ImportError::provider(
            provider,
            format!(
                "Failed to extract content from response: {}",
                serde_json::to_string(body).unwrap_or_else(|_| body.to_string())
            ),
        )),
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timed out: {}", error)
    } else if error.is_connect() {
        format!("Could not connect: {}", error)
    } else {
        format!("Request failed: {}", error)
    }
}

fn describe_status(status: StatusCode, detail: &str) -> String {
    let reason = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication failed",
        StatusCode::TOO_MANY_REQUESTS => "rate limited",
        s if s.is_server_error() => "server error",
        _ => "request rejected",
    };
    if detail.is_empty() {
        format!("{} (HTTP {})", reason, status.as_u16())
    } else {
        format!("{} (HTTP {}): {}", reason, status.as_u16(), detail)
    }
}

fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("error") {
            Some(error) => error_message(error),
            None => value.to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}

fn error_message(error: &Value) -> String {
    error
        .as_str()
        .or_else(|| error["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

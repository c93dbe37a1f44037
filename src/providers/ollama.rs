use super::{build_client, non_empty, send_json};
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::pdf::EmbeddedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::blocking::Client;
use serde_json::{json, Value};

const NAME: &str = "ollama";

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    pub(crate) model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaProvider {
    /// Create a new Ollama provider from a resolved configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(OllamaProvider {
            client: build_client(NAME, config.timeout)?,
            base_url: config.base_url.clone(),
            model: config.model_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body(&self, prompt: &str, images: &[EmbeddedImage]) -> Value {
        let mut body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens
            }
        });
        if !images.is_empty() {
            let encoded: Vec<String> = images
                .iter()
                .map(|image| STANDARD.encode(&image.data))
                .collect();
            body["images"] = json!(encoded);
        }
        body
    }

    pub fn complete(&self, prompt: &str, images: &[EmbeddedImage]) -> Result<String> {
        debug!(
            "Sending {} chars and {} image(s) to Ollama model {} at {}",
            prompt.len(),
            images.len(),
            self.model,
            self.base_url
        );

        let request = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&self.request_body(prompt, images));

        let response_body = send_json(NAME, request)?;
        non_empty(NAME, response_body["response"].as_str(), &response_body)
    }
}

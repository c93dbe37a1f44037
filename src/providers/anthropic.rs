use super::{build_client, non_empty, send_json};
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::pdf::EmbeddedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::blocking::Client;
use serde_json::{json, Value};

const NAME: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    pub(crate) model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from a resolved configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(AnthropicProvider {
            client: build_client(NAME, config.timeout)?,
            api_key: config.api_key_or_url.clone(),
            base_url: config.base_url.clone(),
            model: config.model_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body(&self, prompt: &str, images: &[EmbeddedImage]) -> Value {
        // Images first, then the instructions.
        let mut content: Vec<Value> = images
            .iter()
            .map(|image| {
                json!({
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": image.media_type,
                        "data": STANDARD.encode(&image.data)
                    }
                })
            })
            .collect();
        content.push(json!({"type": "text", "text": prompt}));

        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [
                {"role": "user", "content": content}
            ]
        })
    }

    pub fn complete(&self, prompt: &str, images: &[EmbeddedImage]) -> Result<String> {
        debug!(
            "Sending {} chars and {} image(s) to Anthropic model {}",
            prompt.len(),
            images.len(),
            self.model
        );

        let request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(prompt, images));

        let response_body = send_json(NAME, request)?;
        non_empty(
            NAME,
            response_body["content"][0]["text"].as_str(),
            &response_body,
        )
    }
}

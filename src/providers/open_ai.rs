use super::{build_client, non_empty, send_json};
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::pdf::EmbeddedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::blocking::Client;
use serde_json::{json, Value};

const NAME: &str = "openai";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    pub(crate) model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from a resolved configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(OpenAIProvider {
            client: build_client(NAME, config.timeout)?,
            api_key: config.api_key_or_url.clone(),
            base_url: config.base_url.clone(),
            model: config.model_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body(&self, prompt: &str, images: &[EmbeddedImage]) -> Value {
        let mut content = vec![json!({"type": "text", "text": prompt})];
        content.extend(images.iter().map(|image| {
            json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", image.media_type, STANDARD.encode(&image.data)),
                    "detail": "high"
                }
            })
        }));

        json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": content}
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens
        })
    }

    pub fn complete(&self, prompt: &str, images: &[EmbeddedImage]) -> Result<String> {
        debug!(
            "Sending {} chars and {} image(s) to OpenAI model {}",
            prompt.len(),
            images.len(),
            self.model
        );

        let request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, images));

        let response_body = send_json(NAME, request)?;
        non_empty(
            NAME,
            response_body["choices"][0]["message"]["content"].as_str(),
            &response_body,
        )
    }
}

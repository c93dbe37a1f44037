use crate::error::{ImportError, Result};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Optional tuning loaded from `pdf-recipe-import.toml` and `PDF_RECIPE__*` variables.
///
/// Credentials never come from here; they are read from the provider's own
/// environment variables by [`ProviderConfig::resolve`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Request timeout in seconds. Falls back to a per-provider default.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub anthropic: ProviderSettings,
    #[serde(default)]
    pub ollama: ProviderSettings,
    #[serde(default)]
    pub extraction: ExtractionSettings,
}

/// Per-provider overrides
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProviderSettings {
    /// Model identifier (e.g., "gpt-4o", "claude-sonnet-4-5-20250929")
    pub model: Option<String>,
    /// Base URL for API endpoint (for proxies or self-hosted gateways)
    pub base_url: Option<String>,
    /// Temperature for generation (0.0-1.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

/// Controls what is pulled out of the PDF besides its text layer
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionSettings {
    /// Attach embedded images to the request
    #[serde(default = "default_include_images")]
    pub include_images: bool,
    /// Upper bound on attached images
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    /// Images narrower or shorter than this (in pixels) are skipped
    #[serde(default = "default_min_image_dimension")]
    pub min_image_dimension: u32,
    /// Total size budget for attached images, in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            include_images: default_include_images(),
            max_images: default_max_images(),
            min_image_dimension: default_min_image_dimension(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

impl Settings {
    /// Load settings from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables with PDF_RECIPE__ prefix
    /// 2. pdf-recipe-import.toml in the current directory
    /// 3. Default values
    ///
    /// Environment variable format: PDF_RECIPE__OPENAI__MODEL
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("pdf-recipe-import").required(false))
            .add_source(
                Environment::with_prefix("PDF_RECIPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    fn provider(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Ollama => &self.ollama,
        }
    }
}

// Default value functions
fn default_include_images() -> bool {
    true
}

fn default_max_images() -> usize {
    10
}

fn default_min_image_dimension() -> u32 {
    50
}

fn default_max_image_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";
const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";
const ANTHROPIC_DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const ANTHROPIC_DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// The LLM service a run talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    /// Map the command-line flags onto exactly one provider.
    ///
    /// No flag selects OpenAI. Passing both flags is rejected.
    pub fn from_flags(anthropic: bool, ollama: bool) -> Result<Self> {
        match (anthropic, ollama) {
            (false, false) => Ok(ProviderKind::OpenAi),
            (true, false) => Ok(ProviderKind::Anthropic),
            (false, true) => Ok(ProviderKind::Ollama),
            (true, true) => Err(ImportError::Configuration(
                "--anthropic and --ollama cannot be used together".to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    fn default_timeout(&self) -> Duration {
        match self {
            ProviderKind::Ollama => Duration::from_secs(600),
            _ => Duration::from_secs(120),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved connection details for one provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// API key for OpenAI/Anthropic, server URL for Ollama
    pub api_key_or_url: String,
    pub model_name: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Resolve the configuration for `kind` from the process environment.
    pub fn from_env(kind: ProviderKind, settings: &Settings) -> Result<Self> {
        Self::resolve(kind, settings, |name| std::env::var(name).ok())
    }

    /// Resolve the configuration for `kind`, reading variables through `lookup`.
    ///
    /// Fails with [`ImportError::Configuration`] when the provider's credential
    /// or endpoint is absent. Blank values count as absent.
    pub fn resolve<F>(kind: ProviderKind, settings: &Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let overrides = settings.provider(kind);
        let missing = |name: &str| {
            ImportError::Configuration(format!(
                "{} not found. Set it in .env or as an environment variable",
                name
            ))
        };

        let (api_key_or_url, model_name, base_url) = match kind {
            ProviderKind::OpenAi => {
                let key = var("OPENAI_API_KEY").ok_or_else(|| missing("OPENAI_API_KEY"))?;
                let model = overrides
                    .model
                    .clone()
                    .or_else(|| var("OPENAI_MODEL"))
                    .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string());
                let base_url = overrides
                    .base_url
                    .clone()
                    .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string());
                (key, model, base_url)
            }
            ProviderKind::Anthropic => {
                let key =
                    var("ANTHROPIC_API_KEY").ok_or_else(|| missing("ANTHROPIC_API_KEY"))?;
                let model = overrides
                    .model
                    .clone()
                    .or_else(|| var("ANTHROPIC_MODEL"))
                    .unwrap_or_else(|| ANTHROPIC_DEFAULT_MODEL.to_string());
                let base_url = overrides
                    .base_url
                    .clone()
                    .unwrap_or_else(|| ANTHROPIC_DEFAULT_BASE_URL.to_string());
                (key, model, base_url)
            }
            ProviderKind::Ollama => {
                let url = var("OLLAMA_URL").ok_or_else(|| missing("OLLAMA_URL"))?;
                let model = var("OLLAMA_MODEL").ok_or_else(|| missing("OLLAMA_MODEL"))?;
                (url.clone(), model, url)
            }
        };

        Ok(ProviderConfig {
            kind,
            api_key_or_url,
            model_name,
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: overrides.temperature.unwrap_or_else(default_temperature),
            max_tokens: overrides.max_tokens.unwrap_or_else(default_max_tokens),
            timeout: settings
                .timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| kind.default_timeout()),
        })
    }

    /// Replace the model name, e.g. from a `--model` flag.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    /// Point the provider at a different endpoint.
    #[doc(hidden)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

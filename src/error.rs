use thiserror::Error;

/// Errors that can occur while importing a recipe from a PDF
#[derive(Error, Debug)]
pub enum ImportError {
    /// A required credential, endpoint or flag combination is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The PDF could not be read or contained nothing usable
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The LLM provider call failed (network, auth, rate limit, bad payload)
    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    /// Failed to write the result to disk
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Settings file or PDF_RECIPE__ variables could not be parsed
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

impl ImportError {
    pub(crate) fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ImportError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::Configuration(_) | ImportError::Settings(_) => 2,
            ImportError::Extraction(_) => 3,
            ImportError::Provider { .. } => 4,
            ImportError::Output(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

use crate::config::ProviderConfig;
use crate::error::{ImportError, Result};
use crate::model::RecipeResult;
use crate::pdf::{ExtractOptions, RecipeDocument};
use crate::prompt::build_extraction_prompt;
use crate::providers::Provider;
use log::info;
use std::path::Path;

/// Turns a PDF into a [`RecipeResult`] with a single provider call
pub struct RecipeExtractor {
    provider: Provider,
    options: ExtractOptions,
}

impl RecipeExtractor {
    /// Build an extractor for an already validated configuration
    pub fn new(config: &ProviderConfig, options: ExtractOptions) -> Result<Self> {
        Ok(RecipeExtractor {
            provider: Provider::from_config(config)?,
            options,
        })
    }

    /// Read `path`, build the prompt, and ask the provider once.
    ///
    /// # Errors
    /// - [`ImportError::Extraction`] if the PDF is unreadable or empty
    /// - [`ImportError::Provider`] if the request fails or the answer is empty
    pub fn extract(&self, path: &Path) -> Result<RecipeResult> {
        info!("Reading {}", path.display());
        let document = RecipeDocument::load(path, &self.options)?;
        self.extract_document(&document)
    }

    /// Same as [`extract`](Self::extract) for a document that is already loaded
    pub fn extract_document(&self, document: &RecipeDocument) -> Result<RecipeResult> {
        let prompt = build_extraction_prompt(document);

        info!(
            "Parsing recipe with {} model {}",
            self.provider.kind(),
            self.provider.model()
        );
        let completion = self
            .provider
            .complete(&prompt, &document.extracted_images)?;

        let result =
            RecipeResult::from_completion(&completion, self.provider.kind(), self.provider.model());
        if result.structured_recipe_text.is_empty() {
            return Err(ImportError::provider(
                self.provider.kind().as_str(),
                "Model returned an empty answer",
            ));
        }

        match result.recipe().and_then(|recipe| recipe.title) {
            Some(title) => info!("Extracted recipe \"{}\"", title),
            None => info!("Model answer is not a recipe JSON object; returning it verbatim"),
        }

        Ok(result)
    }
}

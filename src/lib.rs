pub mod config;
pub mod error;
pub mod extractor;
pub mod model;
pub mod pdf;
pub mod prompt;
pub mod providers;

pub use crate::config::{ProviderConfig, ProviderKind, Settings};
pub use crate::error::ImportError;
pub use crate::extractor::RecipeExtractor;
pub use crate::model::{Ingredient, Recipe, RecipeResult};
pub use crate::pdf::{EmbeddedImage, ExtractOptions, RecipeDocument};

use std::path::Path;

/// Per-run adjustments applied on top of the loaded settings
#[derive(Debug, Clone, Default)]
pub struct ImportOverrides {
    /// Use this model instead of the configured or default one
    pub model: Option<String>,
    /// Send only the text layer, even if images are enabled in the settings
    pub text_only: bool,
}

/// Extract a recipe from `path` using `kind`, configured from the environment.
///
/// Settings come from `pdf-recipe-import.toml` and `PDF_RECIPE__*` variables;
/// credentials come from the provider's environment variables. The provider
/// configuration is validated before the PDF is opened.
///
/// # Example
/// ```no_run
/// use pdf_recipe_import::{import_pdf, ImportOverrides, ProviderKind};
/// use std::path::Path;
///
/// let overrides = ImportOverrides {
///     model: Some("gpt-4o-mini".to_string()),
///     ..ImportOverrides::default()
/// };
/// let result = import_pdf(Path::new("pancakes.pdf"), ProviderKind::OpenAi, &overrides)?;
/// println!("{}", result.render());
/// # Ok::<(), pdf_recipe_import::ImportError>(())
/// ```
pub fn import_pdf(
    path: &Path,
    kind: ProviderKind,
    overrides: &ImportOverrides,
) -> Result<RecipeResult, ImportError> {
    let settings = Settings::load()?;
    let mut config = ProviderConfig::from_env(kind, &settings)?;
    if let Some(model) = &overrides.model {
        config = config.with_model(model.as_str());
    }

    let mut options = ExtractOptions::from(settings.extraction);
    if overrides.text_only {
        options.include_images = false;
    }

    let extractor = RecipeExtractor::new(&config, options)?;
    extractor.extract(path)
}

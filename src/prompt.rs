use crate::pdf::RecipeDocument;

/// The prompt template used for extracting structured recipes from PDF content.
///
/// The prompt is loaded from `prompt.txt` at compile time using the
/// `include_str!` macro, making it easy to edit without dealing with
/// Rust string syntax.
///
/// Contains `{{RECIPE}}` and `{{IMAGES}}` placeholders that are filled in by
/// [`build_extraction_prompt`].
pub const RECIPE_EXTRACTION_PROMPT: &str = include_str!("prompt.txt");

const NO_TEXT_PLACEHOLDER: &str = "(The PDF has no text layer. Read the recipe from the attached images.)";

/// Injects the document's text, and a note about attached images, into the template.
pub fn build_extraction_prompt(document: &RecipeDocument) -> String {
    let images_note = match document.extracted_images.len() {
        0 => String::new(),
        1 => "\nOne image from the PDF is attached; use it to fill in anything the text is missing.\n"
            .to_string(),
        n => format!(
            "\n{} images from the PDF are attached; use them to fill in anything the text is missing.\n",
            n
        ),
    };

    let recipe = if document.has_text() {
        document.extracted_text.as_str()
    } else {
        NO_TEXT_PLACEHOLDER
    };

    RECIPE_EXTRACTION_PROMPT
        .replace("{{IMAGES}}", &images_note)
        .replace("{{RECIPE}}", recipe)
}

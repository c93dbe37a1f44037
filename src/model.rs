use crate::config::ProviderKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The model's answer for one PDF
#[derive(Debug, Clone)]
pub struct RecipeResult {
    pub structured_recipe_text: String,
    pub provider: ProviderKind,
    pub model: String,
}

impl RecipeResult {
    /// Wrap a raw completion, dropping any markdown code fence around it.
    pub fn from_completion(
        completion: &str,
        provider: ProviderKind,
        model: impl Into<String>,
    ) -> Self {
        RecipeResult {
            structured_recipe_text: strip_code_fence(completion).to_string(),
            provider,
            model: model.into(),
        }
    }

    /// Parse the answer into a [`Recipe`], if it is JSON of the expected shape.
    pub fn recipe(&self) -> Option<Recipe> {
        serde_json::from_str(&self.structured_recipe_text).ok()
    }

    /// Text for display: pretty-printed when the answer is JSON, verbatim otherwise.
    pub fn render(&self) -> String {
        match serde_json::from_str::<Value>(&self.structured_recipe_text) {
            Ok(value) => serde_json::to_string_pretty(&value)
                .unwrap_or_else(|_| self.structured_recipe_text.clone()),
            Err(_) => self.structured_recipe_text.clone(),
        }
    }
}

/// Remove a surrounding ``` or ```json fence, if present.
///
/// The fence may wrap the body on separate lines or sit on the same line
/// (`` ```json {"title": "Toast"}``` ``).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);

    let body = match rest.split_once('\n') {
        // Info string ("json", "JSON", ...) alone on the opening line.
        Some((info, body)) if info.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => strip_json_tag(rest),
    };
    body.trim()
}

fn strip_json_tag(text: &str) -> &str {
    let text = text.trim_start();
    match text.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &text[4..],
        _ => text,
    }
}

/// Typed view of the JSON the extraction prompt asks for.
///
/// Models do not always follow the requested shape, so fields that are
/// commonly returned as numbers or objects stay as [`Value`] and list fields
/// accept `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Recipe {
    pub title: Option<String>,
    pub servings: Option<Value>,
    pub prep_time: Option<Value>,
    pub cook_time: Option<Value>,
    pub total_time: Option<Value>,
    #[serde(deserialize_with = "ingredient_list")]
    pub ingredients: Vec<Ingredient>,
    #[serde(deserialize_with = "null_as_empty")]
    pub instructions: Vec<Value>,
    #[serde(deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub cuisine: Option<String>,
    pub difficulty: Option<String>,
}

impl Recipe {
    /// Instruction text in order. Step objects contribute their `text` or
    /// `instruction` field.
    pub fn steps(&self) -> Vec<String> {
        self.instructions
            .iter()
            .filter_map(|step| match step {
                Value::String(text) => Some(text.clone()),
                Value::Object(fields) => ["text", "instruction", "description"]
                    .iter()
                    .find_map(|key| fields.get(*key).and_then(Value::as_str))
                    .map(str::to_string),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Ingredient {
    pub amount: Option<Value>,
    pub unit: Option<String>,
    #[serde(alias = "name")]
    pub item: String,
    pub notes: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ingredients given as plain strings ("2 eggs") become an [`Ingredient`]
/// with only `item` set. Entries of any other shape are dropped.
fn ingredient_list<'de, D>(deserializer: D) -> Result<Vec<Ingredient>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<Value> = null_as_empty(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(item) => Some(Ingredient {
                item,
                ..Ingredient::default()
            }),
            entry @ Value::Object(_) => serde_json::from_value(entry).ok(),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANCAKES: &str = r#"{
        "title": "Pancakes",
        "servings": 4,
        "prep_time": "10 minutes",
        "cook_time": "15 minutes",
        "total_time": null,
        "ingredients": [
            {"amount": 2, "unit": null, "item": "eggs"},
            {"amount": "1 1/2", "unit": "cup", "item": "flour", "notes": "sifted"}
        ],
        "instructions": ["Whisk everything.", "Fry in a hot pan."],
        "tags": ["breakfast", "quick"],
        "cuisine": "American",
        "difficulty": "easy"
    }"#;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```JSON  \r\n[1, 2]\r\n```"), "[1, 2]");
    }

    #[test]
    fn test_strip_single_line_fence() {
        assert_eq!(
            strip_code_fence("```json {\"title\":\"Toast\"}```"),
            "{\"title\":\"Toast\"}"
        );
        assert_eq!(strip_code_fence("```{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```JSON[1]```"), "[1]");
        // JSON that starts on the fence line keeps its opening brace.
        assert_eq!(
            strip_code_fence("```json {\"a\":\n1}\n```"),
            "{\"a\":\n1}"
        );
    }

    #[test]
    fn test_single_line_fenced_answer_parses() {
        let result = RecipeResult::from_completion(
            "```json {\"title\":\"Toast\"}```",
            ProviderKind::OpenAi,
            "gpt-4o",
        );
        assert_eq!(result.recipe().unwrap().title.as_deref(), Some("Toast"));
        assert_eq!(result.render(), "{\n  \"title\": \"Toast\"\n}");
    }

    #[test]
    fn test_recipe_parses_from_fenced_answer() {
        let fenced = format!("```json\n{}\n```", PANCAKES);
        let result = RecipeResult::from_completion(&fenced, ProviderKind::OpenAi, "gpt-4o");

        let recipe = result.recipe().expect("should parse");
        assert_eq!(recipe.title.as_deref(), Some("Pancakes"));
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[1].item, "flour");
        assert_eq!(recipe.ingredients[1].notes.as_deref(), Some("sifted"));
        assert_eq!(recipe.steps(), vec!["Whisk everything.", "Fry in a hot pan."]);
        assert_eq!(recipe.tags, vec!["breakfast", "quick"]);
        assert_eq!(recipe.prep_time, Some(Value::from("10 minutes")));
        assert!(recipe.total_time.is_none());
    }

    #[test]
    fn test_recipe_tolerates_missing_fields() {
        let result =
            RecipeResult::from_completion(r#"{"title": "Toast"}"#, ProviderKind::Ollama, "llava");
        let recipe = result.recipe().unwrap();
        assert_eq!(recipe.title.as_deref(), Some("Toast"));
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn test_recipe_tolerates_loose_shapes() {
        let result = RecipeResult::from_completion(
            r#"{"title":"Toast","prep_time":10,"instructions":[{"step":1,"text":"x"}]}"#,
            ProviderKind::OpenAi,
            "gpt-4o",
        );
        let recipe = result.recipe().expect("loose recipe should parse");
        assert_eq!(recipe.title.as_deref(), Some("Toast"));
        assert_eq!(recipe.prep_time, Some(Value::from(10)));
        assert_eq!(recipe.steps(), vec!["x"]);
    }

    #[test]
    fn test_recipe_accepts_string_ingredients_and_null_lists() {
        let result = RecipeResult::from_completion(
            r#"{
                "title": "Toast",
                "ingredients": ["1 slice bread", {"name": "butter", "amount": 1, "unit": "tbsp"}, 3],
                "instructions": null,
                "tags": null
            }"#,
            ProviderKind::Anthropic,
            "claude",
        );
        let recipe = result.recipe().unwrap();
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].item, "1 slice bread");
        assert!(recipe.ingredients[0].amount.is_none());
        assert_eq!(recipe.ingredients[1].item, "butter");
        assert_eq!(recipe.ingredients[1].unit.as_deref(), Some("tbsp"));
        assert!(recipe.instructions.is_empty());
        assert!(recipe.tags.is_empty());
    }

    #[test]
    fn test_render_pretty_prints_json() {
        let result =
            RecipeResult::from_completion(r#"{"title":"Toast"}"#, ProviderKind::OpenAi, "gpt-4o");
        assert_eq!(result.render(), "{\n  \"title\": \"Toast\"\n}");
    }

    #[test]
    fn test_render_keeps_plain_text() {
        let result = RecipeResult::from_completion(
            "Sorry, no recipe here.",
            ProviderKind::Anthropic,
            "claude",
        );
        assert!(result.recipe().is_none());
        assert_eq!(result.render(), "Sorry, no recipe here.");
    }
}

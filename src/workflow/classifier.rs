//! Gender classification of a generated outfit.
//!
//! One model call classifies all three items. The response is expected to be
//! a JSON object `{"head": .., "torso": .., "legs": ..}`; [`decode_genders`]
//! turns it into a [`GenderMap`], and [`GenderClassifier::classify`] degrades
//! any decode failure to all-`none` instead of failing the run.

use serde_json::{Map, Value};

use super::state::{Gender, GenderMap, OutfitItems};
use crate::ai::TextGenerator;

/// Why a classifier response could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Build the classification instruction for three items.
pub fn build_prompt(items: &OutfitItems) -> String {
    format!(
        "You are a fashion expert.\n\
         Classify each clothing item by its typical target gender category.\n\n\
         You MUST use ONLY these values: 'male', 'female', or 'none'.\n\
         - Use 'male' if it is more commonly sold as a men's item in fashion catalogs.\n\
         - Use 'female' if it is more commonly sold as a women's item.\n\
         - Use 'none' ONLY IF the text is not a clothing item at all or is impossible to interpret.\n\n\
         Very important:\n\
         - If an item can be worn by any gender (jeans, t-shirt, sneakers, hoodie, etc.), \
         you MUST still choose 'male' OR 'female' based on what is more common; \
         DO NOT use 'none' for that.\n\n\
         Head item: {}\n\
         Torso item: {}\n\
         Leg item: {}\n\n\
         Return a JSON object ONLY, with exactly these keys and values in lowercase, like:\n\
         {{\"head\": \"male\", \"torso\": \"female\", \"legs\": \"male\"}}",
        items.head, items.torso, items.legs
    )
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    // Drop an info string such as `json` on the opening fence line.
    match body.split_once('\n') {
        Some((info, rest)) if !info.trim_start().starts_with('{') => rest.trim(),
        _ => body.trim(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn field(object: &Map<String, Value>, key: &str) -> Gender {
    match object.get(key) {
        Some(Value::String(s)) => Gender::coerce(s),
        Some(other) => Gender::coerce(&other.to_string()),
        None => Gender::None,
    }
}

/// Decode a classifier response.
///
/// Fails only when the payload is not a JSON object. Within an object, a
/// missing key or any value other than `male`/`female`/`none` (compared
/// case-insensitively) becomes [`Gender::None`].
pub fn decode_genders(raw: &str) -> Result<GenderMap, DecodeError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;
    let object = match value {
        Value::Object(object) => object,
        other => return Err(DecodeError::NotAnObject(type_name(&other))),
    };

    Ok(GenderMap {
        head: field(&object, "head"),
        torso: field(&object, "torso"),
        legs: field(&object, "legs"),
    })
}

/// Decode a classifier response, falling back to all-`none` on failure.
pub fn decode_or_default(raw: &str) -> GenderMap {
    decode_genders(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to parse gender classification, defaulting to none");
        GenderMap::default()
    })
}

/// Classifies generated items through the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenderClassifier;

impl GenderClassifier {
    /// Create a classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify three items.
    ///
    /// A failed model call is returned as an error; an unreadable answer is not.
    pub async fn classify<G>(&self, llm: &G, items: &OutfitItems) -> anyhow::Result<GenderMap>
    where
        G: TextGenerator + ?Sized,
    {
        let raw = llm.complete(&build_prompt(items)).await?;
        tracing::debug!(raw = %raw.trim(), "Raw gender classification response");

        let genders = decode_or_default(&raw);
        tracing::info!(
            head = %genders.head,
            torso = %genders.torso,
            legs = %genders.legs,
            "Classified genders"
        );
        Ok(genders)
    }
}

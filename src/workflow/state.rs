//! Outfit state threaded through the generate/validate loop.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Gender category of a clothing item or a whole outfit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    None,
}

impl Gender {
    /// All accepted categories.
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::None];

    /// Lowercase label used in prompts and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::None => "none",
        }
    }

    /// Parse a label case-insensitively, mapping anything unknown to `None`.
    pub fn coerce(label: &str) -> Self {
        label.parse().unwrap_or(Self::None)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is not one of `male`, `female`, `none`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gender label: {0:?}")]
pub struct UnknownGender(pub String);

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "none" => Ok(Self::None),
            _ => Err(UnknownGender(s.to_string())),
        }
    }
}

/// Per-item gender classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenderMap {
    pub head: Gender,
    pub torso: Gender,
    pub legs: Gender,
}

impl GenderMap {
    /// Same category for every item.
    pub fn uniform(gender: Gender) -> Self {
        Self { head: gender, torso: gender, legs: gender }
    }

    /// Construct from head, torso and legs.
    pub fn new(head: Gender, torso: Gender, legs: Gender) -> Self {
        Self { head, torso, legs }
    }

    /// The three categories in slot order.
    pub fn as_array(&self) -> [Gender; 3] {
        [self.head, self.torso, self.legs]
    }
}

/// The three generated item names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutfitItems {
    pub head: String,
    pub torso: String,
    pub legs: String,
}

/// Output of one validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub genders: GenderMap,
    pub gender: Gender,
    pub consistent: bool,
    pub attempts: u32,
}

/// State of one workflow run.
///
/// Serializes to the fixed JSON shape served over HTTP; fields that have not
/// been produced yet are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutfitState {
    pub head_item: Option<String>,
    pub head_gender: Option<Gender>,
    pub torso_item: Option<String>,
    pub torso_gender: Option<Gender>,
    pub leg_item: Option<String>,
    pub leg_gender: Option<Gender>,
    pub gender: Option<Gender>,
    pub consistent: Option<bool>,
    pub attempts: u32,
}

impl OutfitState {
    /// Fresh state for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last validation accepted the outfit.
    pub fn is_consistent(&self) -> bool {
        self.consistent.unwrap_or(false)
    }

    /// Item names as validator input; missing names are empty.
    pub fn items(&self) -> OutfitItems {
        OutfitItems {
            head: self.head_item.clone().unwrap_or_default(),
            torso: self.torso_item.clone().unwrap_or_default(),
            legs: self.leg_item.clone().unwrap_or_default(),
        }
    }

    /// Record freshly generated items.
    pub fn with_items(self, items: OutfitItems) -> Self {
        Self {
            head_item: Some(items.head),
            torso_item: Some(items.torso),
            leg_item: Some(items.legs),
            ..self
        }
    }

    /// Record the result of a validation pass.
    pub fn with_verdict(self, verdict: Verdict) -> Self {
        Self {
            head_gender: Some(verdict.genders.head),
            torso_gender: Some(verdict.genders.torso),
            leg_gender: Some(verdict.genders.legs),
            gender: Some(verdict.gender),
            consistent: Some(verdict.consistent),
            attempts: verdict.attempts,
            ..self
        }
    }
}

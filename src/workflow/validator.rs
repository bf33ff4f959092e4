//! Outfit validation: classify, judge consistency, count the attempt.

use super::classifier::GenderClassifier;
use super::state::{Gender, GenderMap, OutfitState, Verdict};
use crate::ai::TextGenerator;

/// Judge a classification.
///
/// The outfit is consistent only when every item is `male` or every item is
/// `female`; anything else (including any `none`) yields overall `none`.
pub fn evaluate(genders: GenderMap, previous_attempts: u32) -> Verdict {
    let all = |target: Gender| genders.as_array().iter().all(|g| *g == target);

    let gender = if all(Gender::Male) {
        Gender::Male
    } else if all(Gender::Female) {
        Gender::Female
    } else {
        Gender::None
    };

    Verdict {
        genders,
        gender,
        consistent: gender != Gender::None,
        attempts: previous_attempts.saturating_add(1),
    }
}

/// Validates the items currently held in the state.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutfitValidator {
    classifier: GenderClassifier,
}

impl OutfitValidator {
    /// Create a validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one validation pass over `state`.
    pub async fn validate<G>(&self, llm: &G, state: &OutfitState) -> anyhow::Result<Verdict>
    where
        G: TextGenerator + ?Sized,
    {
        let items = state.items();
        tracing::info!(
            head = %items.head,
            torso = %items.torso,
            legs = %items.legs,
            "Validating outfit"
        );

        let genders = self.classifier.classify(llm, &items).await?;
        let verdict = evaluate(genders, state.attempts);

        tracing::info!(
            overall = %verdict.gender,
            consistent = verdict.consistent,
            attempts = verdict.attempts,
            "Outfit validated"
        );
        Ok(verdict)
    }
}

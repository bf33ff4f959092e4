//! Item generation: one model call per body slot.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::OutfitItems;
use crate::ai::TextGenerator;

/// Where on the body an item is worn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodySlot {
    Head,
    Torso,
    Legs,
}

impl BodySlot {
    /// All slots in outfit order.
    pub const ALL: [Self; 3] = [Self::Head, Self::Torso, Self::Legs];

    /// Fixed generation instruction for this slot.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Head => {
                "Generate a single clothing item worn on the HEAD such as a cap, hat, \
                 beanie, beret, etc. Return ONLY the item name (no extra words)."
            }
            Self::Torso => {
                "Generate a single clothing item worn on the TORSO such as a t-shirt, \
                 shirt, blouse, top, bra, etc. Return ONLY the item name (no extra words)."
            }
            Self::Legs => {
                "Generate a single clothing item worn on the LEGS such as pants, jeans, \
                 skirt, shorts, leggings, etc. Return ONLY the item name (no extra words)."
            }
        }
    }

    /// Node name shown in logs and the workflow graph.
    pub fn node_name(self) -> &'static str {
        match self {
            Self::Head => "Generate Head Item",
            Self::Torso => "Generate Torso Item",
            Self::Legs => "Generate Leg Item",
        }
    }
}

impl fmt::Display for BodySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Head => "head",
            Self::Torso => "torso",
            Self::Legs => "legs",
        })
    }
}

/// Take the first line of a raw model response as the item name.
pub fn first_line(raw: &str) -> &str {
    raw.trim().lines().next().unwrap_or("").trim()
}

/// Generates the item for a single slot.
#[derive(Debug, Clone, Copy)]
pub struct ItemGenerator {
    slot: BodySlot,
}

impl ItemGenerator {
    /// Create a generator for the given slot.
    pub fn new(slot: BodySlot) -> Self {
        Self { slot }
    }

    /// Ask the model for one item. Empty output is accepted as-is.
    pub async fn generate<G>(&self, llm: &G) -> anyhow::Result<String>
    where
        G: TextGenerator + ?Sized,
    {
        let raw = llm.complete(self.slot.prompt()).await?;
        let item = first_line(&raw).to_string();
        tracing::info!(slot = %self.slot, item = %item, "{} produced item", self.slot.node_name());
        tracing::debug!(slot = %self.slot, raw = %raw, "Raw generation response");
        Ok(item)
    }
}

/// Run the three slot generators concurrently and join their results.
///
/// The first failing call aborts the cycle.
pub async fn generate_outfit<G>(llm: &G) -> anyhow::Result<OutfitItems>
where
    G: TextGenerator + ?Sized,
{
    let [head, torso, legs] = BodySlot::ALL.map(ItemGenerator::new);
    let (head, torso, legs) =
        futures::try_join!(head.generate(llm), torso.generate(llm), legs.generate(llm))?;

    Ok(OutfitItems { head, torso, legs })
}

//! Outfit generation workflow.
//!
//! Each cycle fans out three item generators (head, torso, legs), joins them,
//! classifies the items' gender categories and routes:
//!
//! - all `male` or all `female`: approve
//! - otherwise, attempts left: retry with a fresh cycle
//! - otherwise: give up and return the last state
//!
//! The model is only reached through [`TextGenerator`](crate::ai::TextGenerator).

mod classifier;
mod controller;
mod generator;
pub mod graph;
mod state;
mod validator;

pub use classifier::{build_prompt, decode_genders, decode_or_default, DecodeError, GenderClassifier};
pub use controller::{CycleController, CycleStatus, WorkflowOutcome};
pub use generator::{first_line, generate_outfit, BodySlot, ItemGenerator};
pub use state::{Gender, GenderMap, OutfitItems, OutfitState, UnknownGender, Verdict};
pub use validator::{evaluate, OutfitValidator};

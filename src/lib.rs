//! # Outfit Workflow
//!
//! Generates a three-piece outfit (head, torso, legs) with a language model
//! and retries until every item targets the same gender, or a fixed number
//! of validation passes has been spent.
//!
//! ## Features
//!
//! - **Parallel generation**: the three items are requested concurrently
//! - **Tolerant classification**: malformed classifier output degrades to `none`
//! - **Bounded loop**: approve, retry, or give up after `max_attempts` passes
//! - **Pluggable models**: Claude or Ollama behind the [`TextGenerator`] trait
//! - **HTTP surface**: `POST /generate-outfit` (feature `server`)
//!
//! ## Quick Start
//!
//! ```bash
//! export ANTHROPIC_API_KEY=...
//! outfit run --max-attempts 3
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::future_not_send)]

pub mod ai;
pub mod core;
pub mod workflow;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use ai::{AIError, RetryingGenerator, TextGenerator};
pub use crate::core::{Config, RetryConfig};
pub use workflow::{
    CycleController, CycleStatus, Gender, GenderMap, OutfitItems, OutfitState, WorkflowOutcome,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "outfit";

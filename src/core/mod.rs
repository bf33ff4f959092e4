//! Core infrastructure shared by the workflow, the providers, and the binary:
//! configuration loading and the retry policy for model calls.

mod config;
mod retry;

pub use config::{
    AiConfig, Config, OllamaConfig, ServerConfig, WorkflowConfig, DEFAULT_MAX_ATTEMPTS,
    LOCAL_CONFIG_FILE, MAX_ATTEMPTS_ENV,
};
pub use retry::{retry_async, RetryConfig, RetryOutcome};

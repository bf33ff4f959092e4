//! Language model integration.
//!
//! The outfit loop talks to a model only through [`TextGenerator`]:
//! one instruction in, raw text out. Concrete providers (Claude, Ollama)
//! live behind the `ai` feature; tests substitute scripted generators.

#[cfg(feature = "ai")]
mod claude;
#[cfg(feature = "ai")]
mod ollama;

#[cfg(feature = "ai")]
pub use claude::ClaudeProvider;
#[cfg(feature = "ai")]
pub use ollama::OllamaProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::{retry_async, RetryConfig};

/// Trait for text-generation providers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a single instruction and return the raw response text.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Check if the provider is usable (credentials present, server reachable).
    async fn is_available(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        (**self).complete(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn is_available(&self) -> bool {
        (**self).is_available().await
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        (**self).complete(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn is_available(&self) -> bool {
        (**self).is_available().await
    }
}

/// AI error types.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Applies a [`RetryConfig`] (bounded retries, per-call timeout) to any provider.
pub struct RetryingGenerator<G> {
    inner: G,
    policy: RetryConfig,
}

impl<G: TextGenerator> RetryingGenerator<G> {
    /// Wrap a provider with the given policy.
    pub fn new(inner: G, policy: RetryConfig) -> Self {
        Self { inner, policy }
    }

    async fn attempt(&self, prompt: &str) -> anyhow::Result<String> {
        match self.policy.call_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.complete(prompt))
                .await
                .map_err(|_| AIError::Timeout(limit))?,
            None => self.inner.complete(prompt).await,
        }
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for RetryingGenerator<G> {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let outcome = retry_async(&self.policy, || self.attempt(prompt)).await;
        if outcome.retried() {
            tracing::debug!(
                provider = self.inner.name(),
                calls = outcome.calls,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                ok = outcome.is_ok(),
                "Model call finished after retries"
            );
        }
        outcome.into_result()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }
}

/// Build the provider named in the configuration, wrapped in its retry policy.
#[cfg(feature = "ai")]
pub fn provider_from_config(config: &crate::core::AiConfig) -> anyhow::Result<Arc<dyn TextGenerator>> {
    let provider: Box<dyn TextGenerator> = match config.provider.to_ascii_lowercase().as_str() {
        "claude" | "anthropic" => {
            let mut claude = ClaudeProvider::new()?.with_max_tokens(config.max_tokens);
            if let Some(model) = &config.model {
                claude = claude.with_model(model.clone());
            }
            Box::new(claude)
        }
        "ollama" => {
            let model = config.model.clone().unwrap_or_else(|| config.ollama.model.clone());
            Box::new(
                OllamaProvider::new()
                    .with_base_url(config.ollama.base_url.clone())
                    .with_model(model),
            )
        }
        other => return Err(AIError::UnknownProvider(other.to_string()).into()),
    };

    tracing::debug!(provider = provider.name(), "Using language model provider");

    let policy = RetryConfig::from_ai_config(config);
    if policy.is_passthrough() {
        Ok(Arc::from(provider))
    } else {
        Ok(Arc::new(RetryingGenerator::new(provider, policy)))
    }
}

//! Ollama provider for running the outfit loop against a local model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AIError, TextGenerator};
use crate::core::OllamaConfig;

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaProvider {
    /// Provider for `OllamaConfig::default()`; configuration usually overrides both fields.
    pub fn new() -> Self {
        let defaults = OllamaConfig::default();
        Self { client: Client::new(), base_url: defaults.base_url, model: defaults.model }
    }

    /// Create with a specific base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl TextGenerator for OllamaProvider {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let request =
            OllamaRequest { model: self.model.clone(), prompt: prompt.to_string(), stream: false };

        let response = self.client.post(self.endpoint("api/generate")).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AIError::ApiError { status, body }.into());
        }

        let response: OllamaResponse = response.json().await?;
        Ok(response.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(self.endpoint("api/tags"))
            .timeout(std::time::Duration::from_secs(2))
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_builder() {
        let provider =
            OllamaProvider::new().with_base_url("http://gpu-box:11434/").with_model("mistral");
        assert_eq!(provider.model, "mistral");
        assert_eq!(provider.endpoint("api/generate"), "http://gpu-box:11434/api/generate");
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_request_is_not_streaming() {
        let request =
            OllamaRequest { model: "llama3.2".into(), prompt: "Name a skirt".into(), stream: false };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["prompt"], "Name a skirt");
    }
}

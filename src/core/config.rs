//! Configuration management.
//!
//! Handles loading configuration from TOML files and applying
//! environment overrides. Configuration is read once at process start
//! and passed explicitly to the workflow.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the project-local configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".outfit.toml";

/// Environment variable overriding `workflow.max_attempts`.
pub const MAX_ATTEMPTS_ENV: &str = "MAX_ATTEMPTS";

/// Default bound on validation passes.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Outfit loop settings
    pub workflow: WorkflowConfig,

    /// Language model settings
    pub ai: AiConfig,

    /// HTTP surface settings
    pub server: ServerConfig,
}

/// Outfit loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Maximum number of validation passes before giving up
    pub max_attempts: u32,
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AiConfig {
    /// Provider name (claude, ollama)
    pub provider: String,

    /// Model override for the selected provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Response token limit
    pub max_tokens: u32,

    /// Per-call timeout in seconds (unset = wait indefinitely)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Retries per failed model call (0 = a failure aborts the run)
    pub retries: u32,

    /// Ollama-specific settings
    pub ollama: OllamaConfig,
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama server URL
    pub base_url: String,

    /// Model to use
    pub model: String,
}

/// HTTP surface settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from the default location, then apply env overrides.
    ///
    /// Looks for config in:
    /// 1. `.outfit.toml` in current directory
    /// 2. `~/.config/outfit/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match Self::discover() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Find the config file that `load` would read, if any.
    pub fn discover() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        Self::config_dir().map(|d| d.join("config.toml")).filter(|p| p.exists())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides using the given variable lookup.
    ///
    /// An unparseable `MAX_ATTEMPTS` keeps the current value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(MAX_ATTEMPTS_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(value) => self.workflow.max_attempts = value,
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "Ignoring invalid {}, keeping {}",
                    MAX_ATTEMPTS_ENV,
                    self.workflow.max_attempts
                ),
            }
        }

        if let Some(host) = lookup("OLLAMA_HOST").filter(|v| !v.is_empty()) {
            self.ai.ollama.base_url = host;
        }
        if let Some(model) = lookup("OLLAMA_MODEL").filter(|v| !v.is_empty()) {
            self.ai.ollama.model = model;
        }
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("outfit"))
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "claude".to_string(),
            model: None,
            max_tokens: 1000,
            timeout_secs: None,
            retries: 0,
            ollama: OllamaConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:11434".to_string(), model: "llama3.2".to_string() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: vec![
                "http://localhost:8000".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name: &str| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| (*v).to_string())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workflow.max_attempts, 5);
        assert_eq!(config.ai.provider, "claude");
        assert_eq!(config.ai.retries, 0);
        assert!(config.ai.timeout_secs.is_none());
        assert_eq!(config.server.cors_origins.len(), 2);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("[workflow]"));
        assert!(toml_str.contains("max_attempts = 5"));
        assert!(toml_str.contains("[ai.ollama]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [workflow]
            max_attempts = 3

            [ai]
            provider = "ollama"
            timeout_secs = 45
            retries = 2

            [server]
            port = 9000
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workflow.max_attempts, 3);
        assert_eq!(config.ai.provider, "ollama");
        assert_eq!(config.ai.timeout_secs, Some(45));
        assert_eq!(config.ai.retries, 2);
        assert_eq!(config.ai.max_tokens, 1000);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_max_attempts_override() {
        let mut config = Config::default();
        config.apply_overrides(env_of(&[("MAX_ATTEMPTS", "8")]));
        assert_eq!(config.workflow.max_attempts, 8);
    }

    #[test]
    fn test_invalid_max_attempts_keeps_current() {
        let mut config = Config::default();
        config.workflow.max_attempts = 2;
        config.apply_overrides(env_of(&[("MAX_ATTEMPTS", "lots")]));
        assert_eq!(config.workflow.max_attempts, 2);

        config.apply_overrides(env_of(&[("MAX_ATTEMPTS", "-1")]));
        assert_eq!(config.workflow.max_attempts, 2);
    }

    #[test]
    fn test_ollama_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env_of(&[
            ("OLLAMA_HOST", "http://gpu-box:11434"),
            ("OLLAMA_MODEL", ""),
        ]));
        assert_eq!(config.ai.ollama.base_url, "http://gpu-box:11434");
        assert_eq!(config.ai.ollama.model, "llama3.2");
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = Config::load_from_file(Path::new("/nonexistent/outfit.toml"));
        assert!(result.is_err());
    }
}

//! Configuration management
//!
//! Manages API provider settings, model assignments, and analysis tuning.
//! Loaded from a TOML file under the platform config directory; every
//! section falls back to sensible defaults so a missing file is fine.
//! API keys are read from the environment, never stored in the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenRouter API settings
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    /// Model assignments for different tasks
    #[serde(default)]
    pub models: ModelsConfig,
    /// Course analysis tuning
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// OpenRouter API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Base URL for the API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl OpenRouterConfig {
    /// Resolve the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).with_context(|| {
            format!(
                "API key not found: set the {} environment variable",
                self.api_key_env
            )
        })
    }
}

/// Model assignments for different tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Model for course synthesis (chunk analysis)
    #[serde(default = "default_synthesis_model")]
    pub synthesis: String,
    /// Model for note summaries and topic suggestions
    #[serde(default = "default_summary_model")]
    pub summary: String,
}

fn default_synthesis_model() -> String {
    "openai/gpt-4o".to_string()
}

fn default_summary_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            synthesis: default_synthesis_model(),
            summary: default_summary_model(),
        }
    }
}

/// Course analysis tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum entries per generation chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Token cap for each synthesis response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_chunk_size() -> usize {
    crate::course::chunker::CHUNK_SIZE
}

fn default_max_tokens() -> u32 {
    4000
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Config {
    /// Path to the config file (~/.config/courseloom/config.toml on Linux)
    pub fn path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("courseloom");
        Ok(dir.join("config.toml"))
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.openrouter.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.analysis.chunk_size, 15);
        assert_eq!(config.analysis.max_tokens, 4000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[models]\nsynthesis = \"openai/gpt-4-turbo\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.models.synthesis, "openai/gpt-4-turbo");
        // Untouched sections fall back to defaults
        assert_eq!(config.models.summary, "openai/gpt-4o-mini");
        assert_eq!(config.analysis.chunk_size, 15);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [[[").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}

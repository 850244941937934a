//! Configuration structures for the perkscan pipeline.
//!
//! The config only supplies defaults at the CLI boundary; the pipeline
//! entry points take the model, temperature, and endpoint as explicit
//! parameters so they can be swapped in tests.

use serde::{Deserialize, Serialize};

/// Main configuration for the perkscan pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerkscanConfig {
    /// Vision-model extractor settings.
    pub extractor: ExtractorConfig,

    /// Perk store settings.
    pub store: StoreConfig,

    /// HTTP API settings.
    pub api: ApiConfig,
}

impl Default for PerkscanConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            store: StoreConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

/// Vision-model extractor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,

    /// Default model to extract with.
    pub model: String,

    /// Default sampling temperature (0 = deterministic decoding).
    pub temperature: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "openbmb/minicpm-v4.5".to_string(),
            temperature: 0.0,
        }
    }
}

/// Perk store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database URL.
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:perks.db?mode=rwc".to_string(),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Port the read-only API binds to.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl PerkscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = PerkscanConfig::default();
        assert_eq!(config.extractor.temperature, 0.0);
        assert!(config.store.database_url.starts_with("sqlite:"));
        assert_eq!(config.api.port, 3000);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: PerkscanConfig =
            serde_json::from_str(r#"{"extractor": {"model": "llava"}}"#).unwrap();
        assert_eq!(config.extractor.model, "llava");
        assert_eq!(config.extractor.base_url, "http://localhost:11434");
        assert_eq!(config.api.port, 3000);
    }
}

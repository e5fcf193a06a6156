//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use verse_ai::Provider;

/// Configuration for verseforge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default model to use
    pub model: Option<String>,
    /// Default provider
    pub provider: Option<String>,
    /// Override the provider's base URL (required for `custom`)
    pub base_url: Option<String>,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Seconds to wait for one generation; 0 waits forever
    pub timeout_secs: Option<u64>,
    /// Keep collected lyrics when generation fails so the mix can be retried
    pub retain_lyrics_on_failure: Option<bool>,
    /// File every generated song is appended to
    pub output_file: Option<String>,
    /// API keys (alternative to environment variables)
    #[serde(default)]
    pub api_keys: ApiKeys,
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub openai: Option<String>,
    pub groq: Option<String>,
    pub openrouter: Option<String>,
    pub custom: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("verseforge")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("VERSEFORGE_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to parse config file"
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read config file"
                );
                Self::default()
            }
        }
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: Some(verse_ai::models::DEFAULT_MODEL_ID.to_string()),
            provider: Some(Provider::OpenAI.id().to_string()),
            timeout_secs: Some(60),
            retain_lyrics_on_failure: Some(false),
            ..Default::default()
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    /// Generation timeout; `None` when disabled
    pub fn generation_timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(verse_dialogue::controller::DEFAULT_GENERATION_TIMEOUT),
        }
    }

    /// Get API key for a provider, checking config then env
    pub fn get_api_key(&self, provider: Provider) -> Option<String> {
        let from_config = match provider {
            Provider::OpenAI => self.api_keys.openai.clone(),
            Provider::Groq => self.api_keys.groq.clone(),
            Provider::OpenRouter => self.api_keys.openrouter.clone(),
            Provider::Custom => self.api_keys.custom.clone(),
            Provider::Ollama => None,
        };

        if from_config.is_some() {
            return from_config;
        }

        provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# verseforge configuration file
# Place at ~/.config/verseforge/config.toml (Linux) or set VERSEFORGE_CONFIG_PATH

# Default model to use
model = "gpt-4o-mini"

# Default provider (openai, groq, openrouter, ollama, custom)
provider = "openai"

# Base URL override, required for the custom provider
# base_url = "http://localhost:8080/v1"

# Sampling temperature
# temperature = 0.8

# Seconds to wait for a song before giving up (0 waits forever)
timeout_secs = 60

# Keep lyrics after a failed generation so you can retry the mix
retain_lyrics_on_failure = false

# Append every generated song to this file
# output_file = "songs.txt"

# API keys (optional - can also use environment variables)
[api_keys]
# openai = "sk-..."
# groq = "gsk_..."
# openrouter = "sk-or-..."
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.provider.as_deref(), Some("openai"));
        assert_eq!(config.timeout_secs, Some(60));
        assert_eq!(config.retain_lyrics_on_failure, Some(false));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml"));
        assert!(config.model.is_none());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "model = [unclosed").unwrap();
        assert!(Config::load_from(&path).provider.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            provider: Some("groq".into()),
            temperature: Some(0.7),
            api_keys: ApiKeys {
                groq: Some("gsk_test".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded.provider.as_deref(), Some("groq"));
        assert_eq!(loaded.temperature, Some(0.7));
        assert_eq!(loaded.get_api_key(Provider::Groq).as_deref(), Some("gsk_test"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        assert!(Config::default().get_api_key(Provider::Ollama).is_none());
    }

    #[test]
    fn test_generation_timeout() {
        let mut config = Config::default();
        assert_eq!(config.generation_timeout(), Some(Duration::from_secs(60)));
        config.timeout_secs = Some(5);
        assert_eq!(config.generation_timeout(), Some(Duration::from_secs(5)));
        config.timeout_secs = Some(0);
        assert_eq!(config.generation_timeout(), None);
    }
}

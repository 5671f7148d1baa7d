use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::speech::voices::{LanguageVoice, VoiceSelector};

const CONFIG_FILE: &str = ".pr-narrator.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required credentials: {0}")]
    MissingCredentials(String),
}

/// Top-level configuration loaded from .pr-narrator.toml.
///
/// Every field is optional; secrets may instead come from the environment
/// (GITHUB_TOKEN, GEMINI_API_KEY, MURF_API_KEY, PORT). Read once at
/// process start and immutable afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub prompts: PromptsConfig,

    #[serde(default)]
    pub voices: VoicesConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Language-model API key. If None, falls back to GEMINI_API_KEY env var.
    pub api_key: Option<String>,
    /// Model identifier; a sensible default is compiled in.
    pub model: Option<String>,
    /// Endpoint override, mainly for pointing tests at a local stub.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechConfig {
    /// Speech-synthesis API key. If None, falls back to MURF_API_KEY env var.
    pub api_key: Option<String>,
    /// Endpoint override, mainly for pointing tests at a local stub.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen port; PORT env var and --port both override.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Bounds on bundle size and per-provider timeouts. Timeouts are explicit
/// rather than whatever the HTTP client defaults to.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_bundle_max_chars")]
    pub bundle_max_chars: usize,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
    #[serde(default = "default_speech_timeout_secs")]
    pub speech_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            bundle_max_chars: default_bundle_max_chars(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            model_timeout_secs: default_model_timeout_secs(),
            speech_timeout_secs: default_speech_timeout_secs(),
        }
    }
}

impl LimitsConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn speech_timeout(&self) -> Duration {
        Duration::from_secs(self.speech_timeout_secs)
    }
}

/// Prompt template overrides; slots and defaults live in model::prompt.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptsConfig {
    pub summarize: Option<String>,
    pub sentiment: Option<String>,
    pub technical_terms: Option<Vec<String>>,
}

/// Voice catalog overrides, merged over the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoicesConfig {
    #[serde(default)]
    pub sentiment: HashMap<String, VoiceSelector>,
    #[serde(default)]
    pub language: HashMap<String, LanguageVoice>,
}

/// The three provider secrets, present and non-empty. Produced by
/// [`Config::validate`] so the rest of the code never handles `Option`s.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub github_token: String,
    pub model_api_key: String,
    pub speech_api_key: String,
}

fn default_port() -> u16 {
    3001
}

fn default_bundle_max_chars() -> usize {
    24_000
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_model_timeout_secs() -> u64 {
    30
}

fn default_speech_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from .pr-narrator.toml in the current directory,
    /// falling back to defaults when the file doesn't exist, then apply
    /// environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    pub fn model_api_key(&self) -> Option<String> {
        self.model
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
    }

    pub fn speech_api_key(&self) -> Option<String> {
        self.speech
            .api_key
            .clone()
            .or_else(|| std::env::var("MURF_API_KEY").ok())
    }

    /// Check that every provider secret is present. Called once at startup
    /// so a misconfigured process refuses to serve rather than failing on
    /// its first request.
    pub fn validate(&self) -> Result<Credentials, ConfigError> {
        let mut missing = Vec::new();

        let github_token = self.github_token().filter(|t| !t.is_empty());
        if github_token.is_none() {
            missing.push("github.token (GITHUB_TOKEN)");
        }
        let model_api_key = self.model_api_key().filter(|k| !k.is_empty());
        if model_api_key.is_none() {
            missing.push("model.api_key (GEMINI_API_KEY)");
        }
        let speech_api_key = self.speech_api_key().filter(|k| !k.is_empty());
        if speech_api_key.is_none() {
            missing.push("speech.api_key (MURF_API_KEY)");
        }

        match (github_token, model_api_key, speech_api_key) {
            (Some(github_token), Some(model_api_key), Some(speech_api_key)) => Ok(Credentials {
                github_token,
                model_api_key,
                speech_api_key,
            }),
            _ => Err(ConfigError::MissingCredentials(missing.join(", "))),
        }
    }
}

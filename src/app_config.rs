use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::translation::DEFAULT_CACHE_CAPACITY;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Caption retrieval config
    #[serde(default)]
    pub captions: CaptionConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google web translate endpoint
    #[default]
    Google,
    // @provider: Offline stub, uppercases text
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google Translate",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Caption source configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptionConfig {
    /// Base URL of the video site
    #[serde(default = "default_caption_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Caption languages to try before falling back to any available track
    #[serde(default)]
    pub preferred_languages: Vec<String>,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_caption_endpoint(),
            timeout_secs: default_timeout_secs(),
            preferred_languages: Vec::new(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Service endpoint URL
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,

    /// Maximum characters per translated chunk
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Translation attempts per chunk before falling back to the original
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff between attempts in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum chunks translated concurrently
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Deadline for a whole translation in seconds (0 disables it)
    #[serde(default)]
    pub pipeline_timeout_secs: u64,

    /// Rate limit (requests per minute)
    ///
    /// The public endpoint throttles aggressively and undocumentedly; the
    /// default keeps the client at one request per second.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<u32>,

    /// Whether identical chunks reuse earlier translations
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Maximum number of cached chunks before the oldest are evicted
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            endpoint: default_translate_endpoint(),
            max_chunk_chars: default_max_chunk_chars(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
            pipeline_timeout_secs: 0,
            rate_limit: default_rate_limit(),
            cache_enabled: true,
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl TranslationConfig {
    /// Overall pipeline deadline, if one is configured
    pub fn pipeline_timeout(&self) -> Option<Duration> {
        (self.pipeline_timeout_secs > 0).then(|| Duration::from_secs(self.pipeline_timeout_secs))
    }

    /// Per-request HTTP timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "ko".to_string()
}

fn default_caption_endpoint() -> String {
    "https://www.youtube.com".to_string()
}

fn default_translate_endpoint() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_max_chunk_chars() -> usize {
    1000
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_rate_limit() -> Option<u32> {
    Some(60)
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration, writing the defaults out first if the file does not exist
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.target_language)
            .with_context(|| format!("Invalid target language: '{}'", self.target_language))?;

        for lang in &self.captions.preferred_languages {
            crate::language_utils::validate_language_code(lang)
                .with_context(|| format!("Invalid preferred caption language: '{}'", lang))?;
        }

        let translation = &self.translation;
        if translation.max_chunk_chars == 0 {
            return Err(anyhow!("max_chunk_chars must be greater than zero"));
        }
        if translation.retry_count == 0 {
            return Err(anyhow!("retry_count must be at least 1"));
        }
        if translation.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }
        if translation.provider == TranslationProvider::Google && translation.endpoint.trim().is_empty() {
            return Err(anyhow!("Translation endpoint is required for the Google provider"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            captions: CaptionConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

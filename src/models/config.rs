//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Rules;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Output document settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Optional AI fallback service
    #[serde(default)]
    pub ai: AiConfig,

    /// Heuristic keyword and selector tables
    #[serde(default)]
    pub rules: Rules,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.probe_timeout_secs == 0 {
            return Err(AppError::validation(
                "crawler.probe_timeout_secs must be > 0",
            ));
        }
        if self.crawler.max_retries == 0 {
            return Err(AppError::validation("crawler.max_retries must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.delay_min_ms > self.crawler.delay_max_ms {
            return Err(AppError::validation(
                "crawler.delay_min_ms must not exceed crawler.delay_max_ms",
            ));
        }
        if self.storage.output_dir.trim().is_empty() {
            return Err(AppError::validation("storage.output_dir is empty"));
        }
        if self.ai.enabled && self.ai.endpoint.trim().is_empty() {
            return Err(AppError::validation(
                "ai.endpoint must be set when ai.enabled = true",
            ));
        }
        self.rules.validate()
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept header for HTTP requests
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Shorter timeout for URL pattern probes
    #[serde(default = "defaults::probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Attempts per page fetch (1 means no retry)
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff between attempts
    #[serde(default = "defaults::backoff_base")]
    pub backoff_base_ms: u64,

    /// Lower bound of the random politeness delay before each attempt
    #[serde(default = "defaults::delay_min")]
    pub delay_min_ms: u64,

    /// Upper bound of the random politeness delay before each attempt
    #[serde(default = "defaults::delay_max")]
    pub delay_max_ms: u64,

    /// Maximum school pipelines in flight during a batch
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Maximum splash-page `skip=true` hops on the athletics home page
    #[serde(default = "defaults::max_skip_hops")]
    pub max_skip_hops: usize,

    /// Accept invalid TLS certificates (many athletics sites misconfigure them)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            timeout_secs: defaults::timeout(),
            probe_timeout_secs: defaults::probe_timeout(),
            max_retries: defaults::max_retries(),
            backoff_base_ms: defaults::backoff_base(),
            delay_min_ms: defaults::delay_min(),
            delay_max_ms: defaults::delay_max(),
            max_concurrent: defaults::max_concurrent(),
            max_skip_hops: defaults::max_skip_hops(),
            accept_invalid_certs: false,
        }
    }
}

/// Output document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for written documents
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    /// Key prefix under the root directory
    #[serde(default = "defaults::prefix")]
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            prefix: defaults::prefix(),
        }
    }
}

/// AI fallback service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Whether to call the AI service when heuristics come up empty
    #[serde(default)]
    pub enabled: bool,

    /// Endpoint receiving the JSON extraction requests
    #[serde(default)]
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(default = "defaults::ai_api_key_env")]
    pub api_key_env: String,

    /// Characters of HTML sent per request
    #[serde(default = "defaults::ai_max_html_chars")]
    pub max_html_chars: usize,

    /// Request timeout in seconds
    #[serde(default = "defaults::ai_timeout")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_key_env: defaults::ai_api_key_env(),
            max_html_chars: defaults::ai_max_html_chars(),
            timeout_secs: defaults::ai_timeout(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/91.0.4472.124 Safari/537.36"
            .into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,\
         image/apng,*/*;q=0.8"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn probe_timeout() -> u64 {
        5
    }
    pub fn max_retries() -> u32 {
        1
    }
    pub fn backoff_base() -> u64 {
        1000
    }
    pub fn delay_min() -> u64 {
        1000
    }
    pub fn delay_max() -> u64 {
        3000
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn max_skip_hops() -> usize {
        3
    }

    // Storage defaults
    pub fn output_dir() -> String {
        "storage".into()
    }
    pub fn prefix() -> String {
        "coaches_json".into()
    }

    // AI defaults
    pub fn ai_api_key_env() -> String {
        "AI_API_KEY".into()
    }
    pub fn ai_max_html_chars() -> usize {
        60_000
    }
    pub fn ai_timeout() -> u64 {
        60
    }
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ScriberConfig {
    /// Socket address the HTTP server listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Static fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Headless browser settings
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Language-model proxy settings
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for ScriberConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            fetch: FetchConfig::default(),
            browser: BrowserConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

/// Configuration for the plain HTTP fetcher
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User-Agent sent to target sites
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Accept-Language sent to target sites
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Configuration for the headless browser
#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    /// Chromium binary; detected automatically when unset
    pub executable: Option<PathBuf>,
    /// Upper bound for navigation plus network idle, in seconds
    #[serde(default = "default_timeout")]
    pub navigation_timeout: u64,
    /// Pause after each scripted interaction step
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// How long the network must stay quiet before the page counts as idle
    #[serde(default = "default_idle_window_ms")]
    pub idle_window_ms: u64,
    /// In-flight requests still tolerated while idle
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            navigation_timeout: default_timeout(),
            settle_delay_ms: default_settle_delay_ms(),
            idle_window_ms: default_idle_window_ms(),
            max_idle_connections: default_max_idle_connections(),
        }
    }
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_window_ms)
    }
}

/// Configuration for the OpenAI-compatible proxy
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// API key for authentication (can also be set via OPENAI_API_KEY)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_settle_delay_ms() -> u64 {
    1500
}

fn default_idle_window_ms() -> u64 {
    500
}

fn default_max_idle_connections() -> usize {
    2
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

impl ScriberConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PAGE_SCRIBER__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: PAGE_SCRIBER__BROWSER__SETTLE_DELAY_MS
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// When no key is configured for the LLM proxy, `OPENAI_API_KEY` is used.
pub fn load_config() -> Result<ScriberConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: PAGE_SCRIBER__LLM__API_KEY
        .add_source(
            Environment::with_prefix("PAGE_SCRIBER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: ScriberConfig = settings.try_deserialize()?;
    if config.llm.api_key.is_none() {
        config.llm.api_key = std::env::var("OPENAI_API_KEY").ok();
    }
    Ok(config)
}

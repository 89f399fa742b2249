//! Application configuration: serde defaults, validation and the
//! translation page URL derived from the language pair.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::browser::Locator;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Store config
    #[serde(default)]
    pub store: StoreConfig,

    /// Browser automation config
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Translation page scraping config
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Persistent store configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// SQLite database file; the platform data directory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// How long a write waits for another process holding the file lock
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// WebDriver session configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BrowserConfig {
    /// URL of a running WebDriver server (e.g. chromedriver)
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Browser binary; falls back to the CHROME_BIN environment variable
    #[serde(default)]
    pub binary: Option<String>,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Extra browser command line arguments
    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,

    /// Timeout for a single WebDriver command in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            binary: None,
            headless: true,
            args: default_browser_args(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BrowserConfig {
    /// Browser binary from config, else from the environment
    pub fn resolved_binary(&self) -> Option<String> {
        self.binary
            .clone()
            .filter(|b| !b.is_empty())
            .or_else(|| std::env::var("CHROME_BIN").ok().filter(|b| !b.is_empty()))
    }
}

/// Translation page configuration.
///
/// The locators live here and nowhere else, so an upstream markup change
/// only needs a config edit.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractorConfig {
    /// Translation page URL without language parameters
    #[serde(default = "default_page_url")]
    pub page_url: String,

    /// Locator of the source text input
    #[serde(default = "default_input_locator")]
    pub input_locator: Locator,

    /// Locator of the rendered translation
    #[serde(default = "default_output_locator")]
    pub output_locator: Locator,

    /// Attribute holding the translation; element text when unset
    #[serde(default = "default_output_attribute")]
    pub output_attribute: Option<String>,

    /// Delay between output polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum wait for the translation in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            page_url: default_page_url(),
            input_locator: default_input_locator(),
            output_locator: default_output_locator(),
            output_attribute: default_output_attribute(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ExtractorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
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

fn default_source_language() -> String {
    "es".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_browser_args() -> Vec<String> {
    vec![
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
    ]
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_url() -> String {
    "https://translate.google.com/".to_string()
}

fn default_input_locator() -> Locator {
    Locator::XPath(
        r#"//*[@id="yDmH0d"]/c-wiz/div/div[2]/c-wiz/div[2]/c-wiz/div[1]/div[2]/div[2]/c-wiz[1]/span/span/div/textarea"#
            .to_string(),
    )
}

fn default_output_locator() -> Locator {
    Locator::XPath(
        r#"//*[@id="yDmH0d"]/c-wiz/div/div[2]/c-wiz/div[2]/c-wiz/div[1]/div[2]/div[2]/c-wiz[2]/div[5]/div/div[3]/div[1]/div/div[1]/div[1]/textarea"#
            .to_string(),
    )
}

fn default_output_attribute() -> Option<String> {
    Some("data-initial-value".to_string())
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        crate::language_utils::validate_language_code(&self.source_language)?;
        crate::language_utils::validate_language_code(&self.target_language)?;

        if crate::language_utils::language_codes_match(&self.source_language, &self.target_language) {
            return Err(anyhow!(
                "Source and target language must differ (both are '{}')",
                self.source_language
            ));
        }

        Url::parse(&self.browser.webdriver_url)
            .map_err(|e| anyhow!("Invalid WebDriver URL '{}': {}", self.browser.webdriver_url, e))?;
        Url::parse(&self.extractor.page_url)
            .map_err(|e| anyhow!("Invalid translation page URL '{}': {}", self.extractor.page_url, e))?;

        let extractor = &self.extractor;
        if extractor.timeout_secs == 0 {
            return Err(anyhow!("Extractor timeout must be greater than zero"));
        }
        if extractor.poll_interval_ms == 0 {
            return Err(anyhow!("Extractor poll interval must be greater than zero"));
        }
        if extractor.poll_interval() >= extractor.timeout() {
            return Err(anyhow!(
                "Extractor poll interval ({}ms) must be shorter than the timeout ({}s)",
                extractor.poll_interval_ms,
                extractor.timeout_secs
            ));
        }
        if extractor.input_locator.is_empty() || extractor.output_locator.is_empty() {
            return Err(anyhow!("Extractor locators must not be empty"));
        }

        Ok(())
    }

    /// Translation page URL with the language parameters applied
    pub fn translation_page_url(&self) -> Result<Url> {
        let source = crate::language_utils::page_language_code(&self.source_language)?;
        let target = crate::language_utils::page_language_code(&self.target_language)?;
        let mut url = Url::parse(&self.extractor.page_url)?;
        url.query_pairs_mut()
            .append_pair("sl", &source)
            .append_pair("tl", &target)
            .append_pair("op", "translate");
        Ok(url)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            store: StoreConfig::default(),
            browser: BrowserConfig::default(),
            extractor: ExtractorConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

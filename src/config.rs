//! Configuration and settings management
//!
//! Loads settings from config files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Default interval (seconds) for long polling Telegram updates
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 1;
/// Default capture executable (`brew install imagesnap`)
pub const DEFAULT_CAPTURE_BIN: &str = "/usr/local/bin/imagesnap";
/// Default directory for captured images
pub const DEFAULT_TEMP_DIR: &str = "/tmp";

/// Cooldown period (seconds) between full log lines for the same rejected sender.
/// Default: 20 minutes.
pub const REJECTION_COOLDOWN_SECS: u64 = 1200;
/// Time-to-live (seconds) for rejection cache entries.
/// Default: 2 hours.
pub const REJECTION_CACHE_TTL_SECS: u64 = 7200;
/// Maximum rejection cache capacity (number of entries).
pub const REJECTION_CACHE_MAX_SIZE: u64 = 10_000;

/// Application settings loaded from config files and environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Comma-separated list of Telegram usernames allowed to use the bot
    #[serde(rename = "allowed_ids")]
    pub allowed_ids_str: Option<String>,

    /// Long polling interval in seconds
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval: u64,

    /// Verbose (debug) logging
    #[serde(default)]
    pub is_verbose: bool,

    /// Path of the capture executable
    #[serde(default = "default_capture_bin")]
    pub capture_bin: String,

    /// Extra whitespace-separated arguments passed before the destination path
    pub capture_args: Option<String>,

    /// Directory where captured images are written
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,

    /// Reply with a short notice when a capture fails
    #[serde(default)]
    pub notify_capture_failure: bool,

    /// Seconds between full log lines for the same rejected sender
    #[serde(default = "default_rejection_cooldown")]
    pub rejection_cooldown_secs: u64,

    /// Time-to-live for rejection cache entries
    #[serde(default = "default_rejection_ttl")]
    pub rejection_cache_ttl_secs: u64,

    /// Maximum number of rejection cache entries
    #[serde(default = "default_rejection_max_size")]
    pub rejection_cache_max_size: u64,
}

const fn default_monitor_interval() -> u64 {
    DEFAULT_MONITOR_INTERVAL_SECS
}

fn default_capture_bin() -> String {
    DEFAULT_CAPTURE_BIN.to_string()
}

fn default_temp_dir() -> String {
    DEFAULT_TEMP_DIR.to_string()
}

const fn default_rejection_cooldown() -> u64 {
    REJECTION_COOLDOWN_SECS
}

const fn default_rejection_ttl() -> u64 {
    REJECTION_CACHE_TTL_SECS
}

const fn default_rejection_max_size() -> u64 {
    REJECTION_CACHE_MAX_SIZE
}

/// Build the layered configuration source.
///
/// # Errors
///
/// Returns a `ConfigError` if a present config file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg.. `APP__IS_VERBOSE=true ./target/app`
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Bare UPPER_SNAKE_CASE variables map to snake_case keys; empty ones count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use imagesnap_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the token is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Self = build_config()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "telegram_token must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the allow-list of usernames, in configured order.
    ///
    /// Tokens may be separated by commas, semicolons or whitespace. A leading
    /// `@` is stripped and duplicates keep their first position.
    #[must_use]
    pub fn allowed_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        let tokens = self
            .allowed_ids_str
            .as_deref()
            .unwrap_or_default()
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .map(|token| token.trim_start_matches('@'))
            .filter(|token| !token.is_empty());
        for token in tokens {
            if !ids.iter().any(|id| id == token) {
                ids.push(token.to_string());
            }
        }
        ids
    }

    /// Polling interval, falling back to the default for non-positive values.
    #[must_use]
    pub const fn monitor_interval(&self) -> u64 {
        if self.monitor_interval == 0 {
            DEFAULT_MONITOR_INTERVAL_SECS
        } else {
            self.monitor_interval
        }
    }

    /// Extra capture arguments
    #[must_use]
    pub fn capture_args(&self) -> Vec<String> {
        self.capture_args
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            telegram_token: "dummy".to_string(),
            allowed_ids_str: None,
            monitor_interval: DEFAULT_MONITOR_INTERVAL_SECS,
            is_verbose: false,
            capture_bin: default_capture_bin(),
            capture_args: None,
            temp_dir: default_temp_dir(),
            notify_capture_failure: false,
            rejection_cooldown_secs: REJECTION_COOLDOWN_SECS,
            rejection_cache_ttl_secs: REJECTION_CACHE_TTL_SECS,
            rejection_cache_max_size: REJECTION_CACHE_MAX_SIZE,
        }
    }

    #[test]
    fn test_list_parsing() {
        let mut settings = settings();

        assert!(settings.allowed_ids().is_empty());

        // Test comma
        settings.allowed_ids_str = Some("alice,bob".to_string());
        assert_eq!(settings.allowed_ids(), vec!["alice", "bob"]);

        // Test space
        settings.allowed_ids_str = Some("carol dave".to_string());
        assert_eq!(settings.allowed_ids(), vec!["carol", "dave"]);

        // Test semicolon and mixed
        settings.allowed_ids_str = Some("erin; frank, grace".to_string());
        assert_eq!(settings.allowed_ids(), vec!["erin", "frank", "grace"]);

        // Leading @ and duplicates
        settings.allowed_ids_str = Some("@heidi, heidi,,ivan".to_string());
        assert_eq!(settings.allowed_ids(), vec!["heidi", "ivan"]);
    }

    #[test]
    fn test_monitor_interval_fallback() {
        let mut settings = settings();
        settings.monitor_interval = 0;
        assert_eq!(settings.monitor_interval(), DEFAULT_MONITOR_INTERVAL_SECS);
        settings.monitor_interval = 5;
        assert_eq!(settings.monitor_interval(), 5);
    }

    #[test]
    fn test_capture_args_split() {
        let mut settings = settings();
        assert!(settings.capture_args().is_empty());
        settings.capture_args = Some("-q  -w 1".to_string());
        assert_eq!(settings.capture_args(), vec!["-q", "-w", "1"]);
    }

    #[test]
    fn test_empty_token_rejected() {
        let mut settings = settings();
        settings.telegram_token = "  ".to_string();
        assert!(settings.validate().is_err());
    }
}

// Configuration File Support
//
// This module provides configuration file parsing for authord.
// Supports TOML format with environment variable overrides.
// Configuration files are loaded from the XDG config directory:
// ~/.config/authord/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default admissions per second for regular CRUD actions
pub const DEFAULT_QUOTA_PER_SECOND: u32 = 200;

/// Default admissions per hour for the administrative reset action
pub const DEFAULT_RESET_QUOTA_PER_HOUR: u32 = 1000;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    pub enabled: bool,

    /// Admissions per second for regular CRUD actions, per client
    pub default_per_second: u32,

    /// Admissions per hour for the administrative reset action, per client
    pub reset_per_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_per_second: DEFAULT_QUOTA_PER_SECOND,
            reset_per_hour: DEFAULT_RESET_QUOTA_PER_HOUR,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default XDG config directory
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// If the config file does not exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// If the config file does not exist, returns default configuration.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default().apply_env_overrides());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file from {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file from {:?}", path))?;

        let config = config.apply_env_overrides();
        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/authord/config.toml` on Linux/Mac
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "authord", "Authord") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            // Fallback if XDG dirs cannot be determined
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join(".config")
                .join("authord")
                .join("config.toml")
        }
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Environment variables take precedence over config file values:
    /// - AUTHORD_LOG_LEVEL
    /// - AUTHORD_LOG_FORMAT
    /// - AUTHORD_HOST
    /// - AUTHORD_PORT
    /// - AUTHORD_RATE_LIMIT_ENABLED
    /// - AUTHORD_QUOTA_PER_SECOND
    /// - AUTHORD_RESET_QUOTA_PER_HOUR
    fn apply_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("AUTHORD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("AUTHORD_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Ok(host) = std::env::var("AUTHORD_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("AUTHORD_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                if port > 0 {
                    self.server.port = port;
                }
            }
        }

        if let Ok(enabled) = std::env::var("AUTHORD_RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = enabled.parse().unwrap_or(self.rate_limit.enabled);
        }
        if let Ok(quota) = std::env::var("AUTHORD_QUOTA_PER_SECOND") {
            if let Ok(quota) = quota.parse::<u32>() {
                if quota > 0 {
                    self.rate_limit.default_per_second = quota;
                }
            }
        }
        if let Ok(quota) = std::env::var("AUTHORD_RESET_QUOTA_PER_HOUR") {
            if let Ok(quota) = quota.parse::<u32>() {
                if quota > 0 {
                    self.rate_limit.reset_per_hour = quota;
                }
            }
        }

        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            ),
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                self.logging.format
            ),
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.rate_limit.default_per_second == 0 {
            anyhow::bail!("Default quota must be > 0");
        }
        if self.rate_limit.reset_per_hour == 0 {
            anyhow::bail!("Reset quota must be > 0");
        }

        Ok(())
    }

    /// Convert log level string to tracing::Level
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn clear_env() {
        std::env::remove_var("AUTHORD_LOG_LEVEL");
        std::env::remove_var("AUTHORD_LOG_FORMAT");
        std::env::remove_var("AUTHORD_HOST");
        std::env::remove_var("AUTHORD_PORT");
        std::env::remove_var("AUTHORD_RATE_LIMIT_ENABLED");
        std::env::remove_var("AUTHORD_QUOTA_PER_SECOND");
        std::env::remove_var("AUTHORD_RESET_QUOTA_PER_HOUR");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.port, 8080);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.default_per_second, 200);
        assert_eq!(config.rate_limit.reset_per_hour, 1000);
    }

    #[test]
    fn test_config_validation_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_quota() {
        let mut config = Config::default();
        config.rate_limit.default_per_second = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        clear_env();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().with_extension(".nonexistent");
        let config = Config::load_from_path(&path);
        assert!(config.is_ok());
        assert_eq!(config.unwrap(), Config::default());
    }

    #[test]
    fn test_load_valid_toml_config() {
        clear_env();

        let temp_file = NamedTempFile::new().unwrap();
        let toml_content = r#"
[logging]
level = "debug"
format = "json"

[server]
host = "127.0.0.1"
port = 9000

[rate_limit]
enabled = false
default_per_second = 50
reset_per_hour = 10
"#;

        fs::write(temp_file.path(), toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.default_per_second, 50);
        assert_eq!(config.rate_limit.reset_per_hour, 10);
    }

    #[test]
    fn test_load_invalid_toml_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let toml_content = r#"
[logging
level = "debug"
"#; // Invalid TOML

        fs::write(temp_file.path(), toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path());
        assert!(config.is_err());
    }

    #[test]
    fn test_config_partial_toml() {
        clear_env();

        let temp_file = NamedTempFile::new().unwrap();
        let toml_content = r#"
[logging]
level = "debug"
"#;

        fs::write(temp_file.path(), toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        // Other fields keep defaults
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rate_limit.default_per_second, 200);
    }

    #[test]
    fn test_env_overrides() {
        clear_env();

        std::env::set_var("AUTHORD_LOG_LEVEL", "debug");
        std::env::set_var("AUTHORD_PORT", "9999");
        std::env::set_var("AUTHORD_RATE_LIMIT_ENABLED", "false");
        std::env::set_var("AUTHORD_QUOTA_PER_SECOND", "5");

        let config = Config::default().apply_env_overrides();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server.port, 9999);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.default_per_second, 5);

        clear_env();
    }

    #[test]
    fn test_env_overrides_invalid_values() {
        clear_env();

        std::env::set_var("AUTHORD_PORT", "not-a-port");
        std::env::set_var("AUTHORD_QUOTA_PER_SECOND", "0");

        let config = Config::default().apply_env_overrides();

        // Invalid values keep defaults
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rate_limit.default_per_second, 200);

        clear_env();
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn test_log_level_parsing() {
        let mut config = Config::default();
        config.logging.level = "debug".to_string();
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);

        config.logging.level = "invalid".to_string();
        assert!(config.log_level().is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, parsed);
    }
}

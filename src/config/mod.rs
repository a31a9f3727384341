use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Symmetric key for session tokens. Must be exactly 32 bytes.
    #[serde(default = "default_token_key")]
    pub token_key: String,
    /// Session token validity window, e.g. "24h", "30m", "7d".
    #[serde(default = "default_token_duration")]
    pub token_duration: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_key: default_token_key(),
            token_duration: default_token_duration(),
        }
    }
}

fn default_token_key() -> String {
    // Development fallback only. Deployments must override this in the config file.
    "12345678901234567890123456789012".to_string()
}

fn default_token_duration() -> String {
    "24h".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Parse a duration string such as "24h", "30m", "15s", "7d" or "1h30m"
/// into a `chrono::Duration`. Units are seconds, minutes, hours and days.
pub fn parse_duration(input: &str) -> Result<chrono::Duration> {
    let s = input.trim();
    if s.is_empty() {
        bail!("duration is empty");
    }

    let mut total_secs: i64 = 0;
    let mut value: i64 = 0;
    let mut has_digits = false;

    for ch in s.chars() {
        if let Some(digit) = ch.to_digit(10) {
            value = value * 10 + digit as i64;
            has_digits = true;
        } else {
            if !has_digits {
                bail!("invalid duration: {input}");
            }
            let unit_secs = match ch {
                's' => 1,
                'm' => 60,
                'h' => 3_600,
                'd' => 86_400,
                _ => bail!("invalid duration unit '{ch}' in {input}"),
            };
            total_secs += value * unit_secs;
            value = 0;
            has_digits = false;
        }
    }

    if has_digits {
        bail!("duration is missing a unit: {input}");
    }

    Ok(chrono::Duration::seconds(total_secs))
}

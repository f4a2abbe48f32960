//! Configuration module for the big-cookie server.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Command-line arguments for the server
#[derive(Parser, Debug)]
#[command(name = "big-cookie")]
#[command(author = "big-cookie authors")]
#[command(version = "0.1.0")]
#[command(about = "An HTTP server that sets and inspects oversized cookies", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 127.0.0.1:3000)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Number of worker threads (defaults to number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Maximum number of requests served at once
    #[arg(long)]
    pub max_concurrent_requests: Option<usize>,

    /// Number of characters in the cookie value set by /set-cookie
    #[arg(long)]
    pub cookie_length: Option<usize>,

    /// Log level (trace, debug, info, warn, error) [default: info]
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub interceptor: InterceptorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Number of worker threads
    pub workers: Option<usize>,
    /// Maximum number of requests served at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            workers: None,
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

/// The cookie emitted by the set-cookie endpoint
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_name")]
    pub name: String,
    /// Number of fill characters in the value
    #[serde(default = "default_cookie_length")]
    pub length: usize,
    #[serde(default = "default_cookie_fill")]
    pub fill: char,
    /// Max-Age in seconds
    #[serde(default = "default_cookie_max_age")]
    pub max_age: i64,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    #[serde(default)]
    pub http_only: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            length: default_cookie_length(),
            fill: default_cookie_fill(),
            max_age: default_cookie_max_age(),
            path: default_cookie_path(),
            http_only: false,
        }
    }
}

/// Cookie interceptor configuration
#[derive(Debug, Deserialize)]
pub struct InterceptorConfig {
    /// Path pattern the interceptor runs on
    #[serde(default = "default_matcher")]
    pub matcher: String,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            matcher: default_matcher(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
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

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_concurrent_requests() -> usize {
    10_000
}

fn default_cookie_name() -> String {
    "largeCookie".to_string()
}

fn default_cookie_length() -> usize {
    5000 // past the 4096-byte per-cookie limit most browsers enforce
}

fn default_cookie_fill() -> char {
    'A'
}

fn default_cookie_max_age() -> i64 {
    60 * 60 * 24 // 1 day
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_matcher() -> String {
    "/:path*".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub workers: Option<usize>,
    pub max_concurrent_requests: usize,
    pub cookie: CookieConfig,
    pub matcher: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::merge(CliArgs::parse_from(["big-cookie"]), TomlConfig::default())
    }
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        let cli = CliArgs::parse();

        // Load TOML config if specified
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        let config = Self::merge(cli, toml_config);
        config.validate()?;
        Ok(config)
    }

    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Self {
        let mut cookie = toml_config.cookie;
        if let Some(length) = cli.cookie_length {
            cookie.length = length;
        }

        Config {
            listen: cli.listen.unwrap_or(toml_config.server.listen),
            workers: cli.workers.or(toml_config.server.workers),
            max_concurrent_requests: cli
                .max_concurrent_requests
                .unwrap_or(toml_config.server.max_concurrent_requests),
            cookie,
            matcher: toml_config.interceptor.matcher,
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        }
    }

    /// Reject values that would produce an unusable cookie or matcher.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.cookie.name;
        if name.is_empty() {
            return Err(ConfigError::Invalid("cookie name cannot be empty".into()));
        }
        if let Some(ch) = name
            .chars()
            .find(|&ch| !ch.is_ascii_graphic() || "()<>@,;:\\\"/[]?={}".contains(ch))
        {
            return Err(ConfigError::Invalid(format!(
                "invalid character {ch:?} in cookie name"
            )));
        }

        // cookie-octet per RFC 6265: visible ASCII minus DQUOTE, comma, semicolon, backslash
        let fill = self.cookie.fill;
        if !fill.is_ascii_graphic() || matches!(fill, '"' | ',' | ';' | '\\') {
            return Err(ConfigError::Invalid(format!(
                "invalid cookie fill character {fill:?}"
            )));
        }

        let path = &self.cookie.path;
        if !path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "cookie path '{path}' must start with '/'"
            )));
        }
        if path.chars().any(|ch| ch == ';' || ch.is_control()) {
            return Err(ConfigError::Invalid(format!(
                "invalid character in cookie path '{}'",
                path.escape_debug()
            )));
        }

        // Zero expires the cookie immediately; negative has no meaning
        if self.cookie.max_age < 0 {
            return Err(ConfigError::Invalid(format!(
                "cookie max_age must not be negative, got {}",
                self.cookie.max_age
            )));
        }

        if !self.matcher.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "interceptor matcher '{}' must start with '/'",
                self.matcher
            )));
        }

        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_requests must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

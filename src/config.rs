//! Configuration management for the diary service.
//!
//! Loads configuration from environment variables (and an optional `.env`
//! file) into a process-wide instance.

use std::env;
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub entries: EntryLimits,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request timeout applied by the tower layer.
    pub request_timeout_secs: u64,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_age_seconds: u64,
    /// Set the `Secure` attribute on cookies. Enable behind HTTPS.
    pub cookie_secure: bool,
}

/// Content limits for diary entries.
#[derive(Debug, Clone)]
pub struct EntryLimits {
    pub min_body_chars: usize,
    pub max_body_chars: usize,
    pub max_title_chars: usize,
    pub max_weather_chars: usize,
    pub max_location_chars: usize,
    pub max_tag_chars: usize,
    pub max_category_chars: usize,
    pub max_template_name_chars: usize,
}

impl Default for EntryLimits {
    fn default() -> Self {
        Self {
            min_body_chars: 10,
            max_body_chars: 10_000,
            max_title_chars: 200,
            max_weather_chars: 50,
            max_location_chars: 100,
            max_tag_chars: 50,
            max_category_chars: 50,
            max_template_name_chars: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Login attempts allowed per username per minute.
    pub login_per_minute: u32,
    /// Tracked usernames above which idle limiter entries are pruned.
    pub max_tracked_usernames: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = EntryLimits::default();

        Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: env_or("PORT", "5000").parse().unwrap_or(5000),
                request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", "30").parse().unwrap_or(30),
                max_body_bytes: env_or("MAX_BODY_BYTES", "16777216")
                    .parse()
                    .unwrap_or(16 * 1024 * 1024), // 16MB
            },
            database: DatabaseConfig {
                path: env_or("DATABASE_PATH", "./data/diary.db"),
            },
            session: SessionConfig {
                max_age_seconds: env_or("SESSION_MAX_AGE", "604800")
                    .parse()
                    .unwrap_or(604800), // 7 days
                cookie_secure: env_or("SESSION_COOKIE_SECURE", "false")
                    .eq_ignore_ascii_case("true"),
            },
            entries: EntryLimits {
                min_body_chars: env_or("MIN_ENTRY_LENGTH", "10")
                    .parse()
                    .unwrap_or(defaults.min_body_chars),
                max_body_chars: env_or("MAX_ENTRY_LENGTH", "10000")
                    .parse()
                    .unwrap_or(defaults.max_body_chars),
                max_title_chars: env_or("MAX_TITLE_LENGTH", "200")
                    .parse()
                    .unwrap_or(defaults.max_title_chars),
                ..defaults
            },
            rate_limit: RateLimitConfig {
                login_per_minute: env_or("LOGIN_RATE_PER_MINUTE", "20").parse().unwrap_or(20),
                max_tracked_usernames: env_or("LOGIN_LIMITER_MAX_KEYS", "10000")
                    .parse()
                    .unwrap_or(10_000),
            },
            logging: LoggingConfig {
                format: env_or("LOG_FORMAT", "pretty").parse().unwrap_or(LogFormat::Pretty),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

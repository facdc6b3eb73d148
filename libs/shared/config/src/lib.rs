use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {0} holds an invalid value")]
    InvalidValue(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub api_base_url: String,
    pub gateway_base_url: String,
    pub daily_notify_hour: u32,
    pub daily_notify_minute: u32,
    pub scan_interval_seconds: u64,
    pub send_delay_ms: u64,
}

impl AppConfig {
    /// BOT_TOKEN and API_BASE_URL are mandatory; the process must not come
    /// up without them. Everything else has a working default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            api_base_url: required("API_BASE_URL")?,
            gateway_base_url: env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            daily_notify_hour: optional("DAILY_NOTIFY_HOUR", 18)?,
            daily_notify_minute: optional("DAILY_NOTIFY_MINUTE", 0)?,
            scan_interval_seconds: optional("SCAN_INTERVAL_SECONDS", 60)?,
            send_delay_ms: optional("SEND_DELAY_MS", 1000)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn optional<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue(name)),
        Err(_) => Ok(default),
    }
}

use std::{env, time::Duration};

use log::*;
use steps_common::{helpers::parse_env_var, Secret};
use steps_engine::WalkConfig;

const DEFAULT_STEPS_HOST: &str = "127.0.0.1";
const DEFAULT_STEPS_PORT: u16 = 8370;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Requests under `/api` must carry this value in the `X-Api-Key` header. If empty, every request is refused.
    pub api_key: Secret<String>,
    pub telegram: TelegramConfig,
    pub weather: WeatherConfig,
    pub walk: WalkConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: Secret<String>,
}

#[derive(Clone, Debug)]
pub struct WeatherConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_STEPS_HOST.to_string(),
            port: DEFAULT_STEPS_PORT,
            database_url: String::default(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            api_key: Secret::default(),
            telegram: TelegramConfig::default(),
            weather: WeatherConfig::default(),
            walk: WalkConfig::default(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_TELEGRAM_API_URL.to_string(), bot_token: Secret::default() }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self { url: DEFAULT_WEATHER_URL.to_string(), timeout: WalkConfig::default().temperature_timeout }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let host = env::var("STEPS_HOST").ok().unwrap_or_else(|| DEFAULT_STEPS_HOST.into());
        let port = env_or_default("STEPS_PORT", DEFAULT_STEPS_PORT);
        let database_url = env::var("STEPS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ STEPS_DATABASE_URL is not set. Please set it to the URL for the steps database.");
            String::default()
        });
        let db_max_connections = env_or_default("STEPS_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let api_key = secret_from_env("STEPS_API_KEY", "the key that the chat front end presents to this server");
        let telegram = TelegramConfig::from_env_or_default();
        let weather = WeatherConfig::from_env_or_default();
        let walk = walk_config_from_env(defaults.walk, weather.timeout);
        Self { host, port, database_url, db_max_connections, api_key, telegram, weather, walk }
    }
}

impl TelegramConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("STEPS_TELEGRAM_API_URL").ok().unwrap_or_else(|| {
            info!("🪛️ STEPS_TELEGRAM_API_URL is not set. Using {DEFAULT_TELEGRAM_API_URL}.");
            DEFAULT_TELEGRAM_API_URL.into()
        });
        let bot_token = secret_from_env("STEPS_BOT_TOKEN", "the Telegram bot token");
        Self { api_url, bot_token }
    }
}

impl WeatherConfig {
    pub fn from_env_or_default() -> Self {
        let url = env::var("STEPS_WEATHER_URL").ok().unwrap_or_else(|| DEFAULT_WEATHER_URL.into());
        let default_timeout = WalkConfig::default().temperature_timeout;
        let timeout = env_or_default("STEPS_WEATHER_TIMEOUT_MS", default_timeout.as_millis() as u64);
        Self { url, timeout: Duration::from_millis(timeout) }
    }
}

fn walk_config_from_env(defaults: WalkConfig, temperature_timeout: Duration) -> WalkConfig {
    let daily_step_cap = env_or_default("STEPS_DAILY_STEP_CAP", defaults.daily_step_cap);
    let max_speed_kmh = env_or_default("STEPS_MAX_SPEED_KMH", defaults.max_speed_kmh);
    let refresh = env_or_default("STEPS_TEMP_REFRESH_SECS", defaults.temperature_refresh.as_secs());
    if daily_step_cap <= 0 {
        warn!("🪛️ A daily step cap of {daily_step_cap} means no walk can ever be started.");
    }
    WalkConfig {
        daily_step_cap,
        max_speed_kmh,
        temperature_refresh: Duration::from_secs(refresh),
        temperature_timeout,
        ..defaults
    }
}

fn env_or_default<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    match parse_env_var::<T>(name) {
        Ok(Some(v)) => v,
        Ok(None) => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
        Err(e) => {
            warn!("🪛️ {e} Using the default, {default}, instead.");
            default
        },
    }
}

fn secret_from_env(name: &str, what: &str) -> Secret<String> {
    match env::var(name) {
        Ok(s) if !s.trim().is_empty() => Secret::new(s.trim().to_string()),
        _ => {
            error!("🪛️ {name} is not set. Please set it to {what}.");
            Secret::default()
        },
    }
}

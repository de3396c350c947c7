use std::env;

use rocket::figment::providers::{Format, Serialized, Toml};
use rocket::figment::{Figment, Profile};
use rocket::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub address: String,
    /// Base URL the requested image path is appended to.
    pub origin_url: String,
    pub cache_dir: String,
    /// Accepted for reporting; the cache never evicts.
    pub cache_max_files: usize,
    /// Seconds before an origin request is abandoned. This also bounds how long
    /// a fetch outlives a client that disconnected.
    pub origin_timeout: u64,
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            address: "127.0.0.1".to_string(),
            origin_url: "http://localhost:8082/".to_string(),
            cache_dir: "cache".to_string(),
            cache_max_files: 10,
            origin_timeout: 5,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        let mut config: AppConfig = figment.extract()?;
        if !config.origin_url.ends_with('/') {
            config.origin_url.push('/');
        }
        Ok(config)
    }
}

/// Rocket defaults, then `AppConfig` defaults, then `App.toml`, then the environment.
/// The same figment configures both Rocket and `AppConfig`.
pub fn figment() -> Figment {
    let mut figment = Figment::from(Config::default())
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Serialized::default("shutdown.grace", 3))
        .merge(Serialized::default("shutdown.mercy", 2))
        .merge(Toml::file("App.toml").nested());

    if let Ok(origin_url) = env::var("ORIGIN_URL") {
        figment = figment.merge(("origin_url", origin_url));
    }

    if let Ok(cache_dir) = env::var("CACHE_DIR") {
        figment = figment.merge(("cache_dir", cache_dir));
    }

    if let Some(max_files) = env::var("CACHE_MAX_FILES").ok().and_then(|v| v.parse::<usize>().ok()) {
        figment = figment.merge(("cache_max_files", max_files));
    }

    if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()) {
        figment = figment.merge(("port", port));
    }

    figment.select(Profile::from_env_or("APP_PROFILE", "default"))
}

#[macro_use]
extern crate rocket;

use std::process;
use std::sync::Arc;

use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

use proxy_resizer::cache::DiskCache;
use proxy_resizer::config::{self, AppConfig};
use proxy_resizer::images::{HttpOrigin, LanczosResizer};
use proxy_resizer::proxy::Pipeline;

#[launch]
async fn rocket() -> _ {
    dotenv().ok();

    // Load config
    let figment = config::figment();
    let config = match AppConfig::from_figment(&figment) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            process::exit(1);
        }
    };

    // Initialize logger
    env_logger::init_from_env(Env::default().default_filter_or(config.log_filter.as_str()));

    info!("Target URL: {}", config.origin_url);
    info!("Max files in cache: {}", config.cache_max_files);
    info!("Listening on {}:{}", config.address, config.port);

    // Start every run with an empty cache
    let cache = match DiskCache::new(&config.cache_dir, config.cache_max_files) {
        Ok(cache) => cache,
        Err(e) => {
            error!("failed to open cache directory {}: {}", config.cache_dir, e);
            process::exit(1);
        }
    };
    match cache.clear() {
        Ok(removed) => info!("Cache cleared ({} records removed)", removed),
        Err(e) => warn!("failed to clear cache: {}", e),
    }

    let origin = match HttpOrigin::new(&config.origin_url, config.origin_timeout) {
        Ok(origin) => origin,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let pipeline = Pipeline::new(
        Arc::new(cache),
        Arc::new(origin),
        Arc::new(LanczosResizer::default()),
    );

    info!("Proxy started");
    proxy_resizer::build(figment, pipeline)
}

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Falls back to defaults when `init_config()` has not been called, so
/// library users that wire components by hand never panic here.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize (or replace) the global configuration
///
/// # Examples
/// ```no_run
/// use shortener::config::{StaticConfig, init_config};
/// init_config(StaticConfig::load("config.toml"));
/// ```
pub fn init_config(config: StaticConfig) {
    match CONFIG.get() {
        Some(current) => current.store(Arc::new(config)),
        None => {
            let swap = CONFIG.get_or_init(|| ArcSwap::from_pointee(config.clone()));
            swap.store(Arc::new(config));
        }
    }
}

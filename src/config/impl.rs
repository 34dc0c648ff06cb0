use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Initialize the global configuration
///
/// Loads `path` (or "config.toml") plus `TD__*` environment overrides.
/// Later calls are no-ops.
pub fn init_config(path: Option<&str>) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// Replace the global configuration with an explicit value
///
/// Initializes the global slot if needed.
pub fn set_config(config: StaticConfig) {
    match CONFIG.get() {
        Some(slot) => slot.store(Arc::new(config)),
        None => {
            let config = Arc::new(config);
            if CONFIG.set(ArcSwap::new(config.clone())).is_err()
                && let Some(slot) = CONFIG.get()
            {
                slot.store(config);
            }
        }
    }
}

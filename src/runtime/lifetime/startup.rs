use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::services::AdminServices;
use crate::config::get_config;
use crate::storage::{SeaOrmStorage, StorageFactory};
use crate::tracker::{HttpTaskTracker, TaskTracker};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub services: AdminServices,
    pub route_config: RouteConfig,
}

#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub api_prefix: String,
    pub health_prefix: String,
}

/// 准备服务器启动的上下文
/// 包括存储（含迁移）、任务追踪器客户端和业务服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))?;

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let config = get_config();
    let tracker: Arc<dyn TaskTracker> = Arc::new(HttpTaskTracker::new(&config.tracker));
    let services = AdminServices::new(storage.clone(), tracker, &config.api, &config.tracker);

    let route_config = RouteConfig {
        api_prefix: config.api.prefix.clone(),
        health_prefix: config.api.health_prefix.clone(),
    };

    check_component_enabled(&route_config);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        services,
        route_config,
    })
}

fn check_component_enabled(route_config: &RouteConfig) {
    let config = get_config();

    let admin_token = &config.api.admin_token;
    if admin_token.is_empty() {
        info!("Admin API is disabled (api.admin_token not set)");
    } else {
        if admin_token.len() < 8 {
            warn!("WARNING: Admin Token is very short. Consider using a stronger token.");
        }
        info!("Admin API available at: {}", route_config.api_prefix);
    }
    info!("Health API available at: {}", route_config.health_prefix);

    if config.tracker.api_token.trim().is_empty() {
        warn!("Task tracker token is not set; task and comment endpoints will fail");
    } else {
        info!("Task tracker: {}", config.tracker.base_url);
    }
}

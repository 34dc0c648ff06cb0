//! Admin API 服务模块
//!
//! 该模块包含管理 API 的所有端点，包括：
//! - 网站与 Sub-ID 管理（含批量导入、CSV 导出）
//! - GEO、品牌、品牌列表与排名
//! - 任务摘要与评论同步
//! - 无状态文本工具

mod brands;
pub mod error_code;
mod geos;
mod helpers;
mod rankings;
pub mod routes;
mod sub_ids;
mod tasks;
mod tools;
mod types;
mod websites;

use std::sync::Arc;

use actix_web::web;

use crate::config::{ApiConfig, TrackerConfig};
use crate::services::{
    BrandService, GeoService, RankingService, SubIdService, TaskService, WebsiteService,
};
use crate::storage::SeaOrmStorage;
use crate::tracker::TaskTracker;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{
    api_result, error_from_trackdesk, error_response, json_config, success_response,
};

// 重新导出错误码
pub use error_code::ErrorCode;

/// Admin API 依赖的全部服务
///
/// 每个 handler 通过 `web::Data<Arc<XService>>` 取用。
#[derive(Clone)]
pub struct AdminServices {
    pub websites: Arc<WebsiteService>,
    pub sub_ids: Arc<SubIdService>,
    pub geos: Arc<GeoService>,
    pub brands: Arc<BrandService>,
    pub rankings: Arc<RankingService>,
    pub tasks: Arc<TaskService>,
}

impl AdminServices {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        tracker: Arc<dyn TaskTracker>,
        api: &ApiConfig,
        tracker_config: &TrackerConfig,
    ) -> Self {
        Self {
            websites: Arc::new(WebsiteService::new(storage.clone())),
            sub_ids: Arc::new(
                SubIdService::new(storage.clone()).with_max_batch_size(api.max_batch_size),
            ),
            geos: Arc::new(GeoService::new(storage.clone())),
            brands: Arc::new(BrandService::new(storage.clone())),
            rankings: Arc::new(
                RankingService::new(storage.clone()).with_max_batch_size(api.max_batch_size),
            ),
            tasks: Arc::new(
                TaskService::new(storage, tracker)
                    .with_field_names(&tracker_config.geo_field, &tracker_config.brand_field)
                    .with_max_batch_size(api.max_batch_size),
            ),
        }
    }

    /// 注册到 actix App / Scope
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.websites.clone()))
            .app_data(web::Data::new(self.sub_ids.clone()))
            .app_data(web::Data::new(self.geos.clone()))
            .app_data(web::Data::new(self.brands.clone()))
            .app_data(web::Data::new(self.rankings.clone()))
            .app_data(web::Data::new(self.tasks.clone()))
            .app_data(json_config());
    }
}

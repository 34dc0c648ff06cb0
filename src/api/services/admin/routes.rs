//! Admin API 路由配置
//!
//! 将 /v1 下的路由按资源拆分。数字 id 使用 `{id:\d+}` 约束，
//! 避免与 `/reorder`、`/resolve` 等固定路径冲突。

use actix_web::web;

use super::{brands, geos, rankings, sub_ids, tasks, tools, websites};

/// 网站路由 `/websites`
///
/// 包含：
/// - GET/POST /websites
/// - GET/PUT/DELETE /websites/{id}
/// - GET/POST /websites/{id}/sub-ids
/// - POST /websites/{id}/sub-ids/generate - 按模板批量生成
/// - POST /websites/{id}/sub-ids/import - 批量导入
/// - GET /websites/{id}/sub-ids/export?columns=2|4 - CSV 导出
/// - POST /websites/{id}/sub-ids/sync-comments - 同步评论标记
pub fn websites_routes() -> actix_web::Scope {
    web::scope("/websites")
        .route("", web::get().to(websites::list_websites))
        .route("", web::post().to(websites::post_website))
        .route(
            "/{id:\\d+}/sub-ids/generate",
            web::post().to(sub_ids::generate_sub_ids),
        )
        .route(
            "/{id:\\d+}/sub-ids/import",
            web::post().to(sub_ids::import_sub_ids),
        )
        .route(
            "/{id:\\d+}/sub-ids/export",
            web::get().to(sub_ids::export_sub_ids),
        )
        .route(
            "/{id:\\d+}/sub-ids/sync-comments",
            web::post().to(sub_ids::sync_comment_flags),
        )
        .route("/{id:\\d+}/sub-ids", web::get().to(sub_ids::list_sub_ids))
        .route("/{id:\\d+}/sub-ids", web::post().to(sub_ids::post_sub_id))
        .route("/{id:\\d+}", web::get().to(websites::get_website))
        .route("/{id:\\d+}", web::put().to(websites::update_website))
        .route("/{id:\\d+}", web::delete().to(websites::delete_website))
}

/// Sub-ID 路由 `/sub-ids`
///
/// 包含：
/// - POST /sub-ids/comments/bulk - 批量发送评论
/// - GET/PUT/DELETE /sub-ids/{id}
/// - GET /sub-ids/{id}/comment/preview - 评论预览
/// - POST /sub-ids/{id}/comment - 发送评论
pub fn sub_ids_routes() -> actix_web::Scope {
    web::scope("/sub-ids")
        .route(
            "/comments/bulk",
            web::post().to(sub_ids::bulk_post_comments),
        )
        .route(
            "/{id:\\d+}/comment/preview",
            web::get().to(sub_ids::preview_comment),
        )
        .route("/{id:\\d+}/comment", web::post().to(sub_ids::post_comment))
        .route("/{id:\\d+}", web::get().to(sub_ids::get_sub_id))
        .route("/{id:\\d+}", web::put().to(sub_ids::update_sub_id))
        .route("/{id:\\d+}", web::delete().to(sub_ids::delete_sub_id))
}

/// GEO 路由 `/geos`
///
/// 包含：
/// - GET/POST /geos
/// - POST /geos/reorder
/// - GET /geos/resolve?label=
/// - GET/PUT/DELETE /geos/{id}
/// - GET/POST /geos/{id}/lists, POST /geos/{id}/lists/reorder
/// - PUT/DELETE /geos/{id}/lists/{list_id}
/// - GET/PUT/POST /geos/{id}/rankings, POST /geos/{id}/rankings/bulk
/// - DELETE /geos/{id}/rankings/{ranking_id}
/// - GET /geos/{id}/lineup?sub_id=
pub fn geos_routes() -> actix_web::Scope {
    web::scope("/geos")
        .route("", web::get().to(geos::list_geos))
        .route("", web::post().to(geos::post_geo))
        .route("/reorder", web::post().to(geos::reorder_geos))
        .route("/resolve", web::get().to(geos::resolve_geo))
        // Brand lists
        .route(
            "/{id:\\d+}/lists/reorder",
            web::post().to(geos::reorder_brand_lists),
        )
        .route(
            "/{id:\\d+}/lists/{list_id:\\d+}",
            web::put().to(geos::rename_brand_list),
        )
        .route(
            "/{id:\\d+}/lists/{list_id:\\d+}",
            web::delete().to(geos::delete_brand_list),
        )
        .route("/{id:\\d+}/lists", web::get().to(geos::list_brand_lists))
        .route("/{id:\\d+}/lists", web::post().to(geos::post_brand_list))
        // Rankings
        .route(
            "/{id:\\d+}/rankings/bulk",
            web::post().to(rankings::bulk_upsert_rankings),
        )
        .route(
            "/{id:\\d+}/rankings/{ranking_id:\\d+}",
            web::delete().to(rankings::delete_ranking),
        )
        .route("/{id:\\d+}/rankings", web::get().to(rankings::list_rankings))
        .route(
            "/{id:\\d+}/rankings",
            web::put().to(rankings::replace_rankings),
        )
        .route(
            "/{id:\\d+}/rankings",
            web::post().to(rankings::upsert_ranking),
        )
        .route("/{id:\\d+}/lineup", web::get().to(rankings::lineup))
        .route("/{id:\\d+}", web::get().to(geos::get_geo))
        .route("/{id:\\d+}", web::put().to(geos::update_geo))
        .route("/{id:\\d+}", web::delete().to(geos::delete_geo))
}

/// 品牌路由 `/brands`
pub fn brands_routes() -> actix_web::Scope {
    web::scope("/brands")
        .route("", web::get().to(brands::list_brands))
        .route("", web::post().to(brands::post_brand))
        .route("/{id:\\d+}", web::get().to(brands::get_brand))
        .route("/{id:\\d+}", web::put().to(brands::update_brand))
        .route("/{id:\\d+}", web::delete().to(brands::delete_brand))
}

/// 任务路由 `/tasks`
pub fn tasks_routes() -> actix_web::Scope {
    web::scope("/tasks").route("/{task_id}", web::get().to(tasks::get_task_summary))
}

/// 工具路由 `/tools`
///
/// 包含：
/// - POST /tools/tracking-param - 解析/替换追踪参数
/// - POST /tools/comment - 从任务描述构建评论
/// - GET /tools/geo?label= - GEO 归一化
pub fn tools_routes() -> actix_web::Scope {
    web::scope("/tools")
        .route("/tracking-param", web::post().to(tools::tracking_param))
        .route("/comment", web::post().to(tools::comment))
        .route("/geo", web::get().to(tools::geo))
}

/// Admin API v1 路由
///
/// 组合所有子模块路由
pub fn admin_v1_routes() -> actix_web::Scope {
    web::scope("/v1")
        .service(websites_routes())
        .service(sub_ids_routes())
        .service(geos_routes())
        .service(brands_routes())
        .service(tasks_routes())
        .service(tools_routes())
}

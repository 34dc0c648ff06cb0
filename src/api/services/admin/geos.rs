//! Admin API GEO 与品牌列表管理

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{info, trace};

use crate::services::{CreateGeoRequest, GeoService, UpdateGeoRequest};

use super::helpers::api_result;
use super::types::{
    BrandListRequest, DeletedResponse, GeoLabelQuery, PostNewGeo, ReorderRequest, UpdateGeo,
};

pub async fn list_geos(service: web::Data<Arc<GeoService>>) -> ActixResult<impl Responder> {
    trace!("Admin API: list GEOs");
    Ok(api_result(service.list_geos().await))
}

pub async fn get_geo(
    path: web::Path<i32>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(service.get_geo(path.into_inner()).await))
}

pub async fn post_geo(
    body: web::Json<PostNewGeo>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    info!("Admin API: create GEO from '{}'", body.code);
    let result = service
        .create_geo(CreateGeoRequest {
            code: body.code,
            name: body.name,
            sort_order: body.sort_order,
        })
        .await;
    Ok(api_result(result))
}

pub async fn update_geo(
    path: web::Path<i32>,
    body: web::Json<UpdateGeo>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = service
        .update_geo(
            path.into_inner(),
            UpdateGeoRequest {
                code: body.code,
                name: body.name,
                sort_order: body.sort_order,
            },
        )
        .await;
    Ok(api_result(result))
}

pub async fn delete_geo(
    path: web::Path<i32>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    info!("Admin API: delete GEO {}", id);
    let result = service.delete_geo(id).await.map(|_| DeletedResponse { id });
    Ok(api_result(result))
}

pub async fn reorder_geos(
    body: web::Json<ReorderRequest>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(service.reorder_geos(&body.ids).await))
}

pub async fn resolve_geo(
    query: web::Query<GeoLabelQuery>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(service.resolve_label(&query.label).await))
}

// ============ Brand lists ============

pub async fn list_brand_lists(
    path: web::Path<i32>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(service.list_brand_lists(path.into_inner()).await))
}

pub async fn post_brand_list(
    path: web::Path<i32>,
    body: web::Json<BrandListRequest>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        service.create_brand_list(path.into_inner(), &body.name).await,
    ))
}

pub async fn rename_brand_list(
    path: web::Path<(i32, i32)>,
    body: web::Json<BrandListRequest>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    let (geo_id, list_id) = path.into_inner();
    Ok(api_result(
        service.rename_brand_list(geo_id, list_id, &body.name).await,
    ))
}

pub async fn delete_brand_list(
    path: web::Path<(i32, i32)>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    let (geo_id, list_id) = path.into_inner();
    let result = service
        .delete_brand_list(geo_id, list_id)
        .await
        .map(|_| DeletedResponse { id: list_id });
    Ok(api_result(result))
}

pub async fn reorder_brand_lists(
    path: web::Path<i32>,
    body: web::Json<ReorderRequest>,
    service: web::Data<Arc<GeoService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(
        service
            .reorder_brand_lists(path.into_inner(), &body.ids)
            .await,
    ))
}

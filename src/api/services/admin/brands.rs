//! Admin API 品牌管理

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::info;

use crate::services::{BrandService, CreateBrandRequest, UpdateBrandRequest};

use super::helpers::api_result;
use super::types::{DeletedResponse, GetBrandsQuery, PostNewBrand, UpdateBrand};

pub async fn list_brands(
    query: web::Query<GetBrandsQuery>,
    service: web::Data<Arc<BrandService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(service.list_brands(query.status).await))
}

pub async fn get_brand(
    path: web::Path<i32>,
    service: web::Data<Arc<BrandService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(service.get_brand(path.into_inner()).await))
}

pub async fn post_brand(
    body: web::Json<PostNewBrand>,
    service: web::Data<Arc<BrandService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    info!("Admin API: create brand '{}'", body.name);
    let result = service
        .create_brand(CreateBrandRequest {
            name: body.name,
            default_url: body.default_url,
            status: body.status,
        })
        .await;
    Ok(api_result(result))
}

pub async fn update_brand(
    path: web::Path<i32>,
    body: web::Json<UpdateBrand>,
    service: web::Data<Arc<BrandService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = service
        .update_brand(
            path.into_inner(),
            UpdateBrandRequest {
                name: body.name,
                default_url: body.default_url,
                status: body.status,
            },
        )
        .await;
    Ok(api_result(result))
}

pub async fn delete_brand(
    path: web::Path<i32>,
    service: web::Data<Arc<BrandService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    info!("Admin API: delete brand {}", id);
    let result = service.delete_brand(id).await.map(|_| DeletedResponse { id });
    Ok(api_result(result))
}

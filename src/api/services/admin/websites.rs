//! Admin API 网站管理

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{info, trace};

use crate::services::{CreateWebsiteRequest, UpdateWebsiteRequest, WebsiteService};

use super::helpers::api_result;
use super::types::{DeletedResponse, PostNewWebsite, UpdateWebsite};

pub async fn list_websites(service: web::Data<Arc<WebsiteService>>) -> ActixResult<impl Responder> {
    trace!("Admin API: list websites");
    Ok(api_result(service.list_websites().await))
}

pub async fn get_website(
    path: web::Path<i32>,
    service: web::Data<Arc<WebsiteService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(service.get_website(path.into_inner()).await))
}

pub async fn post_website(
    body: web::Json<PostNewWebsite>,
    service: web::Data<Arc<WebsiteService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    info!("Admin API: create website '{}'", body.name);

    let result = service
        .create_website(CreateWebsiteRequest {
            name: body.name,
            format_pattern: body.format_pattern,
        })
        .await;
    Ok(api_result(result))
}

pub async fn update_website(
    path: web::Path<i32>,
    body: web::Json<UpdateWebsite>,
    service: web::Data<Arc<WebsiteService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = service
        .update_website(
            path.into_inner(),
            UpdateWebsiteRequest {
                name: body.name,
                format_pattern: body.format_pattern,
            },
        )
        .await;
    Ok(api_result(result))
}

pub async fn delete_website(
    path: web::Path<i32>,
    service: web::Data<Arc<WebsiteService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    info!("Admin API: delete website {}", id);
    let result = service
        .delete_website(id)
        .await
        .map(|_| DeletedResponse { id });
    Ok(api_result(result))
}

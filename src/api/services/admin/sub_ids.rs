//! Admin API Sub-ID 管理
//!
//! 单条 CRUD、批量生成/导入、CSV 导出以及评论相关操作。

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{error, info, trace};

use crate::errors::TrackdeskError;
use crate::services::{
    CreateSubIdRequest, ImportSubIdItem, SubIdService, TaskService, UpdateSubIdRequest,
};
use crate::storage::SubIdFilter;
use crate::utils::csv_handler::ExportColumns;

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_from_trackdesk, error_response, success_response};
use super::types::{
    BulkCommentRequest, CommentBatchResponse, CommentSyncResponse, DeletedResponse, ExportQuery,
    GenerateSubIdsRequest, GetSubIdsQuery, ImportSubIdsRequest, PostNewSubId, SubIdBatchResponse,
    UpdateSubId,
};

pub async fn list_sub_ids(
    path: web::Path<i32>,
    query: web::Query<GetSubIdsQuery>,
    service: web::Data<Arc<SubIdService>>,
) -> ActixResult<impl Responder> {
    let website_id = path.into_inner();
    let query = query.into_inner();
    trace!("Admin API: list Sub-IDs of website {} ({:?})", website_id, query);

    let filter = SubIdFilter {
        search: query.search,
        linked: query.linked,
    };
    Ok(api_result(service.list_sub_ids(website_id, filter).await))
}

pub async fn post_sub_id(
    path: web::Path<i32>,
    body: web::Json<PostNewSubId>,
    service: web::Data<Arc<SubIdService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = service
        .create_sub_id(
            path.into_inner(),
            CreateSubIdRequest {
                value: body.value,
                url: body.url,
                task_id: body.task_id,
            },
        )
        .await;
    Ok(api_result(result))
}

pub async fn get_sub_id(
    path: web::Path<i32>,
    service: web::Data<Arc<SubIdService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(service.get_sub_id(path.into_inner()).await))
}

pub async fn update_sub_id(
    path: web::Path<i32>,
    body: web::Json<UpdateSubId>,
    service: web::Data<Arc<SubIdService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = service
        .update_sub_id(
            path.into_inner(),
            UpdateSubIdRequest {
                value: body.value,
                url: body.url,
                task_id: body.task_id,
                comment_posted: body.comment_posted,
            },
        )
        .await;
    Ok(api_result(result))
}

pub async fn delete_sub_id(
    path: web::Path<i32>,
    service: web::Data<Arc<SubIdService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    let result = service
        .delete_sub_id(id)
        .await
        .map(|_| DeletedResponse { id });
    Ok(api_result(result))
}

pub async fn generate_sub_ids(
    path: web::Path<i32>,
    body: web::Json<GenerateSubIdsRequest>,
    service: web::Data<Arc<SubIdService>>,
) -> ActixResult<impl Responder> {
    let website_id = path.into_inner();
    info!(
        "Admin API: generate {} Sub-IDs for website {}",
        body.count, website_id
    );
    let result = service
        .generate_sub_ids(website_id, body.count)
        .await
        .map(SubIdBatchResponse::from);
    Ok(api_result(result))
}

pub async fn import_sub_ids(
    path: web::Path<i32>,
    body: web::Json<ImportSubIdsRequest>,
    service: web::Data<Arc<SubIdService>>,
) -> ActixResult<impl Responder> {
    let website_id = path.into_inner();
    let items: Vec<ImportSubIdItem> = body
        .into_inner()
        .items
        .into_iter()
        .map(|row| ImportSubIdItem {
            value: row.value,
            url: row.url,
            task_id: row.task_id,
        })
        .collect();
    info!(
        "Admin API: import {} Sub-IDs into website {}",
        items.len(),
        website_id
    );

    match service.import_sub_ids(website_id, items).await {
        Ok(outcome) => Ok(success_response(SubIdBatchResponse::from(outcome))),
        Err(TrackdeskError::Validation(msg)) => Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ImportFailed,
            &msg,
        )),
        Err(e) => Ok(error_from_trackdesk(&e)),
    }
}

pub async fn export_sub_ids(
    path: web::Path<i32>,
    query: web::Query<ExportQuery>,
    service: web::Data<Arc<SubIdService>>,
) -> ActixResult<impl Responder> {
    let website_id = path.into_inner();
    let columns = match query.columns.map(ExportColumns::try_from).transpose() {
        Ok(columns) => columns.unwrap_or_default(),
        Err(e) => return Ok(error_from_trackdesk(&e)),
    };

    match service.export_sub_ids(website_id, columns).await {
        Ok(export) => {
            info!(
                "Admin API: exported {} Sub-IDs of website {} as {}",
                export.rows, website_id, export.filename
            );
            Ok(HttpResponse::Ok()
                .append_header(("Content-Type", "text/csv; charset=utf-8"))
                .append_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", export.filename),
                ))
                .body(export.content))
        }
        Err(e @ TrackdeskError::Serialization(_)) => {
            error!("Admin API: CSV export failed: {}", e);
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::ExportFailed,
                e.message(),
            ))
        }
        Err(e) => Ok(error_from_trackdesk(&e)),
    }
}

// ============ Comments ============

pub async fn preview_comment(
    path: web::Path<i32>,
    service: web::Data<Arc<TaskService>>,
) -> ActixResult<impl Responder> {
    Ok(api_result(service.preview_comment(path.into_inner()).await))
}

pub async fn post_comment(
    path: web::Path<i32>,
    service: web::Data<Arc<TaskService>>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    info!("Admin API: post comment for Sub-ID {}", id);
    Ok(api_result(service.post_comment(id).await))
}

pub async fn bulk_post_comments(
    body: web::Json<BulkCommentRequest>,
    service: web::Data<Arc<TaskService>>,
) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let result = service
        .bulk_post_comments(body.ids, body.force.unwrap_or(false))
        .await
        .map(CommentBatchResponse::from);
    Ok(api_result(result))
}

pub async fn sync_comment_flags(
    path: web::Path<i32>,
    service: web::Data<Arc<TaskService>>,
) -> ActixResult<impl Responder> {
    let result = service
        .sync_comment_flags(path.into_inner())
        .await
        .map(CommentSyncResponse::from);
    Ok(api_result(result))
}

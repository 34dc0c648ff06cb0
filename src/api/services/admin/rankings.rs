//! Admin API GEO 品牌排名

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::errors::{Result, TrackdeskError};
use crate::services::RankingService;
use crate::storage::RankingInput;

use super::error_code::ErrorCode;
use super::helpers::{error_from_trackdesk, error_response, success_response};
use super::types::{DeletedResponse, LineupQuery, RankingBatchResponse, RankingsRequest};

/// 排名写入冲突（位置被占用）使用排名域错误码
fn ranking_result<T: Serialize>(result: Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(TrackdeskError::Conflict(msg)) => {
            error_response(StatusCode::CONFLICT, ErrorCode::RankingPositionTaken, &msg)
        }
        Err(e) => error_from_trackdesk(&e),
    }
}

pub async fn list_rankings(
    path: web::Path<i32>,
    service: web::Data<Arc<RankingService>>,
) -> ActixResult<impl Responder> {
    Ok(ranking_result(service.list_rankings(path.into_inner()).await))
}

pub async fn upsert_ranking(
    path: web::Path<i32>,
    body: web::Json<RankingInput>,
    service: web::Data<Arc<RankingService>>,
) -> ActixResult<impl Responder> {
    Ok(ranking_result(
        service
            .upsert_ranking(path.into_inner(), body.into_inner())
            .await,
    ))
}

pub async fn bulk_upsert_rankings(
    path: web::Path<i32>,
    body: web::Json<RankingsRequest>,
    service: web::Data<Arc<RankingService>>,
) -> ActixResult<impl Responder> {
    let result = service
        .bulk_upsert(path.into_inner(), body.into_inner().rankings)
        .await
        .map(RankingBatchResponse::from);
    Ok(ranking_result(result))
}

pub async fn replace_rankings(
    path: web::Path<i32>,
    body: web::Json<RankingsRequest>,
    service: web::Data<Arc<RankingService>>,
) -> ActixResult<impl Responder> {
    let geo_id = path.into_inner();
    let rankings = body.into_inner().rankings;
    info!(
        "Admin API: replace rankings of GEO {} ({} entries)",
        geo_id,
        rankings.len()
    );
    Ok(ranking_result(service.replace_rankings(geo_id, rankings).await))
}

pub async fn delete_ranking(
    path: web::Path<(i32, i32)>,
    service: web::Data<Arc<RankingService>>,
) -> ActixResult<impl Responder> {
    let (geo_id, ranking_id) = path.into_inner();
    let result = service
        .delete_ranking(geo_id, ranking_id)
        .await
        .map(|_| DeletedResponse { id: ranking_id });
    Ok(ranking_result(result))
}

pub async fn lineup(
    path: web::Path<i32>,
    query: web::Query<LineupQuery>,
    service: web::Data<Arc<RankingService>>,
) -> ActixResult<impl Responder> {
    Ok(ranking_result(
        service.lineup(path.into_inner(), &query.sub_id).await,
    ))
}

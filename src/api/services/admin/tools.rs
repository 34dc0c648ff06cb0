//! Admin API 文本工具
//!
//! 不访问存储，直接暴露追踪参数解析、评论构建和 GEO 归一化。

use actix_web::{Responder, Result as ActixResult, web};

use crate::affiliate::comment::build_comment;
use crate::affiliate::geo::{lookup_geo, normalize_geo};
use crate::affiliate::lineup::{extract_links, is_cloaked};
use crate::affiliate::params::{
    resolve_tracking_param, substitute_tracking_value, substitute_tracking_value_matching,
};

use super::helpers::success_response;
use super::types::{
    CommentToolRequest, CommentToolResponse, GeoLabelQuery, GeoLabelResponse,
    TrackingParamRequest, TrackingParamResponse,
};

pub async fn tracking_param(body: web::Json<TrackingParamRequest>) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let rewritten = body.new_value.as_deref().map(|new| match body.old_value.as_deref() {
        Some(old) => substitute_tracking_value_matching(&body.url, old, new),
        None => substitute_tracking_value(&body.url, new),
    });

    Ok(success_response(TrackingParamResponse {
        param: resolve_tracking_param(&body.url),
        cloaked: is_cloaked(&body.url),
        url: body.url,
        rewritten,
    }))
}

pub async fn comment(body: web::Json<CommentToolRequest>) -> ActixResult<impl Responder> {
    let body = body.into_inner();
    let comment = build_comment(&body.description, &body.task_id, &body.sub_id);

    Ok(success_response(CommentToolResponse {
        text: comment.plain_text(),
        fallback: comment.is_fallback(),
        links: extract_links(&body.description).unwrap_or_default(),
        comment,
    }))
}

pub async fn geo(query: web::Query<GeoLabelQuery>) -> ActixResult<impl Responder> {
    let label = query.into_inner().label;
    Ok(success_response(GeoLabelResponse {
        code: normalize_geo(&label),
        alias_matched: lookup_geo(&label).is_some(),
        input: label,
    }))
}

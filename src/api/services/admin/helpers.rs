//! Admin API 帮助函数

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, error::JsonPayloadError, web};
use serde::Serialize;
use tracing::debug;

use crate::errors::TrackdeskError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 TrackdeskError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_trackdesk(err: &TrackdeskError) -> HttpResponse {
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 TrackdeskError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<TrackdeskError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => {
            let err: TrackdeskError = e.into();
            error_from_trackdesk(&err)
        }
    }
}

/// 请求体解析失败时同样返回统一的 JSON 信封
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(4 * 1024 * 1024)
        .error_handler(|err: JsonPayloadError, _req| {
            debug!("Rejected JSON body: {}", err);
            let response = error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                &format!("Invalid request body: {}", err),
            );
            actix_web::error::InternalError::from_response(err, response).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = success_response("success_data");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_from_trackdesk_maps_status() {
        let cases = [
            (TrackdeskError::validation("bad"), StatusCode::BAD_REQUEST),
            (TrackdeskError::immutable("locked"), StatusCode::FORBIDDEN),
            (TrackdeskError::not_found("gone"), StatusCode::NOT_FOUND),
            (TrackdeskError::conflict("taken"), StatusCode::CONFLICT),
            (
                TrackdeskError::tracker_request("down"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(error_from_trackdesk(&err).status(), status);
        }
    }

    #[test]
    fn test_api_result() {
        let ok: Result<i32, TrackdeskError> = Ok(1);
        assert_eq!(api_result(ok).status(), StatusCode::OK);
        let err: Result<i32, TrackdeskError> = Err(TrackdeskError::not_found("x"));
        assert_eq!(api_result(err).status(), StatusCode::NOT_FOUND);
    }
}

//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use crate::config::TS_EXPORT_PATH;
use crate::errors::TrackdeskError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 自动生成 TypeScript 类型。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: Sub-ID / 网站错误
/// - 4000-4099: 导入导出错误
/// - 5000-5099: GEO / 排名错误
/// - 6000-6099: 任务追踪器错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    ServiceUnavailable = 1030,

    // Sub-ID 错误 3000-3099
    SubIdImmutable = 3000,

    // 导入导出错误 4000-4099
    ImportFailed = 4000,
    ExportFailed = 4001,

    // GEO / 排名错误 5000-5099
    RankingPositionTaken = 5000,

    // 任务追踪器错误 6000-6099
    TrackerRequestFailed = 6000,
    TrackerUnauthorized = 6001,
    TrackerTaskNotFound = 6002,
}

impl From<&TrackdeskError> for ErrorCode {
    fn from(err: &TrackdeskError) -> Self {
        match err {
            TrackdeskError::Validation(_) => ErrorCode::BadRequest,
            TrackdeskError::NotFound(_) => ErrorCode::NotFound,
            TrackdeskError::Conflict(_) => ErrorCode::Conflict,
            TrackdeskError::Immutable(_) => ErrorCode::SubIdImmutable,
            TrackdeskError::TrackerRequest(_) => ErrorCode::TrackerRequestFailed,
            TrackdeskError::TrackerUnauthorized(_) => ErrorCode::TrackerUnauthorized,
            TrackdeskError::TrackerNotFound(_) => ErrorCode::TrackerTaskNotFound,
            TrackdeskError::DatabaseConfig(_)
            | TrackdeskError::DatabaseConnection(_)
            | TrackdeskError::DatabaseOperation(_)
            | TrackdeskError::Serialization(_)
            | TrackdeskError::FileOperation(_) => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::SubIdImmutable).unwrap(), "3000");
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "0");
    }

    #[test]
    fn test_error_code_from_trackdesk_error() {
        assert_eq!(
            ErrorCode::from(&TrackdeskError::immutable("locked")),
            ErrorCode::SubIdImmutable
        );
        assert_eq!(
            ErrorCode::from(&TrackdeskError::tracker_not_found("gone")),
            ErrorCode::TrackerTaskNotFound
        );
        assert_eq!(
            ErrorCode::from(&TrackdeskError::database_operation("boom")),
            ErrorCode::InternalServerError
        );
    }
}

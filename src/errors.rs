use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum TrackdeskError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Immutable(String),
    TrackerRequest(String),
    TrackerUnauthorized(String),
    TrackerNotFound(String),
    Serialization(String),
    FileOperation(String),
}

impl TrackdeskError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TrackdeskError::DatabaseConfig(_) => "E001",
            TrackdeskError::DatabaseConnection(_) => "E002",
            TrackdeskError::DatabaseOperation(_) => "E003",
            TrackdeskError::Validation(_) => "E004",
            TrackdeskError::NotFound(_) => "E005",
            TrackdeskError::Conflict(_) => "E006",
            TrackdeskError::Immutable(_) => "E007",
            TrackdeskError::TrackerRequest(_) => "E008",
            TrackdeskError::TrackerUnauthorized(_) => "E009",
            TrackdeskError::TrackerNotFound(_) => "E010",
            TrackdeskError::Serialization(_) => "E011",
            TrackdeskError::FileOperation(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TrackdeskError::DatabaseConfig(_) => "Database Configuration Error",
            TrackdeskError::DatabaseConnection(_) => "Database Connection Error",
            TrackdeskError::DatabaseOperation(_) => "Database Operation Error",
            TrackdeskError::Validation(_) => "Validation Error",
            TrackdeskError::NotFound(_) => "Resource Not Found",
            TrackdeskError::Conflict(_) => "Conflict",
            TrackdeskError::Immutable(_) => "Immutable Record",
            TrackdeskError::TrackerRequest(_) => "Task Tracker Request Failed",
            TrackdeskError::TrackerUnauthorized(_) => "Task Tracker Unauthorized",
            TrackdeskError::TrackerNotFound(_) => "Task Not Found",
            TrackdeskError::Serialization(_) => "Serialization Error",
            TrackdeskError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TrackdeskError::DatabaseConfig(msg)
            | TrackdeskError::DatabaseConnection(msg)
            | TrackdeskError::DatabaseOperation(msg)
            | TrackdeskError::Validation(msg)
            | TrackdeskError::NotFound(msg)
            | TrackdeskError::Conflict(msg)
            | TrackdeskError::Immutable(msg)
            | TrackdeskError::TrackerRequest(msg)
            | TrackdeskError::TrackerUnauthorized(msg)
            | TrackdeskError::TrackerNotFound(msg)
            | TrackdeskError::Serialization(msg)
            | TrackdeskError::FileOperation(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    ///
    /// 上游（task tracker）失败统一映射为 500，任务不存在映射为 404。
    pub fn http_status(&self) -> StatusCode {
        match self {
            TrackdeskError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackdeskError::Immutable(_) => StatusCode::FORBIDDEN,
            TrackdeskError::NotFound(_) | TrackdeskError::TrackerNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            TrackdeskError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TrackdeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TrackdeskError {}

// 便捷的构造函数
impl TrackdeskError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::Conflict(msg.into())
    }

    pub fn immutable<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::Immutable(msg.into())
    }

    pub fn tracker_request<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::TrackerRequest(msg.into())
    }

    pub fn tracker_unauthorized<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::TrackerUnauthorized(msg.into())
    }

    pub fn tracker_not_found<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::TrackerNotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TrackdeskError::FileOperation(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for TrackdeskError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => TrackdeskError::Conflict(msg),
            _ => TrackdeskError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for TrackdeskError {
    fn from(err: std::io::Error) -> Self {
        TrackdeskError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TrackdeskError {
    fn from(err: serde_json::Error) -> Self {
        TrackdeskError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for TrackdeskError {
    fn from(err: csv::Error) -> Self {
        TrackdeskError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            TrackdeskError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TrackdeskError::immutable("locked").http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            TrackdeskError::tracker_not_found("task").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TrackdeskError::tracker_unauthorized("401").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = TrackdeskError::immutable("Sub-ID 'SID-1' is locked");
        assert_eq!(
            err.format_simple(),
            "Immutable Record: Sub-ID 'SID-1' is locked"
        );
        assert_eq!(err.code(), "E007");
    }

    #[test]
    fn test_from_record_not_found() {
        let err: TrackdeskError = sea_orm::DbErr::RecordNotFound("x".to_string()).into();
        assert!(matches!(err, TrackdeskError::DatabaseOperation(_)));
    }
}

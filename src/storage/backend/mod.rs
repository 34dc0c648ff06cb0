//! SeaORM storage backend
//!
//! Supports SQLite, MySQL/MariaDB and PostgreSQL; the backend is inferred
//! from the database URL.

mod brand_lists;
mod brands;
mod connection;
mod converters;
mod geos;
mod rankings;
pub mod retry;
mod sub_ids;
mod websites;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, TrackdeskError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{
    model_to_brand, model_to_brand_list, model_to_geo, model_to_sub_id, model_to_website,
};
pub use rankings::sort_rankings;
pub use retry::RetryPolicy;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(TrackdeskError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// Wrap a database error with the operation that failed.
///
/// Unique-constraint violations stay distinguishable as `Conflict`.
pub(crate) fn db_err(context: &str, err: DbErr) -> TrackdeskError {
    match TrackdeskError::from(err) {
        TrackdeskError::Conflict(msg) => TrackdeskError::conflict(format!("{}: {}", context, msg)),
        other => TrackdeskError::database_operation(format!("{}: {}", context, other.message())),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry: RetryPolicy,
}

impl SeaOrmStorage {
    /// 连接数据库并运行迁移
    pub async fn new(database_url: &str, backend_name: &str, config: &DatabaseConfig) -> Result<Self> {
        if database_url.is_empty() {
            return Err(TrackdeskError::database_config("database_url is not set"));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, config).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry: RetryPolicy::from(config),
        };

        run_migrations(&storage.db).await?;

        info!("{} storage initialized", storage.backend_name.to_uppercase());
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 健康检查：执行一次最简单的查询
    pub async fn ping(&self) -> Result<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| db_err("Database ping failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://data.db?mode=rwc").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("trackdesk.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mariadb://u:p@h/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("postgresql://h/db").unwrap(), "postgres");
        assert!(matches!(
            infer_backend_from_url("redis://h"),
            Err(TrackdeskError::DatabaseConfig(_))
        ));
    }
}

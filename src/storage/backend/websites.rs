//! Website queries and mutations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::info;

use super::converters::model_to_website;
use super::{SeaOrmStorage, db_err};
use crate::errors::{Result, TrackdeskError};
use crate::storage::models::Website;

use migration::entities::{sub_id, website};

impl SeaOrmStorage {
    pub async fn list_websites(&self) -> Result<Vec<Website>> {
        let db = &self.db;
        let models = self
            .retry
            .run("list_websites", || async {
                website::Entity::find()
                    .order_by_asc(website::Column::Name)
                    .all(db)
                    .await
            })
            .await
            .map_err(|e| db_err("Failed to list websites", e))?;

        Ok(models.into_iter().map(model_to_website).collect())
    }

    pub async fn get_website(&self, id: i32) -> Result<Option<Website>> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("get_website({})", id), || async {
                website::Entity::find_by_id(id).one(db).await
            })
            .await
            .map_err(|e| db_err("Failed to load website", e))?;

        Ok(model.map(model_to_website))
    }

    pub async fn find_website_by_name(&self, name: &str) -> Result<Option<Website>> {
        let model = website::Entity::find()
            .filter(website::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| db_err("Failed to look up website", e))?;

        Ok(model.map(model_to_website))
    }

    pub async fn insert_website(&self, name: &str, format_pattern: &str) -> Result<Website> {
        use sea_orm::ActiveValue::*;

        let active = website::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            format_pattern: Set(format_pattern.to_string()),
            created_at: Set(Utc::now()),
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| db_err("Failed to create website", e))?;

        info!("Website created: {} (id={})", model.name, model.id);
        Ok(model_to_website(model))
    }

    pub async fn update_website(
        &self,
        id: i32,
        name: &str,
        format_pattern: &str,
    ) -> Result<Website> {
        use sea_orm::ActiveValue::*;

        let active = website::ActiveModel {
            id: Unchanged(id),
            name: Set(name.to_string()),
            format_pattern: Set(format_pattern.to_string()),
            created_at: NotSet,
        };

        let model = active.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                TrackdeskError::not_found(format!("Website {} not found", id))
            }
            other => db_err("Failed to update website", other),
        })?;

        Ok(model_to_website(model))
    }

    /// 删除网站，其 Sub-ID 由外键级联删除。返回是否存在该记录
    ///
    /// 与不可变 Sub-ID 检查共用一个事务；存在不可变 Sub-ID 时返回 Immutable
    pub async fn delete_website(&self, id: i32) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_err("Failed to start transaction", e))?;

        let Some(model) = website::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| db_err("Failed to load website", e))?
        else {
            return Ok(false);
        };

        let locked = immutable_sub_ids(&txn, id).await?;
        if locked > 0 {
            return Err(TrackdeskError::immutable(format!(
                "Website '{}' owns {} immutable Sub-ID(s) and cannot be deleted",
                model.name, locked
            )));
        }

        let result = website::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| db_err("Failed to delete website", e))?;

        txn.commit()
            .await
            .map_err(|e| db_err("Failed to commit website delete", e))?;

        if result.rows_affected > 0 {
            info!("Website deleted: {} (id={})", model.name, id);
        }
        Ok(result.rows_affected > 0)
    }
}

async fn immutable_sub_ids<C: ConnectionTrait>(conn: &C, website_id: i32) -> Result<u64> {
    sub_id::Entity::find()
        .filter(sub_id::Column::WebsiteId.eq(website_id))
        .filter(sub_id::Column::IsImmutable.eq(true))
        .count(conn)
        .await
        .map_err(|e| db_err("Failed to count immutable Sub-IDs", e))
}

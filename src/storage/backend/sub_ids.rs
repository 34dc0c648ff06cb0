//! Sub-ID queries and mutations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use tracing::{debug, info};

use super::converters::{model_to_sub_id, new_sub_id_to_active_model, sub_id_to_active_model};
use super::{SeaOrmStorage, db_err};
use crate::errors::{Result, TrackdeskError};
use crate::storage::models::{NewSubId, SubId, SubIdFilter};

use migration::entities::sub_id;

impl SeaOrmStorage {
    /// 按创建时间倒序列出网站的 Sub-ID
    pub async fn list_sub_ids(&self, website_id: i32, filter: &SubIdFilter) -> Result<Vec<SubId>> {
        let mut query = sub_id::Entity::find().filter(sub_id::Column::WebsiteId.eq(website_id));

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(sub_id::Column::Value.contains(search))
                    .add(sub_id::Column::Url.contains(search))
                    .add(sub_id::Column::TaskId.contains(search)),
            );
        }

        match filter.linked {
            Some(true) => query = query.filter(sub_id::Column::TaskId.is_not_null()),
            Some(false) => query = query.filter(sub_id::Column::TaskId.is_null()),
            None => {}
        }

        let models = query
            .order_by_desc(sub_id::Column::CreatedAt)
            .order_by_desc(sub_id::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_err("Failed to list Sub-IDs", e))?;

        debug!("Listed {} Sub-IDs for website {}", models.len(), website_id);
        Ok(models.into_iter().map(model_to_sub_id).collect())
    }

    pub async fn get_sub_id(&self, id: i32) -> Result<Option<SubId>> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("get_sub_id({})", id), || async {
                sub_id::Entity::find_by_id(id).one(db).await
            })
            .await
            .map_err(|e| db_err("Failed to load Sub-ID", e))?;

        Ok(model.map(model_to_sub_id))
    }

    pub async fn find_sub_id_by_value(&self, value: &str) -> Result<Option<SubId>> {
        let model = sub_id::Entity::find()
            .filter(sub_id::Column::Value.eq(value))
            .one(&self.db)
            .await
            .map_err(|e| db_err("Failed to look up Sub-ID", e))?;

        Ok(model.map(model_to_sub_id))
    }

    pub async fn sub_id_value_exists(&self, value: &str) -> Result<bool> {
        let count = sub_id::Entity::find()
            .filter(sub_id::Column::Value.eq(value))
            .count(&self.db)
            .await
            .map_err(|e| db_err("Failed to check Sub-ID value", e))?;
        Ok(count > 0)
    }

    pub async fn count_sub_ids(&self, website_id: i32) -> Result<u64> {
        sub_id::Entity::find()
            .filter(sub_id::Column::WebsiteId.eq(website_id))
            .count(&self.db)
            .await
            .map_err(|e| db_err("Failed to count Sub-IDs", e))
    }

    pub async fn insert_sub_id(&self, new: &NewSubId) -> Result<SubId> {
        let model = new_sub_id_to_active_model(new, Utc::now())
            .insert(&self.db)
            .await
            .map_err(|e| db_err(&format!("Failed to create Sub-ID '{}'", new.value), e))?;

        info!(
            "Sub-ID created: {} (website={}, immutable={})",
            model.value, model.website_id, model.is_immutable
        );
        Ok(model_to_sub_id(model))
    }

    /// 写回可变字段；不变性规则由 service 层保证
    pub async fn update_sub_id(&self, record: &SubId) -> Result<SubId> {
        let model = sub_id_to_active_model(record)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => {
                    TrackdeskError::not_found(format!("Sub-ID {} not found", record.id))
                }
                other => db_err("Failed to update Sub-ID", other),
            })?;

        Ok(model_to_sub_id(model))
    }

    pub async fn set_comment_posted(&self, id: i32, posted: bool) -> Result<()> {
        use sea_orm::ActiveValue::*;

        let active = sub_id::ActiveModel {
            id: Unchanged(id),
            comment_posted: Set(posted),
            ..Default::default()
        };
        active.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                TrackdeskError::not_found(format!("Sub-ID {} not found", id))
            }
            other => db_err("Failed to update comment flag", other),
        })?;
        Ok(())
    }

    pub async fn delete_sub_id(&self, id: i32) -> Result<bool> {
        let result = sub_id::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_err("Failed to delete Sub-ID", e))?;

        if result.rows_affected > 0 {
            info!("Sub-ID deleted: id={}", id);
        }
        Ok(result.rows_affected > 0)
    }
}
